//! Drift Monitoring
//!
//! Compares production feature vectors against the training reference with
//! a per-column two-sample Kolmogorov-Smirnov test.

mod ks;
mod monitor;

pub use ks::{ks_p_value, ks_statistic};
pub use monitor::{ColumnDrift, DriftConfig, DriftMonitor, DriftReport};

use thiserror::Error;

/// Drift detection errors
#[derive(Debug, Error)]
pub enum DriftError {
    #[error("Reference data is empty")]
    EmptyReference,
    #[error("Current data is empty")]
    EmptyCurrent,
    #[error("{dataset} row {row} has {actual} features, expected {expected}")]
    ColumnMismatch {
        dataset: &'static str,
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
