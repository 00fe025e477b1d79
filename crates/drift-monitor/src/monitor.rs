//! Drift Monitor Implementation

use crate::ks::{ks_p_value, ks_statistic};
use crate::DriftError;
use chrono::{DateTime, Utc};
use feature_engine::FeatureContract;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Drift configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftConfig {
    /// p-value below which a column is drifted (default: 0.05)
    pub stattest_threshold: f64,
    /// Share of drifted columns at which the dataset is drifted (default: 0.5)
    pub drift_share: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            stattest_threshold: 0.05,
            drift_share: 0.5,
        }
    }
}

/// Test result for one feature column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDrift {
    pub column: String,
    /// KS statistic D
    pub statistic: f64,
    pub p_value: f64,
    pub drifted: bool,
}

/// Dataset-level drift report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    pub generated_at: DateTime<Utc>,
    pub reference_rows: usize,
    pub current_rows: usize,
    pub columns: Vec<ColumnDrift>,
    pub drifted_columns: usize,
    pub share_of_drifted_columns: f64,
    pub dataset_drift: bool,
    pub config: DriftConfig,
}

impl DriftReport {
    /// Write the report as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), DriftError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        info!("Drift report written to {}", path.display());
        Ok(())
    }

    /// Result for a named column
    pub fn column(&self, name: &str) -> Option<&ColumnDrift> {
        self.columns.iter().find(|c| c.column == name)
    }
}

/// Compares production features against the training reference
pub struct DriftMonitor {
    config: DriftConfig,
}

impl DriftMonitor {
    /// Create a new drift monitor
    pub fn new(config: DriftConfig) -> Self {
        info!("Creating drift monitor with config: {:?}", config);
        Self { config }
    }

    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    /// Run the per-column test over row-major reference and current data.
    ///
    /// Both datasets must have `contract.len()` values per row, in contract
    /// order.
    pub fn detect(
        &self,
        contract: &FeatureContract,
        reference: &[Vec<f64>],
        current: &[Vec<f64>],
    ) -> Result<DriftReport, DriftError> {
        if reference.is_empty() {
            return Err(DriftError::EmptyReference);
        }
        if current.is_empty() {
            return Err(DriftError::EmptyCurrent);
        }
        check_width("reference", reference, contract.len())?;
        check_width("current", current, contract.len())?;

        let columns: Vec<ColumnDrift> = contract
            .names()
            .iter()
            .enumerate()
            .map(|(pos, name)| {
                let ref_col: Vec<f64> = reference.iter().map(|row| row[pos]).collect();
                let cur_col: Vec<f64> = current.iter().map(|row| row[pos]).collect();
                let statistic = ks_statistic(&ref_col, &cur_col);
                let p_value = ks_p_value(statistic, ref_col.len(), cur_col.len());
                let drifted = p_value < self.config.stattest_threshold;
                debug!("Column {}: D={:.4} p={:.4} drifted={}", name, statistic, p_value, drifted);
                ColumnDrift {
                    column: name.clone(),
                    statistic,
                    p_value,
                    drifted,
                }
            })
            .collect();

        let drifted_columns = columns.iter().filter(|c| c.drifted).count();
        let share = if columns.is_empty() {
            0.0
        } else {
            drifted_columns as f64 / columns.len() as f64
        };
        let dataset_drift = share >= self.config.drift_share;

        if dataset_drift {
            warn!(
                "Dataset drift detected: {}/{} columns drifted",
                drifted_columns,
                columns.len()
            );
        } else {
            info!("No dataset drift: {}/{} columns drifted", drifted_columns, columns.len());
        }

        Ok(DriftReport {
            generated_at: Utc::now(),
            reference_rows: reference.len(),
            current_rows: current.len(),
            columns,
            drifted_columns,
            share_of_drifted_columns: share,
            dataset_drift,
            config: self.config.clone(),
        })
    }
}

fn check_width(dataset: &'static str, rows: &[Vec<f64>], expected: usize) -> Result<(), DriftError> {
    match rows.iter().position(|row| row.len() != expected) {
        Some(row) => Err(DriftError::ColumnMismatch {
            dataset,
            row,
            expected,
            actual: rows[row].len(),
        }),
        None => Ok(()),
    }
}
