//! Feature Error Types

use thiserror::Error;

/// Errors from feature computation, the contract and the online adapter
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Request vector length differs from the contract
    #[error("Expected {expected} features, but received {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Feature {name} at position {position} is not a finite number")]
    NonFinite { position: usize, name: String },

    #[error("Feature contract needs at least one sensor channel")]
    EmptyChannels,

    #[error("Sensor channel {0} is configured more than once")]
    DuplicateChannel(String),

    #[error("Unknown sensor channel: {0}")]
    UnknownChannel(String),

    #[error("Rolling window must be at least 1, got {0}")]
    InvalidWindow(usize),

    #[error("Unsupported feature contract version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Feature contract mismatch: {0}")]
    ContractMismatch(String),

    /// Labeled rows and feature vectors do not line up
    #[error("Row {index} misaligned: labeled ({label_entity}, {label_cycle}) vs features ({feature_entity}, {feature_cycle})")]
    Misaligned {
        index: usize,
        label_entity: u32,
        label_cycle: u32,
        feature_entity: u32,
        feature_cycle: u32,
    },

    #[error("Invalid value '{value}' in column {column} at line {line}")]
    InvalidValue { line: u64, column: String, value: String },

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
