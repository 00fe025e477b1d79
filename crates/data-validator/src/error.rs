//! Validation Error Types

use thiserror::Error;

/// Semantically invalid values in an otherwise well-formed table
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeError {
    #[error("Invalid cycle value {value} at line {line}: cycles must be positive")]
    NonPositiveCycle { line: u64, value: f64 },

    #[error("Negative RUL {value} at line {line}")]
    NegativeRul { line: u64, value: f64 },

    #[error("Invalid target label {value} at line {line}: expected 0 or 1")]
    InvalidLabel { line: u64, value: f64 },
}

/// Errors during data validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Required columns absent from the header
    #[error("Missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// Column has too many missing values
    #[error("Too many missing values in column {column}: {ratio:.3} > {max:.3}")]
    TooManyMissing { column: String, ratio: f64, max: f64 },

    /// Value out of its semantic range
    #[error(transparent)]
    Range(#[from] RangeError),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
