//! Data Validation
//!
//! Schema, missing-value and range checks for the labeled engine table.

mod error;
mod validator;

pub use error::{RangeError, ValidationError};
pub use validator::{ValidationConfig, ValidationReport, Validator};
