//! Labeled Table Validator

use crate::error::{RangeError, ValidationError};
use serde::{Deserialize, Serialize};
use series_store::{CYCLE_COLUMN, ENTITY_COLUMN, LABEL_COLUMN, RUL_COLUMN};
use std::io::Read;
use tracing::{debug, info, warn};

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Columns that must be present in the header
    pub required_columns: Vec<String>,
    /// Maximum fraction of missing values allowed in any column
    pub max_missing_ratio: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            required_columns: [ENTITY_COLUMN, CYCLE_COLUMN, RUL_COLUMN, LABEL_COLUMN]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            max_missing_ratio: 0.05,
        }
    }
}

/// Summary of a successful validation run
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Data rows checked
    pub rows: usize,
    /// Columns in the table
    pub columns: usize,
    /// Highest missing-value ratio seen in any column
    pub max_missing_ratio: f64,
}

/// Validator for the labeled engine table
pub struct Validator {
    config: ValidationConfig,
}

fn is_missing(field: &str) -> bool {
    let field = field.trim();
    field.is_empty() || field.eq_ignore_ascii_case("nan") || field.eq_ignore_ascii_case("null")
}

fn parse_number(field: &str, column: &str, line: u64) -> Result<f64, ValidationError> {
    field.trim().parse().map_err(|_| {
        ValidationError::InvalidFormat(format!(
            "non-numeric {} value '{}' at line {}",
            column, field, line
        ))
    })
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Check that every required column is present
    pub fn validate_schema<S: AsRef<str>>(&self, headers: &[S]) -> Result<(), ValidationError> {
        let missing: Vec<String> = self
            .config
            .required_columns
            .iter()
            .filter(|required| !headers.iter().any(|h| h.as_ref() == required.as_str()))
            .cloned()
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Schema { missing })
        }
    }

    /// Check a cycle value
    pub fn validate_cycle(&self, value: f64, line: u64) -> Result<(), RangeError> {
        if value <= 0.0 {
            Err(RangeError::NonPositiveCycle { line, value })
        } else {
            Ok(())
        }
    }

    /// Check a RUL value
    pub fn validate_rul(&self, value: f64, line: u64) -> Result<(), RangeError> {
        if value < 0.0 {
            Err(RangeError::NegativeRul { line, value })
        } else {
            Ok(())
        }
    }

    /// Check a failure label
    pub fn validate_label(&self, value: f64, line: u64) -> Result<(), RangeError> {
        if value == 0.0 || value == 1.0 {
            Ok(())
        } else {
            Err(RangeError::InvalidLabel { line, value })
        }
    }

    /// Validate a whole CSV table.
    ///
    /// Checks run in order: schema, missing values, ranges. The first
    /// failure of the earliest stage is returned.
    pub fn validate_table<R: Read>(&self, reader: R) -> Result<ValidationReport, ValidationError> {
        let mut csv = csv::Reader::from_reader(reader);
        let headers: Vec<String> = csv.headers()?.iter().map(str::to_string).collect();
        self.validate_schema(&headers)?;

        let position = |name: &str| headers.iter().position(|h| h == name);
        let cycle_idx = position(CYCLE_COLUMN);
        let rul_idx = position(RUL_COLUMN);
        let label_idx = position(LABEL_COLUMN);

        let mut missing_counts = vec![0usize; headers.len()];
        let mut first_range_error: Option<RangeError> = None;
        let mut rows = 0usize;

        for record in csv.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            rows += 1;

            for (idx, field) in record.iter().enumerate() {
                if idx < missing_counts.len() && is_missing(field) {
                    missing_counts[idx] += 1;
                }
            }

            if first_range_error.is_some() {
                continue;
            }

            let checks: [(Option<usize>, fn(&Self, f64, u64) -> Result<(), RangeError>); 3] = [
                (cycle_idx, Self::validate_cycle),
                (rul_idx, Self::validate_rul),
                (label_idx, Self::validate_label),
            ];
            for (idx, check) in checks {
                let Some(idx) = idx else { continue };
                let Some(field) = record.get(idx) else { continue };
                if is_missing(field) {
                    continue;
                }
                let value = parse_number(field, &headers[idx], line)?;
                if let Err(e) = check(self, value, line) {
                    first_range_error = Some(e);
                    break;
                }
            }
        }

        let mut max_ratio = 0.0_f64;
        if rows > 0 {
            for (column, &count) in headers.iter().zip(&missing_counts) {
                let ratio = count as f64 / rows as f64;
                max_ratio = max_ratio.max(ratio);
                if ratio > self.config.max_missing_ratio {
                    warn!("Column {} missing ratio {:.3}", column, ratio);
                    return Err(ValidationError::TooManyMissing {
                        column: column.clone(),
                        ratio,
                        max: self.config.max_missing_ratio,
                    });
                }
            }
        }
        debug!("Missing-value check passed (max ratio {:.3})", max_ratio);

        if let Some(e) = first_range_error {
            return Err(e.into());
        }

        info!("Validated {} rows across {} columns", rows, headers.len());
        Ok(ValidationReport {
            rows,
            columns: headers.len(),
            max_missing_ratio: max_ratio,
        })
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "engine_id,cycle,sensor_1,RUL,will_fail_soon";

    fn table(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn test_valid_table() {
        let validator = Validator::default();
        let report = validator
            .validate_table(table(&["1,1,500.1,1,1", "1,2,500.3,0,1"]).as_bytes())
            .unwrap();
        assert_eq!(report.rows, 2);
        assert_eq!(report.columns, 5);
        assert_eq!(report.max_missing_ratio, 0.0);
    }

    #[test]
    fn test_missing_columns() {
        let validator = Validator::default();
        let err = validator
            .validate_table("engine_id,cycle\n1,1\n".as_bytes())
            .unwrap_err();
        match err {
            ValidationError::Schema { missing } => {
                assert_eq!(missing, vec!["RUL".to_string(), "will_fail_soon".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_positive_cycle() {
        let validator = Validator::default();
        let err = validator
            .validate_table(table(&["1,0,500.0,3,1"]).as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Range(RangeError::NonPositiveCycle { value, .. }) if value == 0.0
        ));
    }

    #[test]
    fn test_negative_rul() {
        let validator = Validator::default();
        let err = validator
            .validate_table(table(&["1,1,500.0,-1,1"]).as_bytes())
            .unwrap_err();
        assert!(matches!(err, ValidationError::Range(RangeError::NegativeRul { .. })));
    }

    #[test]
    fn test_invalid_label() {
        let validator = Validator::default();
        let err = validator
            .validate_table(table(&["1,1,500.0,1,2"]).as_bytes())
            .unwrap_err();
        assert!(matches!(err, ValidationError::Range(RangeError::InvalidLabel { .. })));
    }

    #[test]
    fn test_too_many_missing() {
        let validator = Validator::default();
        let mut rows: Vec<String> = (1..=10).map(|c| format!("1,{c},500.0,{},0", 10 - c)).collect();
        rows[3] = "1,4,,6,0".to_string();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();

        let err = validator.validate_table(table(&rows).as_bytes()).unwrap_err();
        match err {
            ValidationError::TooManyMissing { column, ratio, .. } => {
                assert_eq!(column, "sensor_1");
                assert!((ratio - 0.1).abs() < 1e-12);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_direct_range_checks() {
        let validator = Validator::default();
        assert!(validator.validate_cycle(1.0, 1).is_ok());
        assert!(validator.validate_rul(0.0, 1).is_ok());
        assert!(validator.validate_label(1.0, 1).is_ok());
        assert!(validator.validate_label(0.5, 1).is_err());
    }
}
