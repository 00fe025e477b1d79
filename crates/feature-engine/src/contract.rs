//! Feature Contract
//!
//! The ordered list of feature names shared by offline feature tables and
//! online request vectors. Built once from the configured sensor channels,
//! persisted next to the feature table and embedded in model artifacts so
//! serving never re-derives it on its own.

use crate::error::FeatureError;
use crate::rolling::DEFAULT_WINDOW;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Current on-disk contract format
pub const CONTRACT_VERSION: u32 = 1;

const MEAN_SUFFIX: &str = "_mean";
const STD_SUFFIX: &str = "_std";

/// Immutable name-to-position mapping for feature vectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ContractRepr")]
pub struct FeatureContract {
    version: u32,
    window: usize,
    channels: Vec<String>,
    names: Vec<String>,
}

/// Unchecked wire form, validated into a [`FeatureContract`]
#[derive(Deserialize)]
struct ContractRepr {
    version: u32,
    window: usize,
    channels: Vec<String>,
    names: Vec<String>,
}

impl TryFrom<ContractRepr> for FeatureContract {
    type Error = FeatureError;

    fn try_from(repr: ContractRepr) -> Result<Self, Self::Error> {
        if repr.version != CONTRACT_VERSION {
            return Err(FeatureError::UnsupportedVersion {
                found: repr.version,
                supported: CONTRACT_VERSION,
            });
        }
        let contract = Self::build(&repr.channels)?.with_window(repr.window)?;
        if contract.names != repr.names {
            return Err(FeatureError::ContractMismatch(
                "stored feature names do not match the channel list".to_string(),
            ));
        }
        Ok(contract)
    }
}

impl FeatureContract {
    /// Build the contract for a channel list: `[c_mean, c_std]` per channel, in order
    pub fn build<S: AsRef<str>>(channels: &[S]) -> Result<Self, FeatureError> {
        if channels.is_empty() {
            return Err(FeatureError::EmptyChannels);
        }

        let mut seen = HashSet::with_capacity(channels.len());
        let mut names = Vec::with_capacity(channels.len() * 2);
        for channel in channels {
            let channel = channel.as_ref();
            if series_store::channel_index(channel).is_none() {
                return Err(FeatureError::UnknownChannel(channel.to_string()));
            }
            if !seen.insert(channel) {
                return Err(FeatureError::DuplicateChannel(channel.to_string()));
            }
            names.push(format!("{channel}{MEAN_SUFFIX}"));
            names.push(format!("{channel}{STD_SUFFIX}"));
        }

        Ok(Self {
            version: CONTRACT_VERSION,
            window: DEFAULT_WINDOW,
            channels: channels.iter().map(|c| c.as_ref().to_string()).collect(),
            names,
        })
    }

    /// Record the rolling window the features were computed with
    pub fn with_window(mut self, window: usize) -> Result<Self, FeatureError> {
        if window == 0 {
            return Err(FeatureError::InvalidWindow(window));
        }
        self.window = window;
        Ok(self)
    }

    /// Derive the feature layout of a table header.
    ///
    /// Only `*_mean` / `*_std` columns are considered; they must come in
    /// mean-then-std pairs per channel. A header does not record the window,
    /// so the result is only fit for layout checks against a loaded contract.
    pub(crate) fn from_columns<S: AsRef<str>>(columns: &[S]) -> Result<Self, FeatureError> {
        let mut feature_columns: Vec<&str> = Vec::new();
        for column in columns {
            let column: &str = column.as_ref();
            if column.ends_with(MEAN_SUFFIX) || column.ends_with(STD_SUFFIX) {
                feature_columns.push(column);
            }
        }

        if feature_columns.len() % 2 != 0 {
            return Err(FeatureError::ContractMismatch(format!(
                "odd number of feature columns ({})",
                feature_columns.len()
            )));
        }

        let mut channels = Vec::with_capacity(feature_columns.len() / 2);
        for pair in feature_columns.chunks(2) {
            let mean_channel = pair[0].strip_suffix(MEAN_SUFFIX);
            let std_channel = pair[1].strip_suffix(STD_SUFFIX);
            match (mean_channel, std_channel) {
                (Some(m), Some(s)) if m == s => channels.push(m.to_string()),
                _ => {
                    return Err(FeatureError::ContractMismatch(format!(
                        "columns {} and {} are not a mean/std pair",
                        pair[0], pair[1]
                    )))
                }
            }
        }

        let contract = Self::build(&channels)?;
        debug!("Derived contract with {} features from header", contract.len());
        Ok(contract)
    }

    /// Fail with `LengthMismatch` unless `vector` has exactly `len()` values
    pub fn validate(&self, vector: &[f64]) -> Result<(), FeatureError> {
        if vector.len() != self.names.len() {
            return Err(FeatureError::LengthMismatch {
                expected: self.names.len(),
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Check that `other` lays features out identically
    pub fn ensure_compatible(&self, other: &FeatureContract) -> Result<(), FeatureError> {
        if self.names.len() != other.names.len() {
            return Err(FeatureError::ContractMismatch(format!(
                "expected {} features, other contract has {}",
                self.names.len(),
                other.names.len()
            )));
        }
        if let Some((pos, (a, b))) = self
            .names
            .iter()
            .zip(&other.names)
            .enumerate()
            .find(|(_, (a, b))| a != b)
        {
            return Err(FeatureError::ContractMismatch(format!(
                "position {pos}: expected {a}, found {b}"
            )));
        }
        Ok(())
    }

    /// Position of a feature name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Ordered feature names
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Configured channels in order
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Expected vector length (`2 * channels`)
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a built contract
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Rolling window the features were computed with
    pub fn window(&self) -> usize {
        self.window
    }

    /// Contract format version
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Persist as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), FeatureError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        info!("Saved feature contract ({} features) to {}", self.len(), path.display());
        Ok(())
    }

    /// Load and verify a persisted contract
    pub fn load(path: &Path) -> Result<Self, FeatureError> {
        let bytes = fs::read(path)?;
        let contract: Self = serde_json::from_slice(&bytes)?;
        info!(
            "Loaded feature contract v{} ({} features, window {})",
            contract.version,
            contract.len(),
            contract.window
        );
        Ok(contract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_orders_mean_then_std() {
        let contract = FeatureContract::build(&["sensor_2", "sensor_7"]).unwrap();
        assert_eq!(
            contract.names(),
            &["sensor_2_mean", "sensor_2_std", "sensor_7_mean", "sensor_7_std"]
        );
        assert_eq!(contract.len(), 4);
        assert_eq!(contract.position("sensor_7_mean"), Some(2));
    }

    #[test]
    fn test_build_is_deterministic() {
        let channels = series_store::all_channels();
        let a = FeatureContract::build(&channels).unwrap();
        let b = FeatureContract::build(&channels).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 42);
        assert_eq!(a.names()[0], "sensor_1_mean");
        assert_eq!(a.names()[41], "sensor_21_std");
    }

    #[test]
    fn test_configuration_errors() {
        let empty: [&str; 0] = [];
        assert!(matches!(FeatureContract::build(&empty), Err(FeatureError::EmptyChannels)));
        assert!(matches!(
            FeatureContract::build(&["sensor_1", "sensor_1"]),
            Err(FeatureError::DuplicateChannel(_))
        ));
        assert!(matches!(
            FeatureContract::build(&["sensor_99"]),
            Err(FeatureError::UnknownChannel(_))
        ));
    }

    #[test]
    fn test_validate_length() {
        let contract = FeatureContract::build(&series_store::all_channels()).unwrap();
        assert!(contract.validate(&[0.0; 42]).is_ok());
        match contract.validate(&[0.0; 41]) {
            Err(FeatureError::LengthMismatch { expected, actual }) => {
                assert_eq!(expected, 42);
                assert_eq!(actual, 41);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_from_columns_skips_identity_columns() {
        let header = [
            "engine_id", "cycle", "sensor_1", "RUL", "will_fail_soon",
            "sensor_1_mean", "sensor_1_std", "sensor_3_mean", "sensor_3_std",
        ];
        let contract = FeatureContract::from_columns(&header).unwrap();
        assert_eq!(contract.channels(), &["sensor_1", "sensor_3"]);
    }

    #[test]
    fn test_from_columns_rejects_bad_pairs() {
        let header = ["sensor_1_std", "sensor_1_mean"];
        assert!(matches!(
            FeatureContract::from_columns(&header),
            Err(FeatureError::ContractMismatch(_))
        ));
    }

    #[test]
    fn test_ensure_compatible_reports_position() {
        let a = FeatureContract::build(&["sensor_1", "sensor_2"]).unwrap();
        let b = FeatureContract::build(&["sensor_2", "sensor_1"]).unwrap();
        let err = a.ensure_compatible(&b).unwrap_err();
        assert!(err.to_string().contains("position 0"));
        assert!(a.ensure_compatible(&a.clone()).is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("contract.json");
        let contract = FeatureContract::build(&["sensor_4", "sensor_9"])
            .unwrap()
            .with_window(5)
            .unwrap();

        contract.save(&path).unwrap();
        let loaded = FeatureContract::load(&path).unwrap();
        assert_eq!(loaded, contract);
        assert_eq!(loaded.window(), 5);
    }

    #[test]
    fn test_tampered_contract_rejected() {
        let json = r#"{"version":1,"window":10,"channels":["sensor_1"],"names":["sensor_1_std","sensor_1_mean"]}"#;
        assert!(serde_json::from_str::<FeatureContract>(json).is_err());

        let json = r#"{"version":9,"window":10,"channels":["sensor_1"],"names":["sensor_1_mean","sensor_1_std"]}"#;
        assert!(serde_json::from_str::<FeatureContract>(json).is_err());
    }
}
