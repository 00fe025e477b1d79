//! Model Artifact
//!
//! JSON bundle written by the external trainer: the model plus the exact
//! feature contract its training columns followed.

use crate::model::ModelSpec;
use crate::InferenceError;
use feature_engine::FeatureContract;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

fn default_threshold() -> f64 {
    0.5
}

/// Persisted model bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Feature layout the model was trained on
    pub contract: FeatureContract,
    /// Probability at or above which `will_fail_soon` is 1
    #[serde(default = "default_threshold")]
    pub decision_threshold: f64,
    pub model: ModelSpec,
}

impl ModelArtifact {
    /// Read an artifact from disk.
    ///
    /// A missing or unreadable file is `ModelUnavailable`; a file that
    /// parses badly is `InvalidModel`.
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let bytes = fs::read(path).map_err(|e| InferenceError::ModelUnavailable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let artifact: Self = serde_json::from_slice(&bytes)
            .map_err(|e| InferenceError::InvalidModel(e.to_string()))?;

        if !(0.0..=1.0).contains(&artifact.decision_threshold) {
            return Err(InferenceError::InvalidModel(format!(
                "decision threshold {} outside [0, 1]",
                artifact.decision_threshold
            )));
        }
        info!(
            "Loaded model artifact from {} ({} features, contract v{})",
            path.display(),
            artifact.contract.len(),
            artifact.contract.version()
        );
        Ok(artifact)
    }

    /// Write the artifact as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), InferenceError> {
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| InferenceError::InvalidModel(e.to_string()))?;
        fs::write(path, json).map_err(|e| InferenceError::ModelUnavailable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
