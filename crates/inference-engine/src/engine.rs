//! Inference Engine Implementation

use crate::artifact::ModelArtifact;
use crate::model::ScoringModel;
use crate::InferenceError;
use feature_engine::{FeatureContract, FeatureRow, OnlineFeatureAdapter};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Prediction result for one request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// 1 when `probability >= decision_threshold`
    pub will_fail_soon: u8,
    /// Probability of failure within the labeling horizon
    pub probability: f64,
}

/// Read-only scoring handle, built once at startup and shared by requests
#[derive(Debug)]
pub struct InferenceEngine {
    adapter: OnlineFeatureAdapter,
    model: Box<dyn ScoringModel>,
    decision_threshold: f64,
    model_path: String,
}

impl InferenceEngine {
    /// Build from an in-memory artifact
    pub fn from_artifact(artifact: ModelArtifact, source: &str) -> Result<Self, InferenceError> {
        let contract = Arc::new(artifact.contract);
        let model = artifact.model.build(contract.len())?;
        info!(
            "Inference engine ready: {} model, {} features, threshold {}",
            model.kind(),
            contract.len(),
            artifact.decision_threshold
        );
        Ok(Self {
            adapter: OnlineFeatureAdapter::new(contract),
            model,
            decision_threshold: artifact.decision_threshold,
            model_path: source.to_string(),
        })
    }

    /// Load the artifact at `path`
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let artifact = ModelArtifact::load(path)?;
        Self::from_artifact(artifact, &path.display().to_string())
    }

    /// Load the artifact and require its contract to match `expected`
    pub fn load_with_contract(path: &Path, expected: &FeatureContract) -> Result<Self, InferenceError> {
        let engine = Self::load(path)?;
        expected.ensure_compatible(engine.contract())?;
        Ok(engine)
    }

    /// Validate and score one raw request vector
    pub fn predict(&self, raw: &[f64]) -> Result<Prediction, InferenceError> {
        let row = self.adapter.adapt(raw)?;
        self.predict_row(&row)
    }

    /// Score an already adapted row
    pub fn predict_row(&self, row: &FeatureRow) -> Result<Prediction, InferenceError> {
        let probability = self
            .model
            .predict_proba(row.view())
            .first()
            .copied()
            .ok_or_else(|| InferenceError::InferenceFailed("model returned no score".to_string()))?;

        // Finite but extreme inputs can still overflow to inf - inf
        if probability.is_nan() {
            return Err(InferenceError::NonFiniteScore);
        }
        if !(0.0..=1.0).contains(&probability) {
            return Err(InferenceError::InferenceFailed(format!(
                "probability {probability} outside [0, 1]"
            )));
        }

        let will_fail_soon = u8::from(probability >= self.decision_threshold);
        debug!("Prediction: will_fail_soon={} p={:.4}", will_fail_soon, probability);
        Ok(Prediction {
            will_fail_soon,
            probability,
        })
    }

    /// Feature contract requests must follow
    pub fn contract(&self) -> &FeatureContract {
        self.adapter.contract()
    }

    /// Model family name
    pub fn model_kind(&self) -> &'static str {
        self.model.kind()
    }

    /// Where the model was loaded from
    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    /// Decision threshold on the failure probability
    pub fn decision_threshold(&self) -> f64 {
        self.decision_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelSpec;
    use feature_engine::FeatureError;

    fn engine(weights: Vec<f64>, intercept: f64) -> InferenceEngine {
        let contract = FeatureContract::build(&series_store::all_channels()).unwrap();
        let artifact = ModelArtifact {
            contract,
            decision_threshold: 0.5,
            model: ModelSpec::Logistic { weights, intercept },
        };
        InferenceEngine::from_artifact(artifact, "memory").unwrap()
    }

    #[test]
    fn test_zero_vector_scores() {
        let engine = engine(vec![0.0; 42], -2.0);
        let prediction = engine.predict(&[0.0; 42]).unwrap();
        assert_eq!(prediction.will_fail_soon, 0);
        assert!(prediction.probability > 0.0 && prediction.probability < 0.5);
    }

    #[test]
    fn test_threshold_boundary_is_positive() {
        let engine = engine(vec![0.0; 42], 0.0);
        let prediction = engine.predict(&[1.0; 42]).unwrap();
        assert_eq!(prediction.probability, 0.5);
        assert_eq!(prediction.will_fail_soon, 1);
    }

    #[test]
    fn test_length_mismatch_propagates() {
        let engine = engine(vec![0.0; 42], 0.0);
        let err = engine.predict(&[0.0; 41]).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::Feature(FeatureError::LengthMismatch { expected: 42, actual: 41 })
        ));
    }

    #[test]
    fn test_feature_weight_follows_contract_position() {
        // Only sensor_11_mean (position 20) carries weight
        let mut weights = vec![0.0; 42];
        weights[20] = 1.0;
        let engine = engine(weights, -10.0);

        let mut raw = vec![0.0; 42];
        raw[20] = 20.0;
        assert_eq!(engine.predict(&raw).unwrap().will_fail_soon, 1);
        raw[20] = 0.0;
        raw[21] = 20.0;
        assert_eq!(engine.predict(&raw).unwrap().will_fail_soon, 0);
    }

    #[test]
    fn test_load_with_contract_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        ModelArtifact {
            contract: FeatureContract::build(&["sensor_1"]).unwrap(),
            decision_threshold: 0.5,
            model: ModelSpec::Logistic {
                weights: vec![0.0, 0.0],
                intercept: 0.0,
            },
        }
        .save(&path)
        .unwrap();

        let expected = FeatureContract::build(&["sensor_2"]).unwrap();
        let err = InferenceEngine::load_with_contract(&path, &expected).unwrap_err();
        assert!(matches!(err, InferenceError::Feature(FeatureError::ContractMismatch(_))));
        assert!(InferenceEngine::load(&path).is_ok());
    }

    #[test]
    fn test_overflowing_dot_product_rejected() {
        let mut weights = vec![0.0; 42];
        weights[0] = 10.0;
        weights[1] = 10.0;
        let engine = engine(weights, 0.0);

        let mut raw = vec![0.0; 42];
        raw[0] = 1e308;
        raw[1] = -1e308;
        assert!(matches!(engine.predict(&raw), Err(InferenceError::NonFiniteScore)));

        // One-sided overflow saturates instead
        raw[1] = 0.0;
        assert_eq!(engine.predict(&raw).unwrap().probability, 1.0);
    }
}
