//! Inference Engine
//!
//! Loads an exported model artifact (model plus the feature contract it was
//! trained on) and scores request vectors through the online adapter.

mod artifact;
mod engine;
mod model;

pub use artifact::ModelArtifact;
pub use engine::{InferenceEngine, Prediction};
pub use model::{ForestModel, LogisticModel, ModelSpec, ScoringModel, Tree, TreeNode};

use feature_engine::FeatureError;
use thiserror::Error;

/// Errors during model loading and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model unavailable at {path}: {reason}")]
    ModelUnavailable { path: String, reason: String },
    #[error("Invalid model artifact: {0}")]
    InvalidModel(String),
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error("Feature values too large to score: model output is not a number")]
    NonFiniteScore,
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
}
