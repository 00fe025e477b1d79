//! HTTP Error Mapping

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use feature_engine::FeatureError;
use inference_engine::InferenceError;
use serde_json::json;
use thiserror::Error;

/// Errors returned to HTTP clients
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl ApiError {
    /// Label for `prediction_errors_total{kind}`
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "malformed_request",
            ApiError::Inference(InferenceError::Feature(FeatureError::LengthMismatch { .. })) => {
                "length_mismatch"
            }
            ApiError::Inference(InferenceError::Feature(FeatureError::NonFinite { .. })) => {
                "non_finite"
            }
            ApiError::Inference(InferenceError::NonFiniteScore) => "non_finite_score",
            ApiError::Inference(_) => "inference",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Inference(InferenceError::Feature(_)) => StatusCode::BAD_REQUEST,
            ApiError::Inference(InferenceError::NonFiniteScore) => StatusCode::BAD_REQUEST,
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
