//! Prediction Route

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use storage::{InferenceLogger, InferenceRecord};
use tracing::{debug, warn};

use crate::{ApiError, AppState};

/// Request body: one feature vector in contract order
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub features: Vec<f64>,
}

/// Response body
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub will_fail_soon: u8,
    pub probability: f64,
}

/// Score one feature vector
pub async fn predict_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let started = Instant::now();
    let result = score(&state, payload);
    metrics::histogram!("prediction_latency_seconds").record(started.elapsed().as_secs_f64());

    let (features, response) = match result {
        Ok(scored) => {
            metrics::counter!("predictions_total").increment(1);
            scored
        }
        Err(err) => {
            debug!("Rejected prediction request: {}", err);
            metrics::counter!("prediction_errors_total", "kind" => err.kind()).increment(1);
            return Err(err);
        }
    };

    if let Some(logger) = &state.logger {
        let record = InferenceRecord::new(features, response.will_fail_soon, response.probability);
        log_inference(Arc::clone(logger), record).await;
    }
    Ok(Json(response))
}

fn score(
    state: &AppState,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<(Vec<f64>, PredictResponse), ApiError> {
    let Json(request) = payload?;
    let prediction = state.engine.predict(&request.features)?;
    Ok((
        request.features,
        PredictResponse {
            will_fail_soon: prediction.will_fail_soon,
            probability: prediction.probability,
        },
    ))
}

/// Append on the blocking pool; failures are logged, never returned
async fn log_inference(logger: Arc<InferenceLogger>, record: InferenceRecord) {
    match tokio::task::spawn_blocking(move || logger.append(&record)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Failed to write inference log: {}", e),
        Err(e) => warn!("Inference log task failed: {}", e),
    }
}
