//! Health Route

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model_kind: String,
    pub feature_count: usize,
    pub contract_version: u32,
}

/// Liveness plus a summary of the loaded model
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let contract = state.engine.contract();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model_kind: state.engine.model_kind().to_string(),
        feature_count: contract.len(),
        contract_version: contract.version(),
    })
}
