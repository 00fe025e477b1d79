//! Prometheus Route

use axum::{extract::State, http::header, response::IntoResponse};
use std::sync::Arc;

use crate::AppState;

/// Prometheus text exposition; empty when no recorder is attached
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}
