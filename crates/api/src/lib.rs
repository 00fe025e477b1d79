//! Engine Failure Prediction Service
//!
//! HTTP scoring service over a loaded model artifact.

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use feature_engine::FeatureContract;
use inference_engine::InferenceEngine;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Instant;
use storage::InferenceLogger;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod config;
mod error;
pub mod routes;

pub use crate::config::ServiceConfig;
pub use crate::error::ApiError;

/// Application state shared across handlers
pub struct AppState {
    /// Scoring engine, loaded once and read-only
    pub engine: Arc<InferenceEngine>,
    /// Inference log sink
    pub logger: Option<Arc<InferenceLogger>>,
    /// Prometheus render handle
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(engine: Arc<InferenceEngine>) -> Self {
        Self {
            engine,
            logger: None,
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }

    pub fn with_logger(mut self, logger: Arc<InferenceLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_handler))
        .route("/predict", post(routes::predict::predict_handler))
        .route("/metrics", get(routes::metrics::metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize logging.
///
/// `RUST_LOG` takes precedence over `level`; `format = "json"` switches to
/// structured output.
pub fn init_logging(level: &str, format: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true);

    if format == "json" {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Install the global Prometheus recorder
pub fn install_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    metrics::describe_counter!("predictions_total", "Successful predictions");
    metrics::describe_counter!("prediction_errors_total", "Rejected or failed predictions");
    metrics::describe_histogram!("prediction_latency_seconds", "Prediction handler latency");
    Ok(handle)
}

/// Load the configured model, checking it against the feature contract
/// when one is configured
pub fn load_engine(config: &ServiceConfig) -> anyhow::Result<InferenceEngine> {
    let engine = match &config.contract_path {
        Some(path) => {
            let contract = FeatureContract::load(path)
                .with_context(|| format!("failed to load feature contract {}", path.display()))?;
            InferenceEngine::load_with_contract(&config.model_path, &contract)?
        }
        None => InferenceEngine::load(&config.model_path)?,
    };
    Ok(engine)
}

/// Load the model and serve until the listener fails.
///
/// An unavailable model artifact is an error before the socket is bound.
pub async fn run_server(config: &ServiceConfig) -> anyhow::Result<()> {
    let engine = load_engine(config)?;
    let mut state = AppState::new(Arc::new(engine)).with_metrics(install_metrics()?);

    if let Some(path) = &config.inference_log_path {
        state = state.with_logger(Arc::new(InferenceLogger::open(path)?));
        info!("Logging inferences to {}", path.display());
    }

    let app = create_router(Arc::new(state));
    let addr = config.bind_addr();
    info!("Starting scoring service on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
