//! Engine Failure Prediction Service - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, ServiceConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::load().context("failed to load service configuration")?;
    init_logging(&config.log_level, &config.log_format)?;

    info!("=== Engine Failure Prediction Service v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Model artifact: {}", config.model_path.display());

    if let Err(e) = run_server(&config).await {
        error!("Service stopped: {:#}", e);
        return Err(e);
    }
    Ok(())
}
