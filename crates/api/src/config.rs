//! Service Configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Scoring service settings.
///
/// Sources, lowest priority first:
/// 1. `Default` values for any field left unset
/// 2. `config/service.{toml,yaml,json}` if present
/// 3. Environment variables with `PDM__` prefix, e.g. `PDM__PORT=9000`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Bind address (default: 0.0.0.0)
    pub host: String,
    /// Bind port (default: 8000)
    pub port: u16,
    /// Model artifact produced by the trainer
    pub model_path: PathBuf,
    /// Feature contract from the pipeline; the model must match it when set
    pub contract_path: Option<PathBuf>,
    /// JSONL inference log; disabled when unset
    pub inference_log_path: Option<PathBuf>,
    /// Default tracing level, overridden by `RUST_LOG`
    pub log_level: String,
    /// `pretty` or `json`
    pub log_format: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            model_path: PathBuf::from("models/model.json"),
            contract_path: None,
            inference_log_path: Some(PathBuf::from("logs/inference_logs.jsonl")),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Load layered configuration
    pub fn load() -> Result<Self, ::config::ConfigError> {
        Self::load_from("config/service")
    }

    /// Load with an explicit file stem in place of `config/service`
    pub fn load_from(file: &str) -> Result<Self, ::config::ConfigError> {
        let builder = ::config::Config::builder()
            .add_source(::config::File::with_name(file).required(false))
            .add_source(::config::Environment::with_prefix("PDM").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// `host:port` for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
