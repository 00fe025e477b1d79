//! Engine Failure Prediction Pipeline - Main Entry Point

use anyhow::Result;
use clap::{Parser, Subcommand};
use data_validator::ValidationConfig;
use drift_monitor::DriftConfig;
use feature_engine::{FeatureConfig, DEFAULT_WINDOW};
use series_store::LabelConfig;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "pdm-pipeline")]
#[command(about = "Engine failure prediction batch pipeline", long_about = None)]
struct Cli {
    /// Emit JSON log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load raw engine readings and attach RUL labels
    Ingest {
        /// Raw whitespace-separated readings
        #[arg(short, long)]
        input: PathBuf,

        /// Labeled CSV output
        #[arg(short, long)]
        output: PathBuf,

        /// Cycles-to-failure at or below which a reading is positive
        #[arg(long, default_value = "30")]
        failure_threshold: u32,
    },

    /// Validate a labeled table
    Validate {
        /// Labeled CSV table
        #[arg(short, long)]
        input: PathBuf,

        /// Maximum fraction of missing values per column
        #[arg(long, default_value = "0.05")]
        max_missing_ratio: f64,
    },

    /// Compute rolling features and write the feature contract
    Features {
        /// Labeled CSV table
        #[arg(short, long)]
        input: PathBuf,

        /// Feature table output
        #[arg(short, long)]
        output: PathBuf,

        /// Feature contract output
        #[arg(short, long)]
        contract: PathBuf,

        /// Trailing window size in cycles
        #[arg(short, long, default_value_t = DEFAULT_WINDOW)]
        window: usize,
    },

    /// Compare logged inference features with the training features
    Drift {
        /// Feature table used for training
        #[arg(short, long)]
        reference: PathBuf,

        /// Feature contract written with the feature table
        #[arg(short, long)]
        contract: PathBuf,

        /// JSONL inference log
        #[arg(short, long)]
        log: PathBuf,

        /// Drift report output
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn init_logging(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    let builder = FmtSubscriber::builder().with_env_filter(filter).with_target(false);
    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs)?;

    match cli.command {
        Commands::Ingest {
            input,
            output,
            failure_threshold,
        } => {
            let rows = pipeline::ingest(&input, &output, &LabelConfig { failure_threshold })?;
            info!("Ingested {} rows", rows);
        }
        Commands::Validate {
            input,
            max_missing_ratio,
        } => {
            let config = ValidationConfig {
                max_missing_ratio,
                ..ValidationConfig::default()
            };
            let report = pipeline::validate(&input, config)?;
            info!(
                "Validation passed: {} rows, {} columns, max missing ratio {:.4}",
                report.rows, report.columns, report.max_missing_ratio
            );
        }
        Commands::Features {
            input,
            output,
            contract,
            window,
        } => {
            let config = FeatureConfig {
                window,
                ..FeatureConfig::default()
            };
            pipeline::features(&input, &output, &contract, &config)?;
        }
        Commands::Drift {
            reference,
            contract,
            log,
            output,
        } => {
            let report = pipeline::drift(&reference, &contract, &log, &output, DriftConfig::default())?;
            if report.dataset_drift {
                warn!(
                    "Dataset drift: {}/{} columns drifted",
                    report.drifted_columns,
                    report.columns.len()
                );
            }
        }
    }

    Ok(())
}
