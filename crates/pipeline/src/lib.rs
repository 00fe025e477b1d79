//! Batch Pipeline Stages
//!
//! Each stage reads its inputs from disk, runs one library step and writes
//! its output, so stages can be chained or rerun independently.

use anyhow::{bail, Context, Result};
use data_validator::{ValidationConfig, ValidationReport, Validator};
use drift_monitor::{DriftConfig, DriftMonitor, DriftReport};
use feature_engine::{
    read_feature_columns, write_feature_table, FeatureConfig, FeatureContract, RollingFeatureComputer,
};
use series_store::{label, load_raw, read_labeled, write_labeled, LabelConfig, TimeSeriesStore};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Raw whitespace text to the labeled CSV table. Returns the row count.
pub fn ingest(input: &Path, output: &Path, config: &LabelConfig) -> Result<usize> {
    let store = load_raw(open(input)?)
        .with_context(|| format!("failed to load raw data from {}", input.display()))?;
    info!(
        "Loaded {} readings for {} engines",
        store.len(),
        store.entity_count()
    );

    let labeled = label(&store, config);
    write_labeled(create(output)?, &labeled)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!("Wrote labeled table to {}", output.display());
    Ok(labeled.len())
}

/// Check a labeled table before it is used for training
pub fn validate(input: &Path, config: ValidationConfig) -> Result<ValidationReport> {
    let report = Validator::new(config)
        .validate_table(open(input)?)
        .with_context(|| format!("validation failed for {}", input.display()))?;
    Ok(report)
}

/// Labeled table to feature table plus its contract file.
/// Returns the number of feature rows written.
pub fn features(input: &Path, output: &Path, contract_path: &Path, config: &FeatureConfig) -> Result<usize> {
    let computer = RollingFeatureComputer::new(config).context("invalid feature configuration")?;

    let mut labeled = read_labeled(open(input)?)
        .with_context(|| format!("failed to read labeled table {}", input.display()))?;
    // Feature vectors come back engine-ascending, cycle-ascending
    labeled.sort_by_key(|row| (row.reading.entity_id, row.reading.cycle));

    let store = TimeSeriesStore::from_readings(labeled.iter().map(|row| row.reading.clone()))
        .context("labeled table has inconsistent readings")?;
    let vectors = computer.compute_all(&store);

    write_feature_table(create(output)?, &labeled, &vectors, computer.contract())
        .with_context(|| format!("failed to write {}", output.display()))?;
    computer
        .contract()
        .save(contract_path)
        .with_context(|| format!("failed to write {}", contract_path.display()))?;

    info!(
        "Wrote {} feature rows ({} features) to {}",
        vectors.len(),
        computer.contract().len(),
        output.display()
    );
    Ok(vectors.len())
}

/// Compare logged production features with the training feature table.
///
/// Both are read through the persisted contract the table was written with.
pub fn drift(
    reference: &Path,
    contract_path: &Path,
    log: &Path,
    output: &Path,
    config: DriftConfig,
) -> Result<DriftReport> {
    let contract = FeatureContract::load(contract_path)
        .with_context(|| format!("failed to load feature contract {}", contract_path.display()))?;
    let reference_rows = read_feature_columns(open(reference)?, &contract)
        .with_context(|| format!("failed to read feature table {}", reference.display()))?;

    let current: Vec<Vec<f64>> = storage::read_log(log)
        .with_context(|| format!("failed to read inference log {}", log.display()))?
        .into_iter()
        .map(|record| record.features)
        .collect();
    if current.is_empty() {
        bail!("inference log {} has no records", log.display());
    }

    let report = DriftMonitor::new(config).detect(&contract, &reference_rows, &current)?;
    report.save(output)?;
    Ok(report)
}
