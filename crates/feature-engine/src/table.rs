//! Persisted Feature Table

use crate::contract::FeatureContract;
use crate::error::FeatureError;
use crate::features::FeatureVector;
use series_store::LabeledReading;
use std::io::{Read, Write};
use tracing::info;

/// Write one row per (engine, cycle): identity columns, labels, then the
/// rolling features in contract order.
///
/// `labeled` and `features` must be aligned row by row, which holds for
/// the outputs of `series_store::label` and
/// [`RollingFeatureComputer::compute_all`](crate::RollingFeatureComputer::compute_all)
/// on the same store.
pub fn write_feature_table<W: Write>(
    writer: W,
    labeled: &[LabeledReading],
    features: &[FeatureVector],
    contract: &FeatureContract,
) -> Result<(), FeatureError> {
    if labeled.len() != features.len() {
        return Err(FeatureError::ContractMismatch(format!(
            "{} labeled rows but {} feature vectors",
            labeled.len(),
            features.len()
        )));
    }

    let mut csv = csv::Writer::from_writer(writer);
    let mut header = series_store::labeled_header();
    header.extend(contract.names().iter().cloned());
    csv.write_record(&header)?;

    for (index, (row, vector)) in labeled.iter().zip(features).enumerate() {
        let r = &row.reading;
        if r.entity_id != vector.entity_id || r.cycle != vector.cycle {
            return Err(FeatureError::Misaligned {
                index,
                label_entity: r.entity_id,
                label_cycle: r.cycle,
                feature_entity: vector.entity_id,
                feature_cycle: vector.cycle,
            });
        }
        contract.validate(&vector.values)?;

        let mut record = Vec::with_capacity(header.len());
        record.push(r.entity_id.to_string());
        record.push(r.cycle.to_string());
        record.extend(r.operational_settings.iter().map(f64::to_string));
        record.extend(r.sensor_values.iter().map(f64::to_string));
        record.push(row.rul.to_string());
        record.push(row.will_fail_soon.to_string());
        record.extend(vector.values.iter().map(f64::to_string));
        csv.write_record(&record)?;
    }
    csv.flush()?;

    info!(
        "Wrote feature table: {} rows, {} feature columns",
        features.len(),
        contract.len()
    );
    Ok(())
}

/// Read the feature block of a feature table laid out by `contract`.
///
/// The header's feature columns must match the contract position by
/// position; one value vector per row is returned in contract order.
pub fn read_feature_columns<R: Read>(
    reader: R,
    contract: &FeatureContract,
) -> Result<Vec<Vec<f64>>, FeatureError> {
    let mut csv = csv::Reader::from_reader(reader);
    let headers = csv.headers()?.clone();
    let columns: Vec<&str> = headers.iter().collect();
    contract.ensure_compatible(&FeatureContract::from_columns(&columns)?)?;

    let positions: Vec<usize> = contract
        .names()
        .iter()
        .filter_map(|name| columns.iter().position(|c| *c == name.as_str()))
        .collect();

    let mut rows = Vec::new();
    for record in csv.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let mut values = Vec::with_capacity(positions.len());
        for &pos in &positions {
            let raw = record.get(pos).unwrap_or("").trim();
            let value = raw.parse::<f64>().map_err(|_| FeatureError::InvalidValue {
                line,
                column: columns[pos].to_string(),
                value: raw.to_string(),
            })?;
            values.push(value);
        }
        rows.push(values);
    }
    info!("Read {} reference rows ({} features)", rows.len(), contract.len());
    Ok(rows)
}
