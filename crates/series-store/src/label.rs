//! Remaining Useful Life Labeling

use crate::{
    sensor_column, setting_column, EntityId, Reading, StoreError, TimeSeriesStore, CYCLE_COLUMN,
    ENTITY_COLUMN, LABEL_COLUMN, RUL_COLUMN, SENSOR_COUNT, SETTING_COUNT,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::str::FromStr;
use tracing::{debug, info};

/// Labeling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelConfig {
    /// An engine "will fail soon" when RUL is at or below this many cycles
    pub failure_threshold: u32,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 30,
        }
    }
}

/// Reading with retrospective RUL and failure label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledReading {
    pub reading: Reading,
    /// Cycles remaining until the engine's last observed cycle
    pub rul: u32,
    /// 1 when `rul <= failure_threshold`, else 0
    pub will_fail_soon: u8,
}

/// Label every reading in the store.
///
/// Reduces each engine to its last cycle first, then maps readings against
/// that table. Output is engine-ascending, cycle-ascending.
pub fn label(store: &TimeSeriesStore, config: &LabelConfig) -> Vec<LabeledReading> {
    let max_cycles: BTreeMap<EntityId, u32> = store
        .iter()
        .filter_map(|series| series.max_cycle().map(|max| (series.entity_id(), max)))
        .collect();
    debug!("Computed max cycle for {} engines", max_cycles.len());

    let labeled: Vec<LabeledReading> = store
        .iter()
        .flat_map(|series| series.readings().iter())
        .filter_map(|reading| {
            let max = *max_cycles.get(&reading.entity_id)?;
            let rul = max - reading.cycle;
            Some(LabeledReading {
                reading: reading.clone(),
                rul,
                will_fail_soon: u8::from(rul <= config.failure_threshold),
            })
        })
        .collect();

    let positives = labeled.iter().filter(|r| r.will_fail_soon == 1).count();
    info!(
        "Labeled {} readings ({} within {} cycles of failure)",
        labeled.len(),
        positives,
        config.failure_threshold
    );
    labeled
}

/// Header of the labeled table
pub fn labeled_header() -> Vec<String> {
    let mut header = vec![ENTITY_COLUMN.to_string(), CYCLE_COLUMN.to_string()];
    header.extend((0..SETTING_COUNT).map(setting_column));
    header.extend((0..SENSOR_COUNT).map(sensor_column));
    header.push(RUL_COLUMN.to_string());
    header.push(LABEL_COLUMN.to_string());
    header
}

/// Write labeled readings as CSV
pub fn write_labeled<W: Write>(writer: W, rows: &[LabeledReading]) -> Result<(), StoreError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(labeled_header())?;
    for row in rows {
        let r = &row.reading;
        let mut record = vec![r.entity_id.to_string(), r.cycle.to_string()];
        record.extend(r.operational_settings.iter().map(f64::to_string));
        record.extend(r.sensor_values.iter().map(f64::to_string));
        record.push(row.rul.to_string());
        record.push(row.will_fail_soon.to_string());
        csv.write_record(&record)?;
    }
    csv.flush()?;
    Ok(())
}

fn column_position(headers: &csv::StringRecord, name: &str) -> Result<usize, StoreError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| StoreError::MissingColumn(name.to_string()))
}

fn parse_field<T: FromStr>(record: &csv::StringRecord, idx: usize, name: &str) -> Result<T, StoreError> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);
    let raw = record.get(idx).unwrap_or("").trim();
    raw.parse().map_err(|_| StoreError::Parse {
        line,
        message: format!("invalid {} '{}'", name, raw),
    })
}

/// Read a labeled table written by [`write_labeled`]
///
/// Columns are located by name, so extra columns (such as rolling
/// features) are ignored.
pub fn read_labeled<R: Read>(reader: R) -> Result<Vec<LabeledReading>, StoreError> {
    let mut csv = csv::Reader::from_reader(reader);
    let headers = csv.headers()?.clone();

    let entity_idx = column_position(&headers, ENTITY_COLUMN)?;
    let cycle_idx = column_position(&headers, CYCLE_COLUMN)?;
    let setting_idx = (0..SETTING_COUNT)
        .map(|i| column_position(&headers, &setting_column(i)))
        .collect::<Result<Vec<_>, _>>()?;
    let sensor_idx = (0..SENSOR_COUNT)
        .map(|i| column_position(&headers, &sensor_column(i)))
        .collect::<Result<Vec<_>, _>>()?;
    let rul_idx = column_position(&headers, RUL_COLUMN)?;
    let label_idx = column_position(&headers, LABEL_COLUMN)?;

    let mut rows = Vec::new();
    for record in csv.records() {
        let record = record?;
        let mut operational_settings = [0.0; SETTING_COUNT];
        for (slot, &idx) in operational_settings.iter_mut().zip(&setting_idx) {
            *slot = parse_field(&record, idx, &headers[idx])?;
        }
        let mut sensor_values = [0.0; SENSOR_COUNT];
        for (slot, &idx) in sensor_values.iter_mut().zip(&sensor_idx) {
            *slot = parse_field(&record, idx, &headers[idx])?;
        }
        rows.push(LabeledReading {
            reading: Reading {
                entity_id: parse_field(&record, entity_idx, ENTITY_COLUMN)?,
                cycle: parse_field(&record, cycle_idx, CYCLE_COLUMN)?,
                operational_settings,
                sensor_values,
            },
            rul: parse_field(&record, rul_idx, RUL_COLUMN)?,
            will_fail_soon: parse_field(&record, label_idx, LABEL_COLUMN)?,
        });
    }
    debug!("Read {} labeled rows", rows.len());
    Ok(rows)
}
