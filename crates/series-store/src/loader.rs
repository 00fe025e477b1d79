//! Raw CMAPSS Text Loader

use crate::{Reading, StoreError, TimeSeriesStore, SENSOR_COUNT, SETTING_COUNT};
use std::io::BufRead;
use tracing::info;

/// Columns per raw row: engine id, cycle, settings, sensors
pub const RAW_COLUMN_COUNT: usize = 2 + SETTING_COUNT + SENSOR_COUNT;

/// Parse one whitespace-separated raw line.
///
/// Returns `Ok(None)` for blank lines. Runs of separators collapse, so the
/// trailing blanks the dataset carries never become columns.
pub fn parse_line(line: &str, line_no: u64) -> Result<Option<Reading>, StoreError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.is_empty() {
        return Ok(None);
    }
    if fields.len() != RAW_COLUMN_COUNT {
        return Err(StoreError::Parse {
            line: line_no,
            message: format!("expected {} columns, found {}", RAW_COLUMN_COUNT, fields.len()),
        });
    }

    let parse_err = |what: &str, value: &str| StoreError::Parse {
        line: line_no,
        message: format!("invalid {} '{}'", what, value),
    };

    let entity_id = fields[0].parse().map_err(|_| parse_err("engine id", fields[0]))?;
    let cycle = fields[1].parse().map_err(|_| parse_err("cycle", fields[1]))?;

    let mut operational_settings = [0.0; SETTING_COUNT];
    for (slot, field) in operational_settings.iter_mut().zip(&fields[2..2 + SETTING_COUNT]) {
        *slot = field.parse().map_err(|_| parse_err("setting", *field))?;
    }

    let mut sensor_values = [0.0; SENSOR_COUNT];
    for (slot, field) in sensor_values.iter_mut().zip(&fields[2 + SETTING_COUNT..]) {
        *slot = field.parse().map_err(|_| parse_err("sensor value", *field))?;
    }

    Ok(Some(Reading {
        entity_id,
        cycle,
        operational_settings,
        sensor_values,
    }))
}

/// Load a raw CMAPSS file into a store
pub fn load_raw<R: BufRead>(reader: R) -> Result<TimeSeriesStore, StoreError> {
    let mut store = TimeSeriesStore::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(reading) = parse_line(&line, idx as u64 + 1)? {
            store.insert(reading)?;
        }
    }
    info!(
        "Loaded {} readings for {} engines",
        store.len(),
        store.entity_count()
    );
    Ok(store)
}
