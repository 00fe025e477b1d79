//! Engine Telemetry Store
//!
//! Holds cycle-ordered sensor readings per engine, parses the raw CMAPSS
//! text format and derives remaining-useful-life labels.

mod label;
mod loader;
mod store;

pub use label::{label, labeled_header, read_labeled, write_labeled, LabelConfig, LabeledReading};
pub use loader::{load_raw, parse_line, RAW_COLUMN_COUNT};
pub use store::{TimeSeries, TimeSeriesStore};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of operational setting columns per reading
pub const SETTING_COUNT: usize = 3;

/// Number of sensor channels per reading
pub const SENSOR_COUNT: usize = 21;

/// Column holding the engine identifier
pub const ENTITY_COLUMN: &str = "engine_id";
/// Column holding the cycle number
pub const CYCLE_COLUMN: &str = "cycle";
/// Column holding remaining useful life
pub const RUL_COLUMN: &str = "RUL";
/// Column holding the binary failure label
pub const LABEL_COLUMN: &str = "will_fail_soon";

/// Engine identifier (not necessarily contiguous)
pub type EntityId = u32;

/// One observation of one engine at one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub entity_id: EntityId,
    pub cycle: u32,
    pub operational_settings: [f64; SETTING_COUNT],
    pub sensor_values: [f64; SENSOR_COUNT],
}

impl Reading {
    /// Value of a sensor channel by zero-based index
    pub fn sensor(&self, index: usize) -> Option<f64> {
        self.sensor_values.get(index).copied()
    }
}

/// Name of the sensor column at zero-based `index` (`sensor_1` for 0)
pub fn sensor_column(index: usize) -> String {
    format!("sensor_{}", index + 1)
}

/// Name of the operational setting column at zero-based `index`
pub fn setting_column(index: usize) -> String {
    format!("op_setting_{}", index + 1)
}

/// Resolve a channel name such as `sensor_7` to its zero-based index
pub fn channel_index(name: &str) -> Option<usize> {
    let n: usize = name.strip_prefix("sensor_")?.parse().ok()?;
    (1..=SENSOR_COUNT).contains(&n).then(|| n - 1)
}

/// All sensor channel names in column order
pub fn all_channels() -> Vec<String> {
    (0..SENSOR_COUNT).map(sensor_column).collect()
}

/// Errors from the telemetry store and its loaders
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid cycle {cycle} for engine {entity_id}: cycles must be positive")]
    InvalidCycle { entity_id: EntityId, cycle: u32 },
    #[error("Duplicate cycle {cycle} for engine {entity_id}")]
    DuplicateCycle { entity_id: EntityId, cycle: u32 },
    #[error("Reading for engine {found} inserted into series of engine {expected}")]
    EntityMismatch { expected: EntityId, found: EntityId },
    #[error("Parse error at line {line}: {message}")]
    Parse { line: u64, message: String },
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
