//! Rolling Window Feature Computation
//!
//! For every reading of an engine, computes the mean and sample standard
//! deviation of each configured sensor over the trailing `window` readings
//! of that same engine. Windows shrink at the start of a series (minimum
//! periods of one) and never pad.

use crate::contract::FeatureContract;
use crate::error::FeatureError;
use crate::features::FeatureVector;
use crate::statistics::WindowStats;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use series_store::{TimeSeries, TimeSeriesStore};
use tracing::{debug, info};

/// Default trailing window in cycles
pub const DEFAULT_WINDOW: usize = 10;

/// Feature computation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Trailing window size in readings
    pub window: usize,
    /// Sensor channels to featurize, in output order
    pub channels: Vec<String>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            channels: series_store::all_channels(),
        }
    }
}

/// Computes rolling mean/std features per engine
#[derive(Debug, Clone)]
pub struct RollingFeatureComputer {
    contract: FeatureContract,
    /// Zero-based sensor index per configured channel
    channel_indices: Vec<usize>,
    window: usize,
}

impl RollingFeatureComputer {
    /// Create a computer, rejecting unknown channels and a zero window up front
    pub fn new(config: &FeatureConfig) -> Result<Self, FeatureError> {
        let contract = FeatureContract::build(&config.channels)?.with_window(config.window)?;
        let channel_indices = config
            .channels
            .iter()
            .map(|c| {
                series_store::channel_index(c).ok_or_else(|| FeatureError::UnknownChannel(c.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "Rolling feature computer: window={}, channels={}",
            config.window,
            channel_indices.len()
        );
        Ok(Self {
            contract,
            channel_indices,
            window: config.window,
        })
    }

    /// Contract describing the produced vectors
    pub fn contract(&self) -> &FeatureContract {
        &self.contract
    }

    /// Trailing window size
    pub fn window(&self) -> usize {
        self.window
    }

    /// One feature vector per reading of a single engine, in cycle order
    pub fn compute(&self, series: &TimeSeries) -> Vec<FeatureVector> {
        let readings = series.readings();
        let columns: Vec<Vec<f64>> = self
            .channel_indices
            .iter()
            .map(|&idx| series.channel_values(idx))
            .collect();

        let mut vectors = Vec::with_capacity(readings.len());
        for (i, reading) in readings.iter().enumerate() {
            let start = (i + 1).saturating_sub(self.window);
            let mut values = Vec::with_capacity(self.contract.len());
            for column in &columns {
                let stats = WindowStats::compute(&column[start..=i]);
                values.push(stats.mean);
                values.push(stats.std_dev);
            }
            vectors.push(FeatureVector {
                entity_id: reading.entity_id,
                cycle: reading.cycle,
                values,
            });
        }
        debug!(
            "Engine {}: computed {} feature vectors",
            series.entity_id(),
            vectors.len()
        );
        vectors
    }

    /// Feature vectors for every engine in the store.
    ///
    /// Engines are computed in parallel and concatenated in ascending engine
    /// id order, each keeping its cycle order.
    pub fn compute_all(&self, store: &TimeSeriesStore) -> Vec<FeatureVector> {
        let series: Vec<&TimeSeries> = store.iter().collect();
        let per_engine: Vec<Vec<FeatureVector>> =
            series.par_iter().map(|s| self.compute(s)).collect();

        let vectors: Vec<FeatureVector> = per_engine.into_iter().flatten().collect();
        info!(
            "Computed {} feature vectors for {} engines",
            vectors.len(),
            store.entity_count()
        );
        vectors
    }
}
