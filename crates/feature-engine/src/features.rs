//! Feature Vector Types

use crate::contract::FeatureContract;
use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use series_store::EntityId;
use std::sync::Arc;

/// Rolling features for one (engine, cycle), laid out in contract order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub entity_id: EntityId,
    pub cycle: u32,
    /// `[mean_0, std_0, mean_1, std_1, ...]` per configured channel
    pub values: Vec<f64>,
}

impl FeatureVector {
    /// Rolling mean of the channel at `channel` position in the contract
    pub fn mean(&self, channel: usize) -> Option<f64> {
        self.values.get(channel * 2).copied()
    }

    /// Rolling sample std of the channel at `channel` position in the contract
    pub fn std(&self, channel: usize) -> Option<f64> {
        self.values.get(channel * 2 + 1).copied()
    }

    /// Number of channels covered
    pub fn channel_count(&self) -> usize {
        self.values.len() / 2
    }
}

/// A single validated model input row with columns fixed to a contract
#[derive(Debug, Clone)]
pub struct FeatureRow {
    contract: Arc<FeatureContract>,
    data: Array2<f64>,
}

impl FeatureRow {
    pub(crate) fn new(contract: Arc<FeatureContract>, data: Array2<f64>) -> Self {
        debug_assert_eq!(data.dim(), (1, contract.len()));
        Self { contract, data }
    }

    /// The `(1, n)` matrix handed to a model
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Values of the single row
    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.data.row(0)
    }

    /// Value of a named feature
    pub fn get(&self, name: &str) -> Option<f64> {
        self.contract.position(name).map(|pos| self.data[[0, pos]])
    }

    /// `(name, value)` pairs in contract order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.contract
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.data.row(0).into_iter().copied())
    }

    /// Flat copy of the values
    pub fn to_vec(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    /// Contract the row was validated against
    pub fn contract(&self) -> &FeatureContract {
        &self.contract
    }
}
