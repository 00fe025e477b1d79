//! Online Feature Adapter
//!
//! Turns a request's flat feature vector into a single model input row.
//! Purely structural: the caller computed the rolling features; this only
//! checks them against the contract and fixes the column order.

use crate::contract::FeatureContract;
use crate::error::FeatureError;
use crate::features::FeatureRow;
use ndarray::Array2;
use std::sync::Arc;

/// Stateless adapter over a shared read-only contract
#[derive(Debug, Clone)]
pub struct OnlineFeatureAdapter {
    contract: Arc<FeatureContract>,
}

impl OnlineFeatureAdapter {
    pub fn new(contract: Arc<FeatureContract>) -> Self {
        Self { contract }
    }

    /// Contract requests are checked against
    pub fn contract(&self) -> &Arc<FeatureContract> {
        &self.contract
    }

    /// Validate `raw` and reshape it into a `(1, n)` row
    pub fn adapt(&self, raw: &[f64]) -> Result<FeatureRow, FeatureError> {
        self.contract.validate(raw)?;

        if let Some(position) = raw.iter().position(|v| !v.is_finite()) {
            return Err(FeatureError::NonFinite {
                position,
                name: self.contract.names()[position].clone(),
            });
        }

        let data = Array2::from_shape_vec((1, raw.len()), raw.to_vec())?;
        Ok(FeatureRow::new(Arc::clone(&self.contract), data))
    }
}
