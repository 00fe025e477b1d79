//! Feature Engineering Engine
//!
//! Rolling-window sensor statistics computed offline, and the feature
//! contract that keeps online request vectors aligned with the columns a
//! model was trained on.

mod adapter;
mod contract;
mod error;
mod features;
mod rolling;
mod statistics;
mod table;

pub use adapter::OnlineFeatureAdapter;
pub use contract::{FeatureContract, CONTRACT_VERSION};
pub use error::FeatureError;
pub use features::{FeatureRow, FeatureVector};
pub use rolling::{FeatureConfig, RollingFeatureComputer, DEFAULT_WINDOW};
pub use statistics::WindowStats;
pub use table::{read_feature_columns, write_feature_table};
