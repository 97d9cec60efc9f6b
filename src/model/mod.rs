mod forest;
mod pipeline;
mod scaler;

pub use forest::{ForestHyperparams, RandomForestRegressor};
pub use pipeline::PricingPipeline;
pub use scaler::StandardScaler;

use crate::Result;
use ndarray::Array2;

/// Opaque inference handle the serving layer works against: tabular rows
/// in, one scalar per row out.
pub trait Model: Send + Sync {
    fn predict(&self, rows: &Array2<f64>) -> Result<Vec<f64>>;
}
