use super::{ForestHyperparams, Model, RandomForestRegressor, StandardScaler};
use crate::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// The artifact the registry stores: a fitted scaler and forest together
/// with the feature order they were trained on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingPipeline {
    feature_names: Vec<String>,
    scaler: StandardScaler,
    forest: RandomForestRegressor,
}

impl PricingPipeline {
    pub fn fit(
        rows: &Array2<f64>,
        targets: &[f64],
        feature_names: &[String],
        params: ForestHyperparams,
    ) -> Result<Self> {
        if feature_names.len() != rows.ncols() {
            return Err(Error::training(format!(
                "{} feature names given for a matrix with {} columns",
                feature_names.len(),
                rows.ncols()
            )));
        }

        let scaler = StandardScaler::fit(rows)?;
        let scaled = scaler.transform(rows)?;
        let forest = RandomForestRegressor::fit(&scaled, targets, params)?;

        Ok(Self {
            feature_names: feature_names.to_vec(),
            scaler,
            forest,
        })
    }

    /// Column order the pipeline expects at inference time.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn params(&self) -> ForestHyperparams {
        self.forest.params()
    }
}

impl Model for PricingPipeline {
    fn predict(&self, rows: &Array2<f64>) -> Result<Vec<f64>> {
        let scaled = self.scaler.transform(rows)?;
        self.forest.predict(&scaled)
    }
}
