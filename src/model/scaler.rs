use crate::{Error, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Per-column standardization: subtract the training mean, divide by the
/// training standard deviation. Columns with zero variance keep a divisor
/// of 1.0 so constant features pass through centered instead of producing
/// NaN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(rows: &Array2<f64>) -> Result<Self> {
        if rows.nrows() == 0 {
            return Err(Error::training("cannot fit a scaler on an empty matrix"));
        }

        let mean = rows
            .mean_axis(Axis(0))
            .ok_or_else(|| Error::training("cannot fit a scaler on a zero-column matrix"))?;
        let std = rows
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s == 0.0 { 1.0 } else { s });

        Ok(Self { mean, std })
    }

    pub fn transform(&self, rows: &Array2<f64>) -> Result<Array2<f64>> {
        if rows.ncols() != self.mean.len() {
            return Err(Error::prediction(format!(
                "scaler was fitted on {} features but received {}",
                self.mean.len(),
                rows.ncols()
            )));
        }
        Ok((rows - &self.mean) / &self.std)
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }
}
