use ndarray::Array2;
use pricer_rust::model::Model;
use pricer_rust::{Error, Result};
use std::sync::{Arc, Mutex};

/// Mock model that returns a fixed value for every row and records the
/// row matrices it was asked to score.
pub struct StubModel {
    value: f64,
    rows_seen: Arc<Mutex<Vec<Array2<f64>>>>,
}

impl StubModel {
    pub fn returning(value: f64) -> Self {
        Self {
            value,
            rows_seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle that stays usable after the mock moves into an `Arc<dyn Model>`.
    pub fn rows_handle(&self) -> Arc<Mutex<Vec<Array2<f64>>>> {
        Arc::clone(&self.rows_seen)
    }
}

impl Model for StubModel {
    fn predict(&self, rows: &Array2<f64>) -> Result<Vec<f64>> {
        self.rows_seen.lock().unwrap().push(rows.clone());
        Ok(vec![self.value; rows.nrows()])
    }
}

/// Mock model that fails every prediction with the given message.
pub struct FailingModel {
    message: String,
}

impl FailingModel {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Model for FailingModel {
    fn predict(&self, _rows: &Array2<f64>) -> Result<Vec<f64>> {
        Err(Error::prediction(self.message.clone()))
    }
}
