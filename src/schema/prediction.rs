use crate::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Column order of the California Housing features, as the dataset ships
/// them and as every trained artifact expects them.
pub const FEATURE_NAMES: [&str; 8] = [
    "MedInc",
    "HouseAge",
    "AveRooms",
    "AveBedrms",
    "Population",
    "AveOccup",
    "Latitude",
    "Longitude",
];

/// One property described by the eight California Housing features.
///
/// Deserialization guarantees presence and numeric type of every field;
/// domain constraints are checked separately by [`PredictionInput::validate`]
/// so the endpoint can report every violation, not just the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionInput {
    #[serde(rename = "MedInc")]
    pub med_inc: f64,
    #[serde(rename = "HouseAge")]
    pub house_age: f64,
    #[serde(rename = "AveRooms")]
    pub ave_rooms: f64,
    #[serde(rename = "AveBedrms")]
    pub ave_bedrms: f64,
    #[serde(rename = "Population")]
    pub population: f64,
    #[serde(rename = "AveOccup")]
    pub ave_occup: f64,
    #[serde(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutput {
    pub predicted_value: f64,
}

/// One failed field constraint, reported back to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
enum Constraint {
    GreaterThan(f64),
    AtLeast(f64),
    Between(f64, f64),
}

impl Constraint {
    fn holds(&self, value: f64) -> bool {
        match *self {
            Constraint::GreaterThan(min) => value > min,
            Constraint::AtLeast(min) => value >= min,
            Constraint::Between(min, max) => value >= min && value <= max,
        }
    }

    fn message(&self) -> String {
        match *self {
            Constraint::GreaterThan(min) => format!("must be greater than {}", min),
            Constraint::AtLeast(min) => format!("must be at least {}", min),
            Constraint::Between(min, max) => format!("must be between {} and {}", min, max),
        }
    }
}

// Domain constraints per feature, checked in this order.
const FIELD_RULES: [(&str, Constraint); 8] = [
    ("MedInc", Constraint::GreaterThan(0.0)),
    ("HouseAge", Constraint::AtLeast(0.0)),
    ("AveRooms", Constraint::GreaterThan(0.0)),
    ("AveBedrms", Constraint::GreaterThan(0.0)),
    ("Population", Constraint::AtLeast(0.0)),
    ("AveOccup", Constraint::GreaterThan(0.0)),
    ("Latitude", Constraint::Between(-90.0, 90.0)),
    ("Longitude", Constraint::Between(-180.0, 180.0)),
];

impl PredictionInput {
    /// Looks a feature value up by its wire name.
    pub fn feature(&self, name: &str) -> Option<f64> {
        match name {
            "MedInc" => Some(self.med_inc),
            "HouseAge" => Some(self.house_age),
            "AveRooms" => Some(self.ave_rooms),
            "AveBedrms" => Some(self.ave_bedrms),
            "Population" => Some(self.population),
            "AveOccup" => Some(self.ave_occup),
            "Latitude" => Some(self.latitude),
            "Longitude" => Some(self.longitude),
            _ => None,
        }
    }

    /// Checks every domain constraint and collects all violations.
    pub fn validate(&self) -> std::result::Result<(), Vec<FieldViolation>> {
        let mut violations = Vec::new();

        for (field, constraint) in FIELD_RULES {
            // Rules only name declared fields, so the lookup cannot miss.
            let value = match self.feature(field) {
                Some(value) => value,
                None => continue,
            };
            if !constraint.holds(value) {
                violations.push(FieldViolation {
                    field,
                    message: constraint.message(),
                });
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Builds the single-row feature matrix in exactly the given column
    /// order. Ordering comes from the explicit name lookup, never from the
    /// struct's field declaration order.
    pub fn to_row(&self, feature_order: &[String]) -> Result<Array2<f64>> {
        let mut values = Vec::with_capacity(feature_order.len());
        for name in feature_order {
            let value = self.feature(name).ok_or_else(|| {
                Error::prediction(format!("unknown feature '{}' in configured feature order", name))
            })?;
            values.push(value);
        }

        Array2::from_shape_vec((1, values.len()), values)
            .map_err(|e| Error::prediction(format!("failed to shape input row: {}", e)))
    }
}
