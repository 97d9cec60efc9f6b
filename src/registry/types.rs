use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const URI_SCHEME: &str = "models:/";

/// Registry address of a deployable model: `models:/<name>@<stage>`.
///
/// The stage part is an alias, not a version number, so the same URI keeps
/// pointing at whatever the registry currently serves under that stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelUri {
    pub name: String,
    pub stage: String,
}

impl ModelUri {
    pub fn new(name: impl Into<String>, stage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stage: stage.into(),
        }
    }
}

impl fmt::Display for ModelUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}@{}", URI_SCHEME, self.name, self.stage)
    }
}

impl FromStr for ModelUri {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let rest = raw
            .strip_prefix(URI_SCHEME)
            .ok_or_else(|| Error::registry(format!("model URI must start with '{URI_SCHEME}': {raw}")))?;
        let (name, stage) = rest
            .split_once('@')
            .ok_or_else(|| Error::registry(format!("model URI is missing '@<stage>': {raw}")))?;
        if name.is_empty() || stage.is_empty() {
            return Err(Error::registry(format!(
                "model URI needs a non-empty name and stage: {raw}"
            )));
        }
        Ok(Self::new(name, stage))
    }
}

/// One registered model version and the run that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub name: String,
    pub version: u32,
    pub run_id: String,
    pub created_at: DateTime<Utc>,
}

/// Parameters, metrics, and tags captured for one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub experiment: String,
    pub params: HashMap<String, String>,
    pub metrics: HashMap<String, f64>,
    pub tags: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl RunRecord {
    pub fn new(experiment: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            experiment: experiment.into(),
            params: HashMap::new(),
            metrics: HashMap::new(),
            tags: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn log_param(&mut self, key: impl Into<String>, value: impl ToString) {
        self.params.insert(key.into(), value.to_string());
    }

    pub fn log_metric(&mut self, key: impl Into<String>, value: f64) {
        self.metrics.insert(key.into(), value);
    }

    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_uri_display_round_trips_through_parse() {
        let uri = ModelUri::new("property-price-predictor", "staging");
        assert_eq!(uri.to_string(), "models:/property-price-predictor@staging");
        assert_eq!(uri.to_string().parse::<ModelUri>().unwrap(), uri);
    }

    #[test]
    fn test_uri_parse_rejects_malformed_input() {
        assert!("property-price-predictor@staging".parse::<ModelUri>().is_err());
        assert!("models:/property-price-predictor".parse::<ModelUri>().is_err());
        assert!("models:/@staging".parse::<ModelUri>().is_err());
        assert!("models:/name@".parse::<ModelUri>().is_err());
    }

    #[test]
    fn test_run_record_collects_params_metrics_and_tags() {
        let mut record = RunRecord::new("property-pricing");
        record.log_param("n_estimators", 100);
        record.log_metric("r2", 0.82);
        record.set_tag("dataset", "California Housing");

        assert_eq!(record.experiment, "property-pricing");
        assert_eq!(record.params.get("n_estimators"), Some(&"100".to_string()));
        assert_eq!(record.metrics.get("r2"), Some(&0.82));
        assert_eq!(
            record.tags.get("dataset"),
            Some(&"California Housing".to_string())
        );
        assert!(!record.run_id.is_empty());
    }

    #[test]
    fn test_each_run_record_gets_a_fresh_id() {
        let first = RunRecord::new("exp");
        let second = RunRecord::new("exp");
        assert_ne!(first.run_id, second.run_id);
    }
}
