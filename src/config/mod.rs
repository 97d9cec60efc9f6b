mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use std::io::ErrorKind;
use tracing::debug;

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

    let mut config = load_from_path(&config_path).await?;
    apply_env_overrides(&mut config, |key| env::var(key).ok());
    validate(&config)?;

    Ok(config)
}

/// Reads a YAML config file. Every field has a default, so a missing file
/// yields the default configuration rather than an error.
pub async fn load_from_path(path: &str) -> Result<Config> {
    debug!("Loading configuration from: {}", path);

    match tokio::fs::read_to_string(path).await {
        Ok(raw) => Ok(serde_yaml::from_str(&raw)?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No configuration file at {}, using defaults", path);
            Ok(Config::default())
        }
        Err(e) => Err(e.into()),
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.model.feature_order.is_empty() {
        return Err(Error::config("model.feature_order must not be empty"));
    }
    let mut seen = std::collections::HashSet::new();
    for name in &config.model.feature_order {
        if !seen.insert(name) {
            return Err(Error::config(format!(
                "model.feature_order lists '{name}' twice"
            )));
        }
    }
    Ok(())
}

fn apply_env_overrides<F>(config: &mut Config, get: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(name) = get("MODEL_NAME") {
        config.model.name = name;
    }
    if let Some(stage) = get("MODEL_STAGE") {
        config.model.stage = stage;
    }
    if let Some(dir) = get("MODEL_REGISTRY_DIR") {
        config.model.registry_dir = dir;
    }
}
