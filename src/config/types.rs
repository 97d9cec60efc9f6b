use crate::schema::FEATURE_NAMES;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Where the served model lives in the registry, plus the column order
/// the artifact was trained with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub name: String,
    #[serde(default = "default_model_stage")]
    pub stage: String,
    #[serde(default = "default_registry_dir")]
    pub registry_dir: String,
    #[serde(default = "default_feature_order")]
    pub feature_order: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            stage: default_model_stage(),
            registry_dir: default_registry_dir(),
            feature_order: default_feature_order(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_model_name() -> String {
    "property-price-predictor".to_string()
}

fn default_model_stage() -> String {
    "staging".to_string()
}

fn default_registry_dir() -> String {
    "mlruns".to_string()
}

fn default_feature_order() -> Vec<String> {
    FEATURE_NAMES.iter().map(|name| name.to_string()).collect()
}
