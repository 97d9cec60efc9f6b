use pricer_rust::config::{Config, LogsConfig, ModelConfig, ServerConfig};
use pricer_rust::schema::FEATURE_NAMES;
use serde_json::{json, Value};
use std::path::Path;

/// Create a test configuration pointing the registry at the given directory
pub fn create_test_config(registry_dir: &Path) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            logs: LogsConfig {
                level: "debug".to_string(),
            },
        },
        model: ModelConfig {
            name: "property-price-predictor".to_string(),
            stage: "staging".to_string(),
            registry_dir: registry_dir.to_string_lossy().to_string(),
            feature_order: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
        },
    }
}

/// The canonical valid request body: the first Census block group of the
/// California Housing dataset.
pub fn sample_request() -> Value {
    json!({
        "MedInc": 8.3252,
        "HouseAge": 41.0,
        "AveRooms": 6.984127,
        "AveBedrms": 1.023810,
        "Population": 322.0,
        "AveOccup": 2.555556,
        "Latitude": 37.88,
        "Longitude": -122.23
    })
}

/// Write a synthetic dataset shaped like the California Housing CSV. The
/// target tracks income and rooms closely enough for a small forest to
/// learn something measurable.
pub async fn write_housing_csv(path: &Path, rows: usize) -> String {
    let mut contents = String::from(
        "MedInc,HouseAge,AveRooms,AveBedrms,Population,AveOccup,Latitude,Longitude,MedHouseVal\n",
    );
    for i in 0..rows {
        let med_inc = 1.0 + (i % 10) as f64 * 0.8;
        let house_age = 5.0 + (i % 40) as f64;
        let ave_rooms = 3.0 + (i % 7) as f64 * 0.5;
        let ave_bedrms = 1.0 + (i % 3) as f64 * 0.1;
        let population = 300.0 + (i * 37 % 2000) as f64;
        let ave_occup = 2.0 + (i % 5) as f64 * 0.3;
        let latitude = 33.0 + (i % 50) as f64 * 0.1;
        let longitude = -122.0 + (i % 30) as f64 * 0.1;
        let target = 0.5 * med_inc + 0.2 * ave_rooms + 0.01 * house_age;
        contents.push_str(&format!(
            "{med_inc},{house_age},{ave_rooms},{ave_bedrms},{population},{ave_occup},{latitude},{longitude},{target}\n"
        ));
    }

    tokio::fs::write(path, &contents).await.unwrap();
    path.to_string_lossy().to_string()
}
