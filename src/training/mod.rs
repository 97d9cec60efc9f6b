mod metrics;

pub use metrics::{mean_absolute_error, r2_score, root_mean_squared_error};

use crate::config::Config;
use crate::dataset;
use crate::model::{ForestHyperparams, Model, PricingPipeline};
use crate::registry::{FsModelRegistry, RunRecord};
use crate::{Error, Result};
use tracing::info;

/// Column holding the regression target in the California Housing CSV.
pub const TARGET_COLUMN: &str = "MedHouseVal";

/// Hyperparameters and run coordinates for one training invocation.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub data_path: String,
    pub experiment_name: String,
    pub n_estimators: usize,
    pub max_depth: usize,
    pub test_size: f64,
    pub random_state: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            data_path: "data/california_housing.csv".to_string(),
            experiment_name: "property-pricing".to_string(),
            n_estimators: 100,
            max_depth: 10,
            test_size: 0.2,
            random_state: 42,
        }
    }
}

/// What a completed training run produced.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub run_id: String,
    pub version: u32,
    pub r2: f64,
    pub mae: f64,
    pub rmse: f64,
}

/// Fits the pricing pipeline on the configured dataset, evaluates it on a
/// held-out split, and publishes the result: run record, new model version,
/// and the stage alias pointed at that version.
pub async fn run(config: &Config, options: &TrainOptions) -> Result<TrainingReport> {
    let data = dataset::load_csv(&options.data_path, TARGET_COLUMN).await?;
    info!(
        "Loaded dataset: {} samples, {} features",
        data.n_samples(),
        data.n_features()
    );

    if data.feature_names != config.model.feature_order {
        return Err(Error::training(format!(
            "dataset columns {:?} do not match the configured feature order {:?}",
            data.feature_names, config.model.feature_order
        )));
    }

    let (train, test) = dataset::train_test_split(&data, options.test_size, options.random_state)?;
    info!(
        "Split dataset: {} training samples, {} test samples",
        train.n_samples(),
        test.n_samples()
    );

    let params = ForestHyperparams {
        n_estimators: options.n_estimators,
        max_depth: options.max_depth,
        random_state: options.random_state,
    };
    info!(
        "Fitting pipeline: StandardScaler + RandomForest ({} trees, depth {})",
        params.n_estimators, params.max_depth
    );
    let pipeline = PricingPipeline::fit(&train.features, &train.targets, &train.feature_names, params)?;

    let predicted = pipeline.predict(&test.features)?;
    let r2 = r2_score(&test.targets, &predicted)?;
    let mae = mean_absolute_error(&test.targets, &predicted)?;
    let rmse = root_mean_squared_error(&test.targets, &predicted)?;
    info!("Evaluation: r2={:.4} mae={:.4} rmse={:.4}", r2, mae, rmse);

    let mut record = RunRecord::new(&options.experiment_name);
    record.log_param("n_estimators", options.n_estimators);
    record.log_param("max_depth", options.max_depth);
    record.log_param("test_size", options.test_size);
    record.log_param("random_state", options.random_state);
    record.log_metric("r2", r2);
    record.log_metric("mae", mae);
    record.log_metric("rmse", rmse);
    record.set_tag("pipeline_description", "StandardScaler + RandomForest");
    record.set_tag("dataset", "California Housing");

    let registry = FsModelRegistry::new(&config.model.registry_dir);
    registry.log_run(&record).await?;

    let version = registry
        .register_model(&config.model.name, &pipeline, &record.run_id)
        .await?;
    registry
        .set_alias(&config.model.name, &config.model.stage, version.version)
        .await?;
    info!(
        "Published model '{}' version {} under stage '{}' (run {})",
        config.model.name, version.version, config.model.stage, record.run_id
    );

    Ok(TrainingReport {
        run_id: record.run_id,
        version: version.version,
        r2,
        mae,
        rmse,
    })
}
