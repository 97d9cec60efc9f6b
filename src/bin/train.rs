use anyhow::Result;
use clap::Parser;
use pricer_rust::config;
use pricer_rust::training::{self, TrainOptions};
use tracing::info;

/// Offline training entry point.
#[derive(Parser, Debug)]
#[command(
    name = "pricer-train",
    about = "Fits the property pricing pipeline and publishes it to the model registry",
    version
)]
struct Cli {
    /// Experiment name the run is recorded under.
    #[arg(long, default_value = "property-pricing")]
    experiment_name: String,

    /// Number of trees in the random forest.
    #[arg(long, default_value_t = 100)]
    n_estimators: usize,

    /// Maximum depth of each tree.
    #[arg(long, default_value_t = 10)]
    max_depth: usize,

    /// Fraction of rows held out for evaluation.
    #[arg(long, default_value_t = 0.2)]
    test_size: f64,

    /// Seed for the split and the forest.
    #[arg(long, default_value_t = 42)]
    random_state: u64,

    /// Path to the California Housing CSV.
    #[arg(long, default_value = "data/california_housing.csv")]
    data: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    info!("pricer-train v{}", env!("CARGO_PKG_VERSION"));

    // The trainer shares the service configuration so the registered model
    // lands where the server will look for it.
    let config = config::load().await?;

    let options = TrainOptions {
        data_path: cli.data,
        experiment_name: cli.experiment_name,
        n_estimators: cli.n_estimators,
        max_depth: cli.max_depth,
        test_size: cli.test_size,
        random_state: cli.random_state,
    };

    let report = training::run(&config, &options).await?;
    info!(
        "Run {} registered version {}: r2={:.4} mae={:.4} rmse={:.4}",
        report.run_id, report.version, report.r2, report.mae, report.rmse
    );

    Ok(())
}
