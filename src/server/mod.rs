pub mod handlers;
mod types;

pub use handlers::AppState;

use crate::config::Config;
use crate::predictor::PredictorCell;
use crate::Result;
use axum::routing::{get, post};
use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Builds the application router over the given state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/predict/", post(handlers::predict))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    let predictor = Arc::new(PredictorCell::new(config.clone()));

    // The service never accepts traffic without a model: a load failure
    // here aborts startup.
    let service = predictor.get_or_init().await?;
    info!("Model {} loaded and ready to serve", service.model_uri());

    let app = app(AppState { predictor });

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
