use super::types::{ErrorResponse, HealthResponse, RootResponse, ValidationErrorResponse};
use crate::predictor::PredictorCell;
use crate::schema::{PredictionInput, PredictionOutput};
use crate::Error;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<PredictorCell>,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Property Pricing API",
        status: "running",
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn predict(
    State(state): State<AppState>,
    Json(input): Json<PredictionInput>,
) -> Result<Json<PredictionOutput>, Response> {
    info!("Received prediction request");

    if let Err(violations) = input.validate() {
        warn!(
            "Rejected prediction request with {} field violation(s)",
            violations.len()
        );
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ValidationErrorResponse { detail: violations }),
        )
            .into_response());
    }

    let service = match state.predictor.get_or_init().await {
        Ok(service) => service,
        Err(e) => {
            error!("Failed to load model: {}", e);
            return Err(load_failure(&e));
        }
    };

    match service.predict(&input) {
        Ok(output) => {
            info!("Prediction served: {}", output.predicted_value);
            Ok(Json(output))
        }
        Err(e @ Error::ModelNotLoaded) => {
            error!("Failed to load model: {}", e);
            Err(load_failure(&e))
        }
        Err(e) => {
            error!("Prediction failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    detail: format!("Failed to run prediction: {e}"),
                }),
            )
                .into_response())
        }
    }
}

fn load_failure(e: &Error) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            detail: format!("Failed to load model: {e}"),
        }),
    )
        .into_response()
}
