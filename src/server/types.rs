use crate::schema::FieldViolation;
use serde::Serialize;

/// Body for 5xx responses. The prefix inside `detail` tells a model load
/// failure apart from a prediction failure.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Body for 422 responses: one entry per violated field constraint.
#[derive(Debug, Serialize)]
pub struct ValidationErrorResponse {
    pub detail: Vec<FieldViolation>,
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
