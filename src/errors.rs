use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json
};
use thiserror::Error;

/// Errors raised by the engine itself
///
/// These indicate a programming or configuration defect rather than bad data:
/// bad input data (malformed stability, unresolvable links, degenerate
/// fingerprints) is always recovered locally and never surfaces here.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
    #[error("Not found")]
    NotFound,
    #[error("Invalid rating: {0}")]
    InvalidRating(String),
    #[error("Invalid unit key: {0}")]
    InvalidKey(String),
    #[error("Unit key already exists: {0}")]
    DuplicateKey(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Internal(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            ApiError::InvalidRating(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InvalidKey(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::DuplicateKey(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
