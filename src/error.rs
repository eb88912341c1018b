use axum::{http::StatusCode, Json};
use serde_json::json;
use thiserror::Error;
use crate::utils::validation::FieldError;

/// Failures talking to the backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to get DB connection: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("database error: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Query(diesel::result::Error::NotFound))
    }
}

/// Error shape returned by every JSON handler: a status and `{"error": ...}`.
pub type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

pub fn validation_failure(err: FieldError) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": err.message, "field": err.field })),
    )
}

/// Logs a store failure and maps it to a response. Missing rows become 404.
pub fn store_failure(context: &str, err: StoreError) -> ApiError {
    if err.is_not_found() {
        return api_error(StatusCode::NOT_FOUND, format!("{} not found", context));
    }
    tracing::error!("Database error while handling {}: {}", context, err);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
}
