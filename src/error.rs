//! Error types for the user service
//!
//! `StoreError` is what the backing store reports and what the cache hands
//! back unchanged. `AppError` is the service and HTTP level error.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Store Error Enum ==
/// Failure reported by the user store.
///
/// `Clone` so one failed load can be delivered to every waiter on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No matching record
    #[error("Not found: {0}")]
    NotFound(String),

    /// Commit rejected by a uniqueness constraint
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Transient failure; the caller may retry
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// True when the store reported that no record matched.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

// == App Error Enum ==
/// Unified error type for the service and its HTTP API.
#[derive(Error, Debug)]
pub enum AppError {
    /// Requested user does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Email already in use
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Backing store failed
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Unavailable(msg) => AppError::Unavailable(msg),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Unavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable".to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected fault happened. Try again later.".to_string(),
            ),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the service.
pub type Result<T> = std::result::Result<T, AppError>;
