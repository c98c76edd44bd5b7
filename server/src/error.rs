//! Unified error handling for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use plan_engine::{Error as EngineError, FieldError};
use serde::Serialize;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<FieldError>>,
    timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: Some(message.into()),
            details: None,
            timestamp: Utc::now(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Engine(EngineError::NotFound(key)) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("Not Found", format!("Resource with id '{key}' not found")),
            ),
            AppError::Engine(EngineError::Conflict(key)) => (
                StatusCode::CONFLICT,
                ErrorResponse::new("Conflict", format!("Resource with id '{key}' already exists")),
            ),
            AppError::Engine(EngineError::Validation(errors)) => {
                tracing::debug!(count = errors.len(), "Rejected invalid document");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Validation failed".to_string(),
                        message: None,
                        details: Some(errors),
                        timestamp: Utc::now(),
                    },
                )
            }
            AppError::Engine(e @ EngineError::InvalidClaimAmount(_)) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Bad Request", e.to_string()),
            ),
            AppError::Engine(e @ EngineError::Serialization(_)) => {
                tracing::error!("Engine error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal Server Error", "An unexpected error occurred"),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::new("Bad Request", msg)),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::new("Not Found", msg)),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, AppError>;
