//! HTTP route definitions.

mod health;
mod plans;

use crate::error::AppError;
use crate::AppState;
use axum::Router;

/// Create all application routes.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .nest("/api/v1", plans::routes())
        .fallback(not_found)
}

/// Fallback for unknown paths.
async fn not_found() -> AppError {
    AppError::NotFound("The requested endpoint does not exist".to_string())
}
