//! Plan Server - HTTP API over the plan engine.
//!
//! Validates incoming plan documents, stores them in a versioned store with
//! `ETag`/`If-None-Match` support, and computes cost splits for claims.

pub mod config;
pub mod error;
mod handlers;
mod routes;

use crate::config::Config;
use axum::{extract::DefaultBodyLimit, Router};
use plan_engine::VersionedStore;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<VersionedStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// State with an empty store.
    pub fn new(config: Config) -> Self {
        Self {
            store: VersionedStore::new_shared(),
            config: Arc::new(config),
        }
    }
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(DefaultBodyLimit::max(state.config.body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
