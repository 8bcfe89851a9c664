//! API Module
//!
//! HTTP API layer for the dashboard server.
//! Each submodule handles endpoints for a specific domain.

pub mod columns;
pub mod error;
pub mod health;
pub mod runs;
pub mod scripts;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::runner::RunRegistry;
use crate::store::ConfigStore;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConfigStore>,
    pub runs: Arc<RunRegistry>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/api/health", get(health::health_check))
        // Merged script view and config bootstrap
        .route("/api/scripts", get(scripts::get_scripts))
        .route("/api/init", post(scripts::init_config))
        // Custom scripts
        .route("/api/custom-scripts", post(scripts::create_custom_script))
        .route("/api/custom-scripts", put(scripts::update_custom_script))
        .route("/api/custom-scripts", delete(scripts::delete_custom_script))
        .route(
            "/api/custom-scripts/arrange",
            post(scripts::arrange_custom_scripts),
        )
        // Manifest scripts
        .route("/api/package-scripts", post(scripts::upsert_package_script))
        .route("/api/delete-script", post(scripts::delete_script))
        // Per-user overrides
        .route("/api/overrides/hide", post(scripts::hide_script))
        // Columns
        .route("/api/columns", post(columns::create_column))
        .route("/api/columns/reorder", post(columns::reorder_columns))
        .route("/api/columns/{id}", put(columns::rename_column))
        .route("/api/columns/{id}", delete(columns::delete_column))
        // Runs
        .route("/api/run", post(runs::start_run))
        .route("/api/runs/{id}/stream", get(runs::stream_run))
        .route("/api/runs/{id}/stop", post(runs::stop_run))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
