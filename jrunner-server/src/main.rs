use std::sync::Arc;

use tower_http::services::{ServeDir, ServeFile};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod runner;
pub mod service;
pub mod store;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jrunner_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting jrunner server...");

    let config = config::Config::from_env();
    config.validate().expect("Invalid configuration");

    let store = Arc::new(store::ConfigStore::new(config.project_dir.clone()));
    let runs = Arc::new(runner::RunRegistry::new(config.project_dir.clone()));

    // Build router with all API endpoints
    let mut app = api::create_router(api::AppState { store, runs });

    // In production the same server hands out the pre-built UI bundle, with
    // index.html as the catch-all for client-side routes
    if config.production {
        tracing::info!("Serving UI bundle from {}", config.ui_dir.display());
        app = app.fallback_service(
            ServeDir::new(&config.ui_dir)
                .not_found_service(ServeFile::new(config.ui_dir.join("index.html"))),
        );
    }

    let addr = format!("0.0.0.0:{}", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!(
        "jrunner server listening on http://localhost:{}",
        config.port
    );

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
