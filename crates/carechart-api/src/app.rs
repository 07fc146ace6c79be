//! Application builder: wires router, middleware and state into an Axum
//! app, and runs the server.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use carechart_core::config::AppConfig;
use carechart_core::error::AppError;
use carechart_database::Stores;

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(request_logging))
}

/// Runs the CareChart server with the given configuration.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting CareChart server...");

    config.auth.check()?;
    let stores = Stores::from_config(&config.database).await?;

    let addr = config.server.bind_address();
    let state = AppState::new(config, stores);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!("CareChart server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    info!("CareChart server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to install Ctrl+C handler");
    }
}
