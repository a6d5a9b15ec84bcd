// ABOUTME: Server wiring for the storefront binary
// ABOUTME: Opens the database, builds the API router with CORS and serves it

use std::net::SocketAddr;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use axum::Router;
use storefront_api::{create_router, AppState};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub mod config;
pub mod seed;

#[cfg(test)]
mod tests;

pub use config::{Config, ConfigError};

/// Full application with the CORS policy for the configured UI origin
pub fn build_app(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(Any);

    Ok(create_router(state).layer(cors))
}

pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let pool = storefront_storage::open_database(Some(config.database_path.clone()))
        .await
        .context("Failed to open database")?;

    let state = AppState::new(pool, config.api_settings());
    let app = build_app(state, &config.cors_origin)?;

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(
        "Storefront API listening on http://{} (database: {})",
        addr,
        config.database_path.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
