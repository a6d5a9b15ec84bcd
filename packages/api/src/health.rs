// ABOUTME: Liveness endpoint
// ABOUTME: Reports service version and whether the database answers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::warn;

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => "ok",
        Err(e) => {
            warn!("Health check database query failed: {}", e);
            "unavailable"
        }
    };
    let status = if database == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if database == "ok" { "healthy" } else { "degraded" },
            "database": database,
            "timestamp": chrono::Utc::now().timestamp(),
            "version": env!("CARGO_PKG_VERSION"),
            "service": "storefront-api"
        })),
    )
}
