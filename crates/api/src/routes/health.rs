//! Service banner and health endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tracing::warn;

use crate::routes::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(banner)).route("/health", get(health))
}

/// GET / - Service banner with the endpoint map
async fn banner() -> impl IntoResponse {
    Json(json!({
        "message": "Calendar reminder API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "events": "/api/v1/events",
            "mobile": "/api/mobile",
            "notifications": "/api/v1/notifications",
            "health": "/health",
        },
    }))
}

/// GET /health - Database connectivity check
async fn health(State(ctx): State<AppState>) -> impl IntoResponse {
    let db = ctx.db.clone();
    let result = tokio::task::spawn_blocking(move || db.health_check()).await;

    match result {
        Ok(Ok(())) => (StatusCode::OK, Json(json!({ "status": "ok", "database": "connected" }))),
        Ok(Err(err)) => {
            warn!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "error", "message": "Database health check failed" })),
            )
        }
        Err(err) => {
            warn!(error = %err, "health check task failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "error", "message": "Health check did not complete" })),
            )
        }
    }
}
