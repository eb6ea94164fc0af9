use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

use crate::{db, ApiResponse, AppState};

/// Creates the router for health and status endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(status))
}

/// Readiness: pings the database and probes the session cache
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database_up = db::check_connection(&state.db).await.is_ok();
    let cache_up = state.session_cache.get("health-probe").await.is_ok();

    if database_up && cache_up {
        (
            StatusCode::OK,
            Json(ApiResponse::success(json!({
                "database": "up",
                "cache": "up",
            }))),
        )
    } else {
        tracing::error!(database_up, cache_up, "Health check failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error("service unhealthy".to_string())),
        )
    }
}

/// Liveness: static build and environment information
async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
    })))
}
