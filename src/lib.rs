//! Online-store API library
//!
//! Customer accounts, product catalog, shopping carts, and checkout into
//! transactions, backed by a relational store and a session-token cache.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod repositories;
pub mod services;

use axum::{middleware, Router};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub auth: Arc<auth::AuthService>,
    pub session_cache: Arc<dyn cache::SessionStore>,
    pub services: handlers::AppServices,
}

/// Response envelope wrapping every payload.
///
/// `message` is `"success"` on the happy path and an error string
/// otherwise; `data` is omitted entirely on failures.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            message,
            data: None,
        }
    }
}

impl ApiResponse<serde_json::Value> {
    pub fn success_empty() -> Self {
        Self {
            message: "success".to_string(),
            data: None,
        }
    }
}

/// Versioned API routes: public account/health endpoints plus the
/// auth-gated store surface.
pub fn api_v1_routes(state: AppState) -> Router {
    let public = Router::new()
        .merge(handlers::customers::public_routes())
        .merge(handlers::health::routes());

    let protected = Router::new()
        .merge(handlers::customers::protected_routes())
        .merge(handlers::categories::routes())
        .merge(handlers::products::routes())
        .merge(handlers::carts::routes())
        .merge(handlers::checkout::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new().merge(public).merge(protected).with_state(state)
}

/// Full application router
pub fn app_router(state: AppState) -> Router {
    Router::new().nest("/api/v1", api_v1_routes(state))
}
