use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use serde::Deserialize;
use validator::Validate;

use crate::auth::CustomerIdentity;
use crate::errors::ApiError;
use crate::handlers::common::{
    created_empty_response, map_service_error, success_empty_response, success_response,
    validate_input,
};
use crate::services::customers::{LoginInput, RegisterInput};
use crate::AppState;

/// Routes reachable without a session
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/customers", post(register))
        .route("/customers/login", post(login))
}

/// Routes requiring an authenticated customer
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/customers/logout", post(logout))
}

/// Register a new customer account
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .customers
        .register(RegisterInput {
            name: payload.name,
            username: payload.username,
            email: payload.email,
            password: payload.password,
            phone_number: payload.phone_number,
            address: payload.address,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_empty_response())
}

/// Exchange credentials for a session token
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let session = state
        .services
        .customers
        .login(LoginInput {
            username: payload.username,
            password: payload.password,
        })
        .await
        .map_err(map_service_error)?;

    Ok(success_response(session))
}

/// Revoke the caller's session
async fn logout(
    State(state): State<AppState>,
    identity: CustomerIdentity,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .customers
        .logout(&identity.username)
        .await
        .map_err(map_service_error)?;

    Ok(success_empty_response())
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 3))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1))]
    pub phone_number: String,
    #[validate(length(min = 1))]
    pub address: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}
