use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::auth::CustomerIdentity;
use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, map_service_error, success_response, validate_input,
};
use crate::services::checkout::CheckoutInput;
use crate::AppState;

/// Creates the router for checkout endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout))
        .route("/transactions/:id", get(get_transaction))
}

/// Convert the caller's active cart into a transaction
async fn checkout(
    State(state): State<AppState>,
    identity: CustomerIdentity,
    Json(payload): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let transaction = state
        .services
        .checkout
        .checkout(CheckoutInput {
            customer_id: identity.customer_id,
            cart_id: payload.shopping_cart_id,
            payment_method: payload.payment_method,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(transaction))
}

/// Fetch a transaction by id
async fn get_transaction(
    State(state): State<AppState>,
    _identity: CustomerIdentity,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let transaction = state
        .services
        .checkout
        .get_transaction(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(transaction))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(range(min = 1))]
    pub shopping_cart_id: i64,
    /// Raw wire value; the checkout workflow validates it against the
    /// payment-method enumeration.
    pub payment_method: i32,
}
