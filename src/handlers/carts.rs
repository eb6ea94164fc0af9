use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::CustomerIdentity;
use crate::entities::CartStatus;
use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, map_service_error, success_empty_response, success_response, validate_input,
};
use crate::services::carts::{AddItemInput, AddItemsInput};
use crate::AppState;

/// Creates the router for cart endpoints
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/carts", post(add_items).get(list_carts))
        .route("/carts/items/:item_id", delete(remove_item))
}

/// Add items to the caller's active cart, creating it when absent
async fn add_items(
    State(state): State<AppState>,
    identity: CustomerIdentity,
    Json(payload): Json<AddItemsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    for item in &payload.items {
        validate_input(item)?;
    }

    let input = AddItemsInput {
        customer_id: identity.customer_id,
        items: payload
            .items
            .into_iter()
            .map(|item| AddItemInput {
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
            })
            .collect(),
    };

    let cart = state
        .services
        .carts
        .add_items(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(cart))
}

/// List the caller's carts, optionally filtered by status
async fn list_carts(
    State(state): State<AppState>,
    identity: CustomerIdentity,
    Query(query): Query<ListCartsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = match query.status {
        Some(value) => Some(
            CartStatus::from_value(value)
                .ok_or_else(|| ApiError::ValidationError("invalid status".to_string()))?,
        ),
        None => None,
    };

    let carts = state
        .services
        .carts
        .get_by_params(identity.customer_id, status)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(carts))
}

/// Remove a line item from the caller's active cart
async fn remove_item(
    State(state): State<AppState>,
    identity: CustomerIdentity,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .carts
        .delete_item(item_id, identity.customer_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_empty_response())
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemsRequest {
    #[validate(length(min = 1, message = "at least one item is required"))]
    pub items: Vec<AddItemRequest>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct AddItemRequest {
    #[validate(range(min = 1))]
    pub product_id: i64,
    #[validate(range(min = 1))]
    pub quantity: i32,
    /// Caller-supplied unit price; carried for the request shape, not
    /// validated against the catalog.
    pub price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ListCartsQuery {
    pub status: Option<i32>,
}
