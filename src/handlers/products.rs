use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::auth::CustomerIdentity;
use crate::errors::ApiError;
use crate::handlers::common::{
    created_empty_response, map_service_error, success_response, validate_input,
};
use crate::repositories::ProductQuery;
use crate::services::products::CreateProductInput;
use crate::AppState;

const DEFAULT_LIMIT: u64 = 10;
const DEFAULT_PAGE: u64 = 1;

/// Creates the router for product endpoints
pub fn routes() -> Router<AppState> {
    Router::new().route("/products", post(create_product).get(list_products))
}

/// Create a product under an existing category
async fn create_product(
    State(state): State<AppState>,
    _identity: CustomerIdentity,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .products
        .create(CreateProductInput {
            name: payload.name,
            description: payload.description,
            price: payload.price,
            stock_quantity: payload.stock_quantity,
            category_id: payload.category_id,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_empty_response())
}

/// List products, optionally filtered by category
async fn list_products(
    State(state): State<AppState>,
    _identity: CustomerIdentity,
    Query(query): Query<ListProductsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .products
        .list(ProductQuery {
            category_id: query.category_id,
            limit: query.limit.unwrap_or(DEFAULT_LIMIT),
            page: query.page.unwrap_or(DEFAULT_PAGE),
        })
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    #[validate(range(min = 0))]
    pub stock_quantity: i32,
    #[validate(range(min = 1))]
    pub category_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub category_id: Option<i64>,
    pub limit: Option<u64>,
    pub page: Option<u64>,
}
