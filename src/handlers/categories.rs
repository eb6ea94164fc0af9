use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use serde::Deserialize;
use validator::Validate;

use crate::auth::CustomerIdentity;
use crate::errors::ApiError;
use crate::handlers::common::{
    created_empty_response, map_service_error, success_response, validate_input,
};
use crate::AppState;

/// Creates the router for category endpoints
pub fn routes() -> Router<AppState> {
    Router::new().route("/categories", post(create_category).get(list_categories))
}

async fn create_category(
    State(state): State<AppState>,
    _identity: CustomerIdentity,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .categories
        .create(payload.name)
        .await
        .map_err(map_service_error)?;

    Ok(created_empty_response())
}

async fn list_categories(
    State(state): State<AppState>,
    _identity: CustomerIdentity,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state
        .services
        .categories
        .list()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(categories))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1))]
    pub name: String,
}
