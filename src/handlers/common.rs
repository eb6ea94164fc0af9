use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::Validate;

use crate::errors::{ApiError, ServiceError};
use crate::ApiResponse;

/// Standard success response: 200 with the `{message, data}` envelope
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// Standard created response: 201 with the `{message, data}` envelope
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response()
}

/// Created response with no payload: 201 with `{message: "success"}`
pub fn created_empty_response() -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success_empty())).into_response()
}

/// Success response with no payload: 200 with `{message: "success"}`
pub fn success_empty_response() -> Response {
    (StatusCode::OK, Json(ApiResponse::success_empty())).into_response()
}

/// Validate request input before any store access
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Validation failed: {}", e)))
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}
