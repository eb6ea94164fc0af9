use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::ApiResponse;

/// Domain error produced by services and stores.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    InvalidOperation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    InternalError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping:
    /// validation and not-found reject with 400, authentication with 401,
    /// everything else surfaces as 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) | Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::DatabaseError(_)
            | Self::InvalidOperation(_)
            | Self::InternalError(_)
            | Self::CacheError(_)
            | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the message rendered to the caller. Infrastructure errors
    /// return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "database error".to_string(),
            Self::CacheError(_) | Self::Other(_) => "internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ApiResponse::<serde_json::Value>::error(self.response_message());
        (status, Json(body)).into_response()
    }
}

/// Error type for the HTTP edge. Wraps domain errors and adds
/// transport-only failures (malformed input, missing auth).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    ServiceError(#[from] ServiceError),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("internal server error")]
    InternalServerError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::ServiceError(err) => (err.status_code(), err.response_message()),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
        };

        let body = ApiResponse::<serde_json::Value>::error(message);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_status_code_mapping() {
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::InvalidOperation("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::InternalError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_message_hides_infrastructure_details() {
        let err = ServiceError::DatabaseError(sea_orm::error::DbErr::Custom(
            "connection refused on 10.0.0.3".into(),
        ));
        assert_eq!(err.response_message(), "database error");

        assert_eq!(
            ServiceError::CacheError("redis down".into()).response_message(),
            "internal server error"
        );

        // Domain errors surface their opaque cause
        assert_eq!(
            ServiceError::NotFound("product not found: 9".into()).response_message(),
            "product not found: 9"
        );
    }

    #[tokio::test]
    async fn error_response_uses_envelope_without_data() {
        use axum::body::to_bytes;

        let response = ServiceError::ValidationError("invalid payment method".into())
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload["message"], "invalid payment method");
        assert!(payload.get("data").is_none());
    }
}
