//! Authentication module.
//!
//! Issues and validates HS256 JWTs for customer sessions. A token is only
//! accepted while the matching entry is present in the session cache, so
//! logout (key deletion) revokes the token before its JWT expiry.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::cache::session_key;
use crate::errors::ApiError;
use crate::AppState;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Customer id
    pub sub: i64,
    pub username: String,
    /// Issued at time
    pub iat: i64,
    /// Expiration time
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Failed to create token: {0}")]
    TokenCreation(String),
    #[error("Session lookup failed: {0}")]
    SessionLookup(#[from] crate::cache::CacheError),
}

/// Authentication service that handles token issuance and validation
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(jwt_secret: String, session_ttl: Duration) -> Self {
        Self {
            jwt_secret,
            session_ttl,
        }
    }

    /// Session lifetime; bounds both the JWT expiry and the cache TTL.
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Generate a signed JWT for a customer
    pub fn issue_token(&self, customer_id: i64, username: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::seconds(self.session_ttl.as_secs() as i64);

        let claims = Claims {
            sub: customer_id,
            username: username.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Validate a JWT and extract its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AuthError::InvalidToken)?
        .claims;

        Ok(claims)
    }
}

/// Authenticated customer extracted from the request extensions.
///
/// Inserted by the auth middleware; every protected handler takes this as
/// the acting customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerIdentity {
    pub customer_id: i64,
    pub username: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CustomerIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CustomerIdentity>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))
    }
}

/// Middleware gating every protected route.
///
/// Bearer token -> JWT validation -> session-cache lookup -> token equality
/// check; on success the resolved `CustomerIdentity` is attached to the
/// request.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    match authenticate(&state, req.headers()).await {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(err) => {
            warn!("Authentication rejected: {}", err);
            ApiError::Unauthorized(err.to_string()).into_response()
        }
    }
}

async fn authenticate(
    state: &AppState,
    headers: &header::HeaderMap,
) -> Result<CustomerIdentity, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .unwrap_or(auth_header)
        .trim();

    let claims = state.auth.validate_token(token)?;

    // The token is only valid while the session cache holds the same value
    // under this username's key.
    let cached = state
        .session_cache
        .get(&session_key(&claims.username))
        .await?
        .ok_or(AuthError::InvalidToken)?;

    if cached != token {
        return Err(AuthError::InvalidToken);
    }

    Ok(CustomerIdentity {
        customer_id: claims.sub,
        username: claims.username,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(
            "test_secret_key_for_testing_purposes_only".to_string(),
            Duration::from_secs(600),
        )
    }

    #[test]
    fn issued_token_validates_and_carries_claims() {
        let auth = service();
        let token = auth.issue_token(42, "alice").expect("issue token");

        let claims = auth.validate_token(&token).expect("validate token");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let auth = service();
        let other = AuthService::new(
            "another_secret_key_for_testing_purposes".to_string(),
            Duration::from_secs(600),
        );

        let token = other.issue_token(42, "alice").expect("issue token");
        assert!(matches!(
            auth.validate_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = service();

        let now = Utc::now();
        let claims = Claims {
            sub: 1,
            username: "bob".to_string(),
            iat: (now - chrono::Duration::hours(2)).timestamp(),
            exp: (now - chrono::Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("test_secret_key_for_testing_purposes_only".as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            auth.validate_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let auth = service();
        assert!(matches!(
            auth.validate_token("not-a-jwt"),
            Err(AuthError::InvalidToken)
        ));
    }
}
