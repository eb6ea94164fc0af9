use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier,
    SaltString};
use argon2::Argon2;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::auth::AuthService;
use crate::cache::{session_key, SessionStore};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::repositories::{CustomerStore, NewCustomer};

/// Customer account workflow: registration, login, logout.
///
/// Login issues a JWT and stores it in the session cache under the
/// customer's username; the auth middleware accepts a token only while
/// that cache entry matches, so logout revokes the session immediately.
#[derive(Clone)]
pub struct CustomerService {
    customers: Arc<dyn CustomerStore>,
    session_cache: Arc<dyn SessionStore>,
    auth: Arc<AuthService>,
    event_sender: Arc<EventSender>,
}

impl CustomerService {
    pub fn new(
        customers: Arc<dyn CustomerStore>,
        session_cache: Arc<dyn SessionStore>,
        auth: Arc<AuthService>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            customers,
            session_cache,
            auth,
            event_sender,
        }
    }

    /// Registers a new customer. The password is hashed with argon2 before
    /// it reaches the store.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: RegisterInput) -> Result<(), ServiceError> {
        let password_hash = hash_password(&input.password)?;

        let customer = self
            .customers
            .create(NewCustomer {
                name: input.name,
                username: input.username,
                email: input.email,
                password: password_hash,
                phone_number: input.phone_number,
                address: input.address,
            })
            .await
            .map_err(|err| {
                error!("Failed to create customer: {}", err);
                ServiceError::InternalError("error creating customer".to_string())
            })?;

        self.event_sender
            .send_or_log(Event::CustomerRegistered {
                customer_id: customer.id,
            })
            .await;

        info!(customer_id = customer.id, "Registered customer");
        Ok(())
    }

    /// Verifies the credentials, issues a JWT, and stores it in the
    /// session cache with the session TTL.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthResponse, ServiceError> {
        let customer = self
            .customers
            .get_by_username(&input.username)
            .await
            .map_err(|err| {
                error!("Failed to fetch customer: {}", err);
                ServiceError::InternalError("error getting customer by username".to_string())
            })?
            .ok_or_else(|| ServiceError::NotFound("user not found".to_string()))?;

        if !verify_password(&input.password, &customer.password)? {
            return Err(ServiceError::Unauthorized("wrong password".to_string()));
        }

        let token = self
            .auth
            .issue_token(customer.id, &customer.username)
            .map_err(|err| {
                error!("Failed to create token: {}", err);
                ServiceError::InternalError("failed to create token".to_string())
            })?;

        self.session_cache
            .set(
                &session_key(&customer.username),
                &token,
                self.auth.session_ttl(),
            )
            .await
            .map_err(|err| {
                error!("Failed to store token in session cache: {}", err);
                ServiceError::CacheError("failed to store token".to_string())
            })?;

        info!(customer_id = customer.id, "Customer logged in");
        Ok(AuthResponse {
            username: customer.username,
            name: customer.name,
            token,
        })
    }

    /// Deletes the cached session token, revoking the session.
    pub async fn logout(&self, username: &str) -> Result<(), ServiceError> {
        self.session_cache
            .delete(&session_key(username))
            .await
            .map_err(|err| {
                error!("Failed to delete token from session cache: {}", err);
                ServiceError::CacheError("failed to delete token".to_string())
            })?;

        info!(username, "Customer logged out");
        Ok(())
    }
}

fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            error!("Failed to hash password: {}", err);
            ServiceError::InternalError("error hashing password".to_string())
        })
}

fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(hash).map_err(|err| {
        error!("Stored password hash is malformed: {}", err);
        ServiceError::InternalError("error verifying password".to_string())
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub address: String,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub username: String,
    pub name: String,
    pub token: String,
}
