use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

use online_store_api::{
    auth::AuthService,
    cache::{InMemorySessionStore, SessionStore},
    config::AppConfig,
    db,
    entities::{category, customer, product},
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};

/// Helper harness spinning up application state backed by an in-memory
/// SQLite database and an in-memory session store.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "redis://127.0.0.1:6379".to_string(),
            "test_secret_key_for_testing_purposes_only".to_string(),
            600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single pooled connection keeps the in-memory database alive for
        // the lifetime of the test.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let session_cache: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let auth_service = Arc::new(AuthService::new(cfg.jwt_secret.clone(), cfg.session_ttl()));

        let services = AppServices::new(
            db_arc.clone(),
            Arc::new(event_sender.clone()),
            session_cache.clone(),
            auth_service.clone(),
        );

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            auth: auth_service,
            session_cache,
            services,
        };

        let router = online_store_api::app_router(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Seed a customer row directly; the password hash is a placeholder,
    /// so this account cannot log in.
    pub async fn seed_customer(&self, username: &str) -> i64 {
        let now = Utc::now();
        let inserted = customer::ActiveModel {
            name: Set(format!("Customer {}", username)),
            username: Set(username.to_string()),
            email: Set(format!("{}@example.com", username)),
            password: Set("placeholder-hash".to_string()),
            phone_number: Set("+628111111111".to_string()),
            address: Set("Jakarta".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed customer");

        inserted.id
    }

    pub async fn seed_category(&self, name: &str) -> i64 {
        let now = Utc::now();
        let inserted = category::ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed category");

        inserted.id
    }

    pub async fn seed_product(&self, name: &str, price: Decimal, category_id: i64) -> i64 {
        let now = Utc::now();
        let inserted = product::ActiveModel {
            name: Set(name.to_string()),
            description: Set(None),
            price: Set(price),
            stock_quantity: Set(100),
            category_id: Set(category_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed product");

        inserted.id
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn response_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&body).expect("response body is not valid json")
}
