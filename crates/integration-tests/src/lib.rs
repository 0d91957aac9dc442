//! Integration tests for Launchpad.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory store only
//! cargo test -p launchpad-integration-tests
//!
//! # Include PostgreSQL-backed tests
//! TEST_DATABASE_URL=postgres://localhost/launchpad_test \
//!     cargo test -p launchpad-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `signup_api` - HTTP contract of the signup endpoints
//! - `postgres_store` - `PgStore` against a real database

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use async_trait::async_trait;
use serde_json::Value;
use tower::ServiceExt;

use launchpad_core::{Email, UserId};
use launchpad_server::config::ServerConfig;
use launchpad_server::models::{Signup, User};
use launchpad_server::routes;
use launchpad_server::state::AppState;
use launchpad_server::store::{MemoryStore, SignupStore, StoreError};

/// Router wired to a fresh in-memory store.
#[must_use]
pub fn memory_app() -> Router {
    app_with_store(Arc::new(MemoryStore::new()))
}

/// Router wired to the given store with default configuration.
#[must_use]
pub fn app_with_store(store: Arc<dyn SignupStore>) -> Router {
    routes::app(AppState::new(ServerConfig::default(), store))
}

/// Router wired to the given store with a custom per-call store timeout.
#[must_use]
pub fn app_with_timeout(store: Arc<dyn SignupStore>, store_timeout: Duration) -> Router {
    let config = ServerConfig {
        store_timeout,
        ..ServerConfig::default()
    };
    routes::app(AppState::new(config, store))
}

/// A store that never answers, for exercising timeouts.
#[derive(Debug, Clone, Copy)]
pub struct StalledStore;

impl StalledStore {
    async fn stall<T>(&self) -> Result<T, StoreError> {
        std::future::pending().await
    }
}

#[async_trait]
impl SignupStore for StalledStore {
    async fn create_signup(&self, _: &Email) -> Result<Signup, StoreError> {
        self.stall().await
    }

    async fn find_signup_by_email(&self, _: &Email) -> Result<Option<Signup>, StoreError> {
        self.stall().await
    }

    async fn list_signups(&self) -> Result<Vec<Signup>, StoreError> {
        self.stall().await
    }

    async fn create_user(&self, _: &str) -> Result<User, StoreError> {
        self.stall().await
    }

    async fn get_user(&self, _: UserId) -> Result<Option<User>, StoreError> {
        self.stall().await
    }

    async fn get_user_by_username(&self, _: &str) -> Result<Option<User>, StoreError> {
        self.stall().await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.stall().await
    }
}

/// Send a request and return the status and parsed JSON body.
///
/// Non-JSON bodies are returned as a JSON string.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

/// `POST /api/signup` with a raw body.
#[must_use]
pub fn post_signup(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

/// `GET` an arbitrary path.
#[must_use]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
