//! Integration tests for the `PostgreSQL` store backend.
//!
//! These tests require a disposable `PostgreSQL` database named by
//! `TEST_DATABASE_URL`. Each test truncates the tables it uses.
//!
//! Run with: `cargo test -p launchpad-integration-tests -- --ignored`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, LazyLock};

use axum::http::StatusCode;
use secrecy::SecretString;
use serde_json::json;
use sqlx::PgPool;
use tokio::sync::{Mutex, MutexGuard};

use launchpad_core::Email;
use launchpad_integration_tests::{app_with_store, get, post_signup, send};
use launchpad_server::db;
use launchpad_server::store::{PgStore, SignupStore, StoreError};

/// Tests share one database, so they take turns.
static DATABASE: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

async fn fresh_store() -> (MutexGuard<'static, ()>, PgStore) {
    let guard = DATABASE.lock().await;
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let pool = db::create_pool(&SecretString::from(url)).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    let store = PgStore::new(pool);
    reset(store.pool()).await;
    (guard, store)
}

async fn reset(pool: &PgPool) {
    sqlx::query("TRUNCATE email_signups, users RESTART IDENTITY")
        .execute(pool)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_create_find_list() {
    let (_guard, store) = fresh_store().await;
    let email = Email::parse("a@example.com").unwrap();

    let created = store.create_signup(&email).await.unwrap();
    assert_eq!(created.id.as_i32(), 1);
    assert_eq!(created.email, email);

    let found = store.find_signup_by_email(&email).await.unwrap();
    assert_eq!(found, Some(created.clone()));

    let listed = store.list_signups().await.unwrap();
    assert_eq!(listed, vec![created]);
}

#[tokio::test]
#[ignore = "requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_unique_violation_is_conflict() {
    let (_guard, store) = fresh_store().await;
    let email = Email::parse("a@example.com").unwrap();

    store.create_signup(&email).await.unwrap();
    let err = store.create_signup(&email).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_users_roundtrip() {
    let (_guard, store) = fresh_store().await;

    let user = store.create_user("alice").await.unwrap();
    assert_eq!(store.get_user(user.id).await.unwrap(), Some(user.clone()));
    assert_eq!(
        store.get_user_by_username("alice").await.unwrap(),
        Some(user)
    );
    assert!(matches!(
        store.create_user("alice").await,
        Err(StoreError::Conflict(_))
    ));
}

#[tokio::test]
#[ignore = "requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_http_flow_against_postgres() {
    let (_guard, store) = fresh_store().await;
    store.ping().await.unwrap();
    let app = app_with_store(Arc::new(store));

    let (status, body) = send(&app, post_signup(r#"{"email":"a@example.com"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "id": 1, "email": "a@example.com" }));

    let (status, body) = send(&app, post_signup(r#"{"email":"a@example.com"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already registered for notifications");

    let (status, body) = send(&app, get("/api/signups")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
