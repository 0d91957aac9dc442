//! Signup persistence.
//!
//! [`SignupStore`] is the only seam between the signup service and storage.
//! Two backends implement it:
//!
//! - [`MemoryStore`] - process-local maps, used for development and tests
//! - [`PgStore`] - `PostgreSQL` tables `email_signups` and `users`
//!
//! The backend is chosen once at startup from [`ServerConfig`] and shared as
//! an `Arc<dyn SignupStore>`.
//!
//! Both backends enforce email (and username) uniqueness themselves and
//! report a violation as [`StoreError::Conflict`].

pub mod memory;
pub mod postgres;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use launchpad_core::{Email, UserId};

use crate::config::{ServerConfig, StoreBackend};
use crate::db;
use crate::models::{Signup, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Uniqueness constraint violation (e.g., email already captured).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The store did not answer in time.
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    /// The auto-increment counter cannot advance further.
    #[error("id space exhausted")]
    IdSpaceExhausted,

    /// Configuration does not describe a usable store.
    #[error("store misconfigured: {0}")]
    Misconfigured(String),
}

/// Persistence for signups and (latent) users.
#[async_trait]
pub trait SignupStore: Send + Sync {
    /// Persist a new signup, assigning its ID and creation time.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if a signup with this email exists.
    async fn create_signup(&self, email: &Email) -> Result<Signup, StoreError>;

    /// Find a signup by exact (case-sensitive) email.
    async fn find_signup_by_email(&self, email: &Email) -> Result<Option<Signup>, StoreError>;

    /// All signups, ordered by ID.
    async fn list_signups(&self) -> Result<Vec<Signup>, StoreError>;

    /// Persist a new user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the username is taken.
    async fn create_user(&self, username: &str) -> Result<User, StoreError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Verify the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Open the store selected by configuration.
///
/// # Errors
///
/// Returns `StoreError::Database` if the `PostgreSQL` pool cannot connect, or
/// `StoreError::Misconfigured` if `PostgreSQL` is selected without a URL.
pub async fn connect(config: &ServerConfig) -> Result<Arc<dyn SignupStore>, StoreError> {
    match config.store_backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::Postgres => {
            let url = config.database_url.as_ref().ok_or_else(|| {
                StoreError::Misconfigured("DATABASE_URL is required for postgres".to_owned())
            })?;
            let pool = db::create_pool(url).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}
