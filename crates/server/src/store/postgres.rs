//! `PostgreSQL` store backend.
//!
//! IDs come from `SERIAL` sequences and `created_at` from the column default,
//! both returned by `INSERT ... RETURNING`. Uniqueness is enforced by the
//! table constraints; a unique violation surfaces as [`StoreError::Conflict`].

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use launchpad_core::{Email, UserId};

use super::{SignupStore, StoreError};
use crate::models::{Signup, User};

/// [`SignupStore`] backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map an insert error, turning unique violations into `Conflict`.
fn map_insert_error(e: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return StoreError::Conflict(format!("{what} already exists"));
    }
    StoreError::Database(e)
}

#[async_trait]
impl SignupStore for PgStore {
    #[instrument(skip_all, fields(email = %email))]
    async fn create_signup(&self, email: &Email) -> Result<Signup, StoreError> {
        let signup = sqlx::query_as::<_, Signup>(
            r"
            INSERT INTO email_signups (email)
            VALUES ($1)
            RETURNING id, email, created_at
            ",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "email"))?;

        debug!(id = %signup.id, "Inserted email signup");
        Ok(signup)
    }

    async fn find_signup_by_email(&self, email: &Email) -> Result<Option<Signup>, StoreError> {
        let signup = sqlx::query_as::<_, Signup>(
            r"
            SELECT id, email, created_at
            FROM email_signups
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(signup)
    }

    #[instrument(skip(self))]
    async fn list_signups(&self) -> Result<Vec<Signup>, StoreError> {
        let signups = sqlx::query_as::<_, Signup>(
            r"
            SELECT id, email, created_at
            FROM email_signups
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::ColumnDecode { index, source } => {
                StoreError::DataCorruption(format!("column {index}: {source}"))
            }
            other => StoreError::Database(other),
        })?;

        debug!(count = signups.len(), "Fetched email signups");
        Ok(signups)
    }

    #[instrument(skip(self))]
    async fn create_user(&self, username: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (username)
            VALUES ($1)
            RETURNING id, username
            ",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "username"))
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
