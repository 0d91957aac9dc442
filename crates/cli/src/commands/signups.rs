//! Signup export and manual capture commands.
//!
//! Both commands go through the same [`SignupService`] as the HTTP API, so
//! validation and duplicate handling match `POST /api/signup`.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use thiserror::Error;

use launchpad_server::services::{SignupError, SignupService};
use launchpad_server::store::PgStore;

use super::CommandError;

const STORE_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur during signup commands.
#[derive(Debug, Error)]
pub enum SignupCommandError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error(transparent)]
    Signup(#[from] SignupError),

    #[error("Failed to serialize signup: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

async fn service() -> Result<SignupService, CommandError> {
    let pool = super::connect().await?;
    Ok(SignupService::new(Arc::new(PgStore::new(pool)), STORE_TIMEOUT))
}

/// Print every signup as one JSON object per line on stdout.
///
/// # Errors
///
/// Returns `SignupCommandError` if the store fails or stdout is closed.
pub async fn list() -> Result<(), SignupCommandError> {
    let signups = service().await?.list_signups().await?;

    let mut out = std::io::stdout().lock();
    for signup in &signups {
        serde_json::to_writer(&mut out, signup)?;
        writeln!(out)?;
    }

    tracing::info!(count = signups.len(), "Exported signups");
    Ok(())
}

/// Capture a single email address.
///
/// # Errors
///
/// Returns `SignupCommandError` if the email is invalid, already captured,
/// or the store fails.
pub async fn add(email: &str) -> Result<(), SignupCommandError> {
    let created = service()
        .await?
        .create_signup(json!({ "email": email }))
        .await?;

    tracing::info!(id = %created.id, email = %created.email, "Signup created");
    Ok(())
}
