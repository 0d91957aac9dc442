//! Email signup domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use launchpad_core::{Email, SignupId};

/// A captured email address (domain type).
///
/// Immutable once created. Serialized with camelCase keys for the admin
/// listing (`createdAt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Signup {
    /// Store-assigned ID.
    pub id: SignupId,
    /// The address exactly as submitted.
    pub email: Email,
    /// When the store persisted the signup.
    pub created_at: DateTime<Utc>,
}

/// The public view of a newly created signup.
///
/// Only `id` and `email` are returned to the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedSignup {
    pub id: SignupId,
    pub email: Email,
}

impl From<Signup> for CreatedSignup {
    fn from(signup: Signup) -> Self {
        Self {
            id: signup.id,
            email: signup.email,
        }
    }
}
