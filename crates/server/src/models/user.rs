//! User domain type.
//!
//! Users are part of the store interface but no HTTP route exposes them.

use serde::Serialize;

use launchpad_core::UserId;

/// A named account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    /// Store-assigned ID.
    pub id: UserId,
    /// Unique username.
    pub username: String,
}
