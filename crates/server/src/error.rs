//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Server faults are logged and
//! captured to Sentry before responding; clients only ever see the fixed
//! messages below, wrapped in the `{ "success": false, "message": ... }`
//! envelope.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::SignupError;
use crate::store::StoreError;

/// Response message for a malformed signup request.
pub const INVALID_EMAIL_MESSAGE: &str = "Invalid email format";
/// Response message for an already-captured email.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "Email already registered for notifications";
/// Response message when creating a signup fails unexpectedly.
pub const SIGNUP_FAILED_MESSAGE: &str = "An error occurred while signing up";
/// Response message when listing signups fails unexpectedly.
pub const FETCH_FAILED_MESSAGE: &str = "An error occurred while fetching signups";

/// Application-level error type for the HTTP boundary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body failed validation.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Email already captured.
    #[error("Duplicate email")]
    DuplicateEmail,

    /// Store failure while creating a signup.
    #[error("Signup failed: {0}")]
    Signup(StoreError),

    /// Store failure while listing signups.
    #[error("Fetching signups failed: {0}")]
    FetchSignups(StoreError),
}

/// JSON body for failed API calls.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: &'static str,
}

impl From<SignupError> for AppError {
    fn from(err: SignupError) -> Self {
        match err {
            SignupError::Validation(detail) => Self::InvalidEmail(detail),
            SignupError::Duplicate => Self::DuplicateEmail,
            SignupError::Store(e) => Self::Signup(e),
        }
    }
}

impl AppError {
    /// Map a failure from the listing path.
    #[must_use]
    pub fn fetch(err: SignupError) -> Self {
        match err {
            SignupError::Store(e) => Self::FetchSignups(e),
            other => other.into(),
        }
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidEmail(_) | Self::DuplicateEmail => StatusCode::BAD_REQUEST,
            Self::Signup(_) | Self::FetchSignups(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    const fn message(&self) -> &'static str {
        match self {
            Self::InvalidEmail(_) => INVALID_EMAIL_MESSAGE,
            Self::DuplicateEmail => DUPLICATE_EMAIL_MESSAGE,
            Self::Signup(_) => SIGNUP_FAILED_MESSAGE,
            Self::FetchSignups(_) => FETCH_FAILED_MESSAGE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            Self::Signup(_) | Self::FetchSignups(_) => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Request error"
                );
            }
            Self::InvalidEmail(detail) => {
                tracing::debug!(detail = %detail, "Rejected signup request");
            }
            Self::DuplicateEmail => {}
        }

        let body = ErrorBody {
            success: false,
            message: self.message(),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
