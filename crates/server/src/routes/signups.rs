//! Signup capture and admin listing handlers.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::models::{CreatedSignup, Signup};
use crate::state::AppState;

/// Response message for a captured email.
pub const SIGNUP_SUCCESS_MESSAGE: &str = "Successfully signed up for notifications";

/// Body of a successful `POST /api/signup`.
#[derive(Debug, Serialize)]
pub struct SignupCreatedResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: CreatedSignup,
}

/// Body of a successful `GET /api/signups`.
#[derive(Debug, Serialize)]
pub struct SignupListResponse {
    pub success: bool,
    pub data: Vec<Signup>,
}

/// Capture an email address.
///
/// A body that is not JSON at all is treated the same as a JSON body with a
/// bad `email` field.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<SignupCreatedResponse>> {
    let Json(raw) = payload.map_err(|rejection| AppError::InvalidEmail(rejection.body_text()))?;

    let created = state.signups().create_signup(raw).await?;

    Ok(Json(SignupCreatedResponse {
        success: true,
        message: SIGNUP_SUCCESS_MESSAGE,
        data: created,
    }))
}

/// List every captured signup (admin view, unauthenticated).
#[instrument(skip_all)]
pub async fn list(State(state): State<AppState>) -> Result<Json<SignupListResponse>> {
    let signups = state
        .signups()
        .list_signups()
        .await
        .map_err(AppError::fetch)?;

    Ok(Json(SignupListResponse {
        success: true,
        data: signups,
    }))
}
