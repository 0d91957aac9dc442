//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! POST /api/signup             - Capture an email address
//! GET  /api/signups            - List every captured signup (admin view)
//! GET  /api/hello              - JSON liveness probe
//!
//! GET  /ping                   - Plain-text liveness probe
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (store reachable)
//!
//! *                            - Static landing page assets, when STATIC_DIR is set
//! ```

pub mod health;
pub mod signups;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::state::AppState;

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signups::create))
        .route("/signups", get(signups::list))
        .route("/hello", get(health::hello))
}

/// Build the complete application router with middleware applied.
///
/// Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        .route("/ping", get(health::ping))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes());

    let router = match &state.config().static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
