//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::services::SignupService;
use crate::store::SignupStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the signup service.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    signups: SignupService,
}

impl AppState {
    /// Create a new application state around an opened store.
    #[must_use]
    pub fn new(config: ServerConfig, store: Arc<dyn SignupStore>) -> Self {
        let signups = SignupService::new(store, config.store_timeout);

        Self {
            inner: Arc::new(AppStateInner { config, signups }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the signup service.
    #[must_use]
    pub fn signups(&self) -> &SignupService {
        &self.inner.signups
    }
}
