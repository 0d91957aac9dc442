//! Signup capture and listing.
//!
//! Business rules live here rather than in the store: the request body is
//! validated before the store is touched, and a duplicate email is reported
//! as [`SignupError::Duplicate`] whether it is caught by the lookup or by the
//! store's own uniqueness check on insert.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument};

use launchpad_core::Email;

use crate::models::{CreatedSignup, Signup};
use crate::store::{SignupStore, StoreError};

/// Errors returned by [`SignupService`].
#[derive(Debug, Error)]
pub enum SignupError {
    /// The request body is not `{ "email": <valid address> }`.
    #[error("invalid signup request: {0}")]
    Validation(String),

    /// The email has already been captured.
    #[error("email already registered")]
    Duplicate,

    /// The store failed or timed out.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Expected shape of a signup request body.
#[derive(Debug, Deserialize)]
struct SignupRequest {
    email: String,
}

/// Validate a raw request body into an [`Email`].
///
/// # Errors
///
/// Returns `SignupError::Validation` if `raw` is not an object with a string
/// `email` field holding a well-formed address.
pub fn parse_signup_request(raw: Value) -> Result<Email, SignupError> {
    // Derived struct impls also accept positional arrays; only objects are valid here.
    if !raw.is_object() {
        return Err(SignupError::Validation("expected a JSON object".to_owned()));
    }
    let request: SignupRequest =
        serde_json::from_value(raw).map_err(|e| SignupError::Validation(e.to_string()))?;
    Email::parse(&request.email).map_err(|e| SignupError::Validation(e.to_string()))
}

/// Signup operations over a shared [`SignupStore`].
#[derive(Clone)]
pub struct SignupService {
    store: Arc<dyn SignupStore>,
    timeout: Duration,
}

impl SignupService {
    /// Create a service whose store calls are each bounded by `timeout`.
    #[must_use]
    pub fn new(store: Arc<dyn SignupStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Capture an email address from a raw request body.
    ///
    /// # Errors
    ///
    /// - `SignupError::Validation` if the body is malformed (no store access)
    /// - `SignupError::Duplicate` if the email is already captured
    /// - `SignupError::Store` if the store fails or times out
    ///
    /// A timed-out insert is not rolled back: the store may still have
    /// persisted the row, in which case a retry reports `Duplicate`.
    #[instrument(skip(self, raw))]
    pub async fn create_signup(&self, raw: Value) -> Result<CreatedSignup, SignupError> {
        let email = parse_signup_request(raw)?;

        if self
            .bounded(self.store.find_signup_by_email(&email))
            .await?
            .is_some()
        {
            info!(email = %email, "Signup rejected: email already registered");
            return Err(SignupError::Duplicate);
        }

        let signup = match self.bounded(self.store.create_signup(&email)).await {
            Ok(signup) => signup,
            Err(StoreError::Conflict(_)) => {
                info!(email = %email, "Signup rejected: concurrent duplicate");
                return Err(SignupError::Duplicate);
            }
            Err(e) => return Err(e.into()),
        };

        info!(id = %signup.id, email = %signup.email, "Signup created");
        Ok(signup.into())
    }

    /// Every captured signup.
    ///
    /// # Errors
    ///
    /// Returns `SignupError::Store` if the store fails or times out.
    #[instrument(skip(self))]
    pub async fn list_signups(&self) -> Result<Vec<Signup>, SignupError> {
        let signups = self.bounded(self.store.list_signups()).await?;
        debug!(count = signups.len(), "Listed signups");
        Ok(signups)
    }

    /// Whether the store answers within the timeout.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store is unreachable or times out.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.bounded(self.store.ping()).await
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use launchpad_core::UserId;
    use serde_json::json;

    use super::*;
    use crate::models::User;
    use crate::store::MemoryStore;

    fn service() -> SignupService {
        SignupService::new(Arc::new(MemoryStore::new()), Duration::from_secs(5))
    }

    /// A store whose every call fails or hangs, and which records whether it
    /// was touched at all.
    #[derive(Default)]
    struct BrokenStore {
        hang: bool,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl BrokenStore {
        async fn fail<T>(&self) -> Result<T, StoreError> {
            self.calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if self.hang {
                std::future::pending::<()>().await;
            }
            Err(StoreError::DataCorruption("broken".to_owned()))
        }
    }

    #[async_trait]
    impl SignupStore for BrokenStore {
        async fn create_signup(&self, _: &Email) -> Result<Signup, StoreError> {
            self.fail().await
        }
        async fn find_signup_by_email(&self, _: &Email) -> Result<Option<Signup>, StoreError> {
            self.fail().await
        }
        async fn list_signups(&self) -> Result<Vec<Signup>, StoreError> {
            self.fail().await
        }
        async fn create_user(&self, _: &str) -> Result<User, StoreError> {
            self.fail().await
        }
        async fn get_user(&self, _: UserId) -> Result<Option<User>, StoreError> {
            self.fail().await
        }
        async fn get_user_by_username(&self, _: &str) -> Result<Option<User>, StoreError> {
            self.fail().await
        }
        async fn ping(&self) -> Result<(), StoreError> {
            self.fail().await
        }
    }

    /// A store that misses the lookup but conflicts on insert, as when a
    /// concurrent request wins the race.
    struct RacingStore;

    #[async_trait]
    impl SignupStore for RacingStore {
        async fn create_signup(&self, _: &Email) -> Result<Signup, StoreError> {
            Err(StoreError::Conflict("email already exists".to_owned()))
        }
        async fn find_signup_by_email(&self, _: &Email) -> Result<Option<Signup>, StoreError> {
            Ok(None)
        }
        async fn list_signups(&self) -> Result<Vec<Signup>, StoreError> {
            Ok(Vec::new())
        }
        async fn create_user(&self, _: &str) -> Result<User, StoreError> {
            Err(StoreError::Conflict("username already exists".to_owned()))
        }
        async fn get_user(&self, _: UserId) -> Result<Option<User>, StoreError> {
            Ok(None)
        }
        async fn get_user_by_username(&self, _: &str) -> Result<Option<User>, StoreError> {
            Ok(None)
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    /// A store that commits the insert and then never answers.
    #[derive(Default)]
    struct SlowCommitStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl SignupStore for SlowCommitStore {
        async fn create_signup(&self, email: &Email) -> Result<Signup, StoreError> {
            self.inner.create_signup(email).await?;
            std::future::pending().await
        }
        async fn find_signup_by_email(&self, email: &Email) -> Result<Option<Signup>, StoreError> {
            self.inner.find_signup_by_email(email).await
        }
        async fn list_signups(&self) -> Result<Vec<Signup>, StoreError> {
            self.inner.list_signups().await
        }
        async fn create_user(&self, username: &str) -> Result<User, StoreError> {
            self.inner.create_user(username).await
        }
        async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
            self.inner.get_user(id).await
        }
        async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
            self.inner.get_user_by_username(username).await
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn test_parse_signup_request() {
        assert!(parse_signup_request(json!({ "email": "a@example.com" })).is_ok());

        for raw in [
            json!({}),
            json!({ "email": 42 }),
            json!({ "email": "" }),
            json!({ "email": "not-an-email" }),
            json!({ "email": "user@" }),
            json!("a@example.com"),
            json!(null),
            json!(["a@example.com"]),
        ] {
            assert!(
                matches!(parse_signup_request(raw.clone()), Err(SignupError::Validation(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_distinct_emails_get_distinct_ids() {
        let service = service();
        let a = service
            .create_signup(json!({ "email": "a@example.com" }))
            .await
            .unwrap();
        let b = service
            .create_signup(json!({ "email": "b@example.com" }))
            .await
            .unwrap();

        assert_eq!(a.id.as_i32(), 1);
        assert_eq!(b.id.as_i32(), 2);
        assert_eq!(service.list_signups().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_is_rejected() {
        let service = service();
        service
            .create_signup(json!({ "email": "a@example.com" }))
            .await
            .unwrap();

        let err = service
            .create_signup(json!({ "email": "a@example.com" }))
            .await
            .unwrap_err();
        assert!(matches!(err, SignupError::Duplicate));

        let signups = service.list_signups().await.unwrap();
        assert_eq!(signups.len(), 1);
    }

    #[tokio::test]
    async fn test_case_variant_is_a_different_signup() {
        let service = service();
        service
            .create_signup(json!({ "email": "a@example.com" }))
            .await
            .unwrap();
        service
            .create_signup(json!({ "email": "A@example.com" }))
            .await
            .unwrap();

        assert_eq!(service.list_signups().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_store() {
        let store = Arc::new(BrokenStore::default());
        let service = SignupService::new(store.clone(), Duration::from_secs(5));

        let err = service
            .create_signup(json!({ "email": "nope" }))
            .await
            .unwrap_err();

        assert!(matches!(err, SignupError::Validation(_)));
        assert_eq!(store.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_insert_conflict_reports_duplicate() {
        let service = SignupService::new(Arc::new(RacingStore), Duration::from_secs(5));

        let err = service
            .create_signup(json!({ "email": "a@example.com" }))
            .await
            .unwrap_err();
        assert!(matches!(err, SignupError::Duplicate));
    }

    #[tokio::test]
    async fn test_store_failure_is_store_error() {
        let service = SignupService::new(Arc::new(BrokenStore::default()), Duration::from_secs(5));

        assert!(matches!(
            service.list_signups().await,
            Err(SignupError::Store(StoreError::DataCorruption(_)))
        ));
    }

    #[tokio::test]
    async fn test_hanging_store_times_out() {
        let store = BrokenStore {
            hang: true,
            ..BrokenStore::default()
        };
        let service = SignupService::new(Arc::new(store), Duration::from_millis(50));

        let err = service
            .create_signup(json!({ "email": "a@example.com" }))
            .await
            .unwrap_err();
        assert!(matches!(err, SignupError::Store(StoreError::Timeout(_))));
        assert!(matches!(service.ping().await, Err(StoreError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_timed_out_insert_may_have_persisted() {
        let service =
            SignupService::new(Arc::new(SlowCommitStore::default()), Duration::from_millis(50));

        let err = service
            .create_signup(json!({ "email": "a@example.com" }))
            .await
            .unwrap_err();
        assert!(matches!(err, SignupError::Store(StoreError::Timeout(_))));

        assert_eq!(service.list_signups().await.unwrap().len(), 1);
        let retry = service
            .create_signup(json!({ "email": "a@example.com" }))
            .await
            .unwrap_err();
        assert!(matches!(retry, SignupError::Duplicate));
    }

    #[tokio::test]
    async fn test_list_is_idempotent() {
        let service = service();
        for addr in ["a@example.com", "b@example.com"] {
            service.create_signup(json!({ "email": addr })).await.unwrap();
        }

        let first = service.list_signups().await.unwrap();
        let second = service.list_signups().await.unwrap();
        assert_eq!(first, second);
    }
}
