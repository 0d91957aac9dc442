//! In-memory store backend.
//!
//! Signups are held in two maps: by ID (which also gives insertion order,
//! since IDs only grow) and an email index pointing back into it. Users get
//! the same pair keyed by username. All maps and both counters live behind a
//! single lock so an insert updates every index or none.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::instrument;

use launchpad_core::{Email, SignupId, UserId};

use super::{SignupStore, StoreError};
use crate::models::{Signup, User};

/// Process-local [`SignupStore`]. Data is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug)]
struct Inner {
    signups: BTreeMap<SignupId, Signup>,
    signups_by_email: HashMap<Email, SignupId>,
    users: BTreeMap<UserId, User>,
    users_by_username: HashMap<String, UserId>,
    next_signup_id: Option<SignupId>,
    next_user_id: Option<UserId>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            signups: BTreeMap::new(),
            signups_by_email: HashMap::new(),
            users: BTreeMap::new(),
            users_by_username: HashMap::new(),
            next_signup_id: Some(SignupId::FIRST),
            next_user_id: Some(UserId::FIRST),
        }
    }
}

impl MemoryStore {
    /// Create an empty store whose counters start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SignupStore for MemoryStore {
    #[instrument(skip_all, fields(email = %email))]
    async fn create_signup(&self, email: &Email) -> Result<Signup, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.signups_by_email.contains_key(email) {
            return Err(StoreError::Conflict("email already exists".to_owned()));
        }

        let id = inner.next_signup_id.ok_or(StoreError::IdSpaceExhausted)?;
        inner.next_signup_id = id.next();

        let signup = Signup {
            id,
            email: email.clone(),
            created_at: Utc::now(),
        };
        inner.signups_by_email.insert(email.clone(), id);
        inner.signups.insert(id, signup.clone());

        Ok(signup)
    }

    async fn find_signup_by_email(&self, email: &Email) -> Result<Option<Signup>, StoreError> {
        let inner = self.inner.read().await;
        let signup = inner
            .signups_by_email
            .get(email)
            .and_then(|id| inner.signups.get(id))
            .cloned();
        Ok(signup)
    }

    async fn list_signups(&self) -> Result<Vec<Signup>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.signups.values().cloned().collect())
    }

    #[instrument(skip(self))]
    async fn create_user(&self, username: &str) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.users_by_username.contains_key(username) {
            return Err(StoreError::Conflict("username already exists".to_owned()));
        }

        let id = inner.next_user_id.ok_or(StoreError::IdSpaceExhausted)?;
        inner.next_user_id = id.next();

        let user = User {
            id,
            username: username.to_owned(),
        };
        inner.users_by_username.insert(username.to_owned(), id);
        inner.users.insert(id, user.clone());

        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        let user = inner
            .users_by_username
            .get(username)
            .and_then(|id| inner.users.get(id))
            .cloned();
        Ok(user)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn email(s: &str) -> Email {
        Email::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_ids_start_at_one_and_increase() {
        let store = MemoryStore::new();

        for n in 1..=3 {
            let signup = store
                .create_signup(&email(&format!("user{n}@example.com")))
                .await
                .unwrap();
            assert_eq!(signup.id.as_i32(), n);
        }
    }

    #[tokio::test]
    async fn test_find_by_email_is_exact() {
        let store = MemoryStore::new();
        let created = store.create_signup(&email("a@example.com")).await.unwrap();

        let found = store
            .find_signup_by_email(&email("a@example.com"))
            .await
            .unwrap();
        assert_eq!(found, Some(created));

        let other_case = store
            .find_signup_by_email(&email("A@example.com"))
            .await
            .unwrap();
        assert!(other_case.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_signup(&email("a@example.com")).await.unwrap();

        let err = store
            .create_signup(&email("a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.list_signups().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_insert_does_not_consume_id() {
        let store = MemoryStore::new();
        store.create_signup(&email("a@example.com")).await.unwrap();
        let _ = store.create_signup(&email("a@example.com")).await;

        let second = store.create_signup(&email("b@example.com")).await.unwrap();
        assert_eq!(second.id.as_i32(), 2);
    }

    #[tokio::test]
    async fn test_list_is_insertion_ordered() {
        let store = MemoryStore::new();
        for addr in ["z@example.com", "a@example.com", "m@example.com"] {
            store.create_signup(&email(addr)).await.unwrap();
        }

        let listed: Vec<String> = store
            .list_signups()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.email.into_inner())
            .collect();
        assert_eq!(listed, ["z@example.com", "a@example.com", "m@example.com"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_for_same_email() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.create_signup(&email("race@example.com")).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.list_signups().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_counter() {
        let store = MemoryStore::new();
        store.inner.write().await.next_signup_id = Some(SignupId::new(i32::MAX));

        let last = store.create_signup(&email("a@example.com")).await.unwrap();
        assert_eq!(last.id.as_i32(), i32::MAX);

        let err = store
            .create_signup(&email("b@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::IdSpaceExhausted));
    }

    #[tokio::test]
    async fn test_users() {
        let store = MemoryStore::new();
        let alice = store.create_user("alice").await.unwrap();
        let bob = store.create_user("bob").await.unwrap();
        assert_eq!(alice.id.as_i32(), 1);
        assert_eq!(bob.id.as_i32(), 2);

        assert_eq!(store.get_user(bob.id).await.unwrap(), Some(bob));
        assert_eq!(
            store.get_user_by_username("alice").await.unwrap(),
            Some(alice)
        );
        assert!(store.get_user(UserId::new(99)).await.unwrap().is_none());
        assert!(matches!(
            store.create_user("alice").await,
            Err(StoreError::Conflict(_))
        ));
    }
}
