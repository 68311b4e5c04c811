use std::collections::HashMap;

use axum::async_trait;
use tokio::sync::RwLock;

use super::repo::{NewUser, StoreError, User, UserStore};

/// Process-local store keyed by username. Used by tests and by
/// `STORE_BACKEND=memory` for running without a database.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        new_user.validate()?;
        let mut users = self.users.write().await;
        if users.contains_key(&new_user.username) {
            return Err(StoreError::DuplicateUsername(new_user.username));
        }
        let user = new_user.into_user();
        users.insert(user.username.clone(), user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod memory_tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: "dup@example.com".into(),
            profile_image: "1-a.png".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_then_find_exact_match() {
        let store = MemoryUserStore::new();
        let user = store.insert(new_user("alice")).await.unwrap();
        assert_eq!(user.profile_image, "1-a.png");

        assert!(store.find_by_username("alice").await.unwrap().is_some());
        assert!(store.find_by_username("Alice").await.unwrap().is_none());
        assert!(store.find_by_username("alice ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected_and_store_unchanged() {
        let store = MemoryUserStore::new();
        store.insert(new_user("bob")).await.unwrap();

        let mut again = new_user("bob");
        again.profile_image = "2-b.png".into();
        let err = store.insert(again).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername(ref u) if u == "bob"));

        assert_eq!(store.len().await, 1);
        let kept = store.find_by_username("bob").await.unwrap().unwrap();
        assert_eq!(kept.profile_image, "1-a.png");
    }

    #[tokio::test]
    async fn test_duplicate_email_allowed() {
        let store = MemoryUserStore::new();
        store.insert(new_user("carol")).await.unwrap();
        store.insert(new_user("dave")).await.unwrap();
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_required_fields() {
        let store = MemoryUserStore::new();
        let err = store.insert(new_user("")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));

        let mut no_email = new_user("erin");
        no_email.email.clear();
        assert!(store.insert(no_email).await.is_err());
        assert!(store.is_empty().await);
    }
}
