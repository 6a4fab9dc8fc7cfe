use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::auth::errors::StoreError;
use crate::domain::auth::models::AuthUser;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::UserStore;

/// In-memory user store.
///
/// Backs embedded deployments and tests where no database is wired in.
pub struct InMemoryUserStore {
    users: Mutex<HashMap<Uuid, AuthUser>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Seed a user record.
    pub fn insert(&self, user: AuthUser) -> Result<(), StoreError> {
        let mut users = self.lock()?;
        users.insert(user.id.0, user);
        Ok(())
    }

    /// Read back a user record, mainly for assertions.
    pub fn get(&self, id: &UserId) -> Result<Option<AuthUser>, StoreError> {
        let users = self.lock()?;
        Ok(users.get(&id.0).cloned())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, AuthUser>>, StoreError> {
        self.users
            .lock()
            .map_err(|_| StoreError::Database("user store lock poisoned".to_string()))
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<AuthUser>, StoreError> {
        let users = self.lock()?;
        Ok(users.get(&id.0).cloned())
    }

    async fn find_by_field(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Option<AuthUser>, StoreError> {
        let users = self.lock()?;
        Ok(users
            .values()
            .find(|user| user.uid_value(field) == Some(value))
            .cloned())
    }

    async fn find_by_remember_me_token(
        &self,
        id: &UserId,
        token: &str,
    ) -> Result<Option<AuthUser>, StoreError> {
        let users = self.lock()?;
        Ok(users
            .get(&id.0)
            .filter(|user| user.remember_me_token.as_deref() == Some(token))
            .cloned())
    }

    async fn update_remember_me_token(
        &self,
        id: &UserId,
        token: Option<String>,
    ) -> Result<(), StoreError> {
        let mut users = self.lock()?;
        // Matches UPDATE semantics: zero affected rows is not an error
        if let Some(user) = users.get_mut(&id.0) {
            user.remember_me_token = token;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn test_user(email: &str, username: &str) -> AuthUser {
        AuthUser {
            id: UserId::new(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: Some("$argon2id$test_hash".to_string()),
            remember_me_token: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_find_by_field_matches_configured_uid_fields() {
        let store = InMemoryUserStore::new();
        let user = test_user("a@b.com", "alice");
        store.insert(user.clone()).unwrap();

        let by_email = store.find_by_field("email", "a@b.com").await.unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(user.id));

        let by_username = store.find_by_field("username", "alice").await.unwrap();
        assert_eq!(by_username.map(|u| u.id), Some(user.id));

        let by_unknown = store.find_by_field("phone", "a@b.com").await.unwrap();
        assert!(by_unknown.is_none());
    }

    #[tokio::test]
    async fn test_remember_me_token_pair_lookup() {
        let store = InMemoryUserStore::new();
        let mut user = test_user("a@b.com", "alice");
        user.remember_me_token = Some("token123".to_string());
        let id = user.id;
        store.insert(user).unwrap();

        assert!(store
            .find_by_remember_me_token(&id, "token123")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_by_remember_me_token(&id, "stale")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_by_remember_me_token(&UserId::new(), "token123")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_remember_me_token_rewrites_single_row() {
        let store = InMemoryUserStore::new();
        let user = test_user("a@b.com", "alice");
        let id = user.id;
        store.insert(user).unwrap();

        store
            .update_remember_me_token(&id, Some("rotated".to_string()))
            .await
            .unwrap();
        assert_eq!(
            store.get(&id).unwrap().unwrap().remember_me_token.as_deref(),
            Some("rotated")
        );

        // Unknown row is a no-op, mirroring UPDATE with no match
        store
            .update_remember_me_token(&UserId::new(), None)
            .await
            .unwrap();
    }
}
