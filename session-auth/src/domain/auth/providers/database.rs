use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::StoreError;
use crate::domain::auth::models::AuthUser;
use crate::domain::auth::models::ProviderUser;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::UserProvider;
use crate::domain::auth::ports::UserStore;
use hash::Hasher;

/// User provider backed by a raw user store.
///
/// Holds the ordered uid fields and identifier key from configuration;
/// the store beneath it stays swappable.
pub struct DatabaseUserProvider<S>
where
    S: UserStore,
{
    store: Arc<S>,
    hasher: Arc<dyn Hasher>,
    uids: Vec<String>,
    identifier_key: String,
}

impl<S> DatabaseUserProvider<S>
where
    S: UserStore,
{
    /// Create a new provider with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Raw user persistence implementation
    /// * `hasher` - Hashing capability for password verification
    /// * `config` - uid fields and identifier key for this provider
    pub fn new(store: Arc<S>, hasher: Arc<dyn Hasher>, config: &ProviderConfig) -> Self {
        Self {
            store,
            hasher,
            uids: config.uids.clone(),
            identifier_key: config.identifier_key.clone(),
        }
    }
}

#[async_trait]
impl<S> UserProvider for DatabaseUserProvider<S>
where
    S: UserStore,
{
    fn user_for(&self, user: Option<AuthUser>) -> ProviderUser {
        ProviderUser::new(user, &self.identifier_key, self.hasher.clone())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<ProviderUser, StoreError> {
        let user = self.store.find_by_id(id).await?;
        Ok(self.user_for(user))
    }

    async fn find_by_uid(&self, uid: &str) -> Result<ProviderUser, StoreError> {
        for field in &self.uids {
            if let Some(user) = self.store.find_by_field(field, uid).await? {
                return Ok(self.user_for(Some(user)));
            }
        }

        Ok(self.user_for(None))
    }

    async fn find_by_remember_me_token(
        &self,
        user_id: &UserId,
        token: &str,
    ) -> Result<ProviderUser, StoreError> {
        let user = self.store.find_by_remember_me_token(user_id, token).await?;
        Ok(self.user_for(user))
    }

    async fn update_remember_me_token(&self, user: &ProviderUser) -> Result<(), AuthError> {
        let id = user.id().ok_or_else(|| AuthError::MissingIdentifier {
            identifier_key: user.identifier_key().to_string(),
        })?;

        self.store
            .update_remember_me_token(&id, user.remember_me_token().map(String::from))
            .await?;

        Ok(())
    }
}
