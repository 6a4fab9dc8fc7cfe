use std::collections::HashMap;
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::config::GuardDriver;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::guards::SessionGuard;
use crate::domain::auth::models::AuthUser;
use crate::domain::auth::models::GuardSnapshot;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::CookieJar;
use crate::domain::auth::ports::EventSink;
use crate::domain::auth::ports::Guard;
use crate::domain::auth::ports::SessionStore;
use crate::domain::auth::ports::UserStore;
use crate::domain::auth::providers::DatabaseUserProvider;
use hash::Hasher;

/// Registry of named guards doubling as the authentication facade.
///
/// Re-exposes the full guard contract against the default guard, so callers
/// need not know which guard is active; explicit selection goes through
/// [`Auth::guard_mut`].
#[derive(Debug)]
pub struct Auth {
    default_guard: String,
    guards: HashMap<String, Box<dyn Guard>>,
}

impl Auth {
    /// Assemble a registry, validating that the default guard exists.
    ///
    /// # Errors
    /// * `UnknownGuard` - `default_guard` names no registered guard
    pub fn new(
        default_guard: &str,
        guards: HashMap<String, Box<dyn Guard>>,
    ) -> Result<Self, AuthError> {
        if !guards.contains_key(default_guard) {
            return Err(AuthError::UnknownGuard(default_guard.to_string()));
        }

        Ok(Self {
            default_guard: default_guard.to_string(),
            guards,
        })
    }

    /// Select a guard by name, falling back to the default when omitted.
    ///
    /// # Errors
    /// * `UnknownGuard` - The name matches no registered guard
    pub fn guard(&self, name: Option<&str>) -> Result<&dyn Guard, AuthError> {
        let name = name.unwrap_or(&self.default_guard);
        self.guards
            .get(name)
            .map(|guard| guard.as_ref())
            .ok_or_else(|| AuthError::UnknownGuard(name.to_string()))
    }

    /// Mutable variant of [`Auth::guard`] for the state-changing operations.
    pub fn guard_mut(&mut self, name: Option<&str>) -> Result<&mut dyn Guard, AuthError> {
        let name = name.unwrap_or(&self.default_guard);
        match self.guards.get_mut(name) {
            Some(guard) => Ok(guard.as_mut()),
            None => Err(AuthError::UnknownGuard(name.to_string())),
        }
    }

    /// Name of the default guard.
    pub fn name(&self) -> Result<&str, AuthError> {
        Ok(self.guard(None)?.name())
    }

    /// The default guard's logged-in user.
    pub fn user(&self) -> Result<Option<AuthUser>, AuthError> {
        Ok(self.guard(None)?.user().cloned())
    }

    pub fn is_logged_in(&self) -> Result<bool, AuthError> {
        Ok(self.guard(None)?.is_logged_in())
    }

    pub fn is_guest(&self) -> Result<bool, AuthError> {
        Ok(self.guard(None)?.is_guest())
    }

    pub fn is_logged_out(&self) -> Result<bool, AuthError> {
        Ok(self.guard(None)?.is_logged_out())
    }

    pub fn is_authenticated(&self) -> Result<bool, AuthError> {
        Ok(self.guard(None)?.is_authenticated())
    }

    pub fn authentication_attempted(&self) -> Result<bool, AuthError> {
        Ok(self.guard(None)?.authentication_attempted())
    }

    pub fn via_remember(&self) -> Result<bool, AuthError> {
        Ok(self.guard(None)?.via_remember())
    }

    /// Verify credentials through the default guard.
    pub async fn verify_credentials(
        &self,
        uid: &str,
        password: &str,
    ) -> Result<AuthUser, AuthError> {
        self.guard(None)?.verify_credentials(uid, password).await
    }

    /// Verify credentials and log in through the default guard.
    pub async fn attempt(
        &mut self,
        uid: &str,
        password: &str,
        remember: bool,
    ) -> Result<AuthUser, AuthError> {
        self.guard_mut(None)?.attempt(uid, password, remember).await
    }

    /// Log in a user through the default guard without verification.
    pub async fn login(&mut self, user: AuthUser, remember: bool) -> Result<(), AuthError> {
        self.guard_mut(None)?.login(user, remember).await
    }

    /// Log in by id through the default guard.
    pub async fn login_via_id(
        &mut self,
        id: &UserId,
        remember: bool,
    ) -> Result<AuthUser, AuthError> {
        self.guard_mut(None)?.login_via_id(id, remember).await
    }

    /// Authenticate the current request through the default guard.
    pub async fn authenticate(&mut self) -> Result<AuthUser, AuthError> {
        self.guard_mut(None)?.authenticate().await
    }

    /// Boolean authenticate through the default guard.
    pub async fn check(&mut self) -> Result<bool, AuthError> {
        self.guard_mut(None)?.check().await
    }

    /// Log out through the default guard.
    pub async fn logout(&mut self, recycle_remember_token: bool) -> Result<(), AuthError> {
        self.guard_mut(None)?.logout(recycle_remember_token).await
    }

    /// Snapshot of the default guard's state.
    pub fn snapshot(&self) -> Result<GuardSnapshot, AuthError> {
        Ok(self.guard(None)?.snapshot())
    }
}

/// Build the guard registry from static configuration.
///
/// Constructs, per configured entry, its own provider and guard; each guard
/// gets its own `auth_<name>` session key and `remember_<name>` cookie, so
/// guards never share session state even within one request.
///
/// # Arguments
/// * `config` - Guard list and default guard name
/// * `store` - Raw user persistence shared by all providers
/// * `hasher` - Hashing capability shared by all providers
/// * `session` - This request's session handle
/// * `cookies` - This request's cookie handle
/// * `events` - Lifecycle notification sink
///
/// # Errors
/// * `UnknownGuard` - The configured default names no guard entry
pub fn build_registry<S>(
    config: &AuthConfig,
    store: Arc<S>,
    hasher: Arc<dyn Hasher>,
    session: Arc<dyn SessionStore>,
    cookies: Arc<dyn CookieJar>,
    events: Arc<dyn EventSink>,
) -> Result<Auth, AuthError>
where
    S: UserStore,
{
    let mut guards: HashMap<String, Box<dyn Guard>> = HashMap::new();

    for (name, guard_config) in &config.guards {
        let guard: Box<dyn Guard> = match guard_config.driver {
            GuardDriver::Session => {
                let provider = Arc::new(DatabaseUserProvider::new(
                    store.clone(),
                    hasher.clone(),
                    &guard_config.provider,
                ));
                Box::new(SessionGuard::new(
                    name,
                    provider,
                    session.clone(),
                    cookies.clone(),
                    events.clone(),
                ))
            }
        };

        guards.insert(name.clone(), guard);
    }

    Auth::new(&config.default_guard, guards)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::config::GuardConfig;
    use crate::config::ProviderConfig;
    use crate::outbound::events::NullEventSink;
    use crate::outbound::request::MemoryCookieJar;
    use crate::outbound::request::MemorySession;
    use crate::outbound::stores::InMemoryUserStore;
    use hash::HashError;

    struct PlainHasher;

    impl Hasher for PlainHasher {
        fn make(&self, plain: &str) -> Result<String, HashError> {
            Ok(plain.to_string())
        }

        fn verify(&self, plain: &str, hashed: &str) -> Result<bool, HashError> {
            Ok(plain == hashed)
        }
    }

    fn seeded_store() -> (Arc<InMemoryUserStore>, AuthUser) {
        let store = Arc::new(InMemoryUserStore::new());
        let user = AuthUser {
            id: UserId::new(),
            username: "alice".to_string(),
            email: "a@b.com".to_string(),
            password_hash: Some("secret".to_string()),
            remember_me_token: None,
            created_at: Utc::now(),
        };
        store.insert(user.clone()).unwrap();
        (store, user)
    }

    fn registry(config: &AuthConfig) -> Result<Auth, AuthError> {
        let (store, _) = seeded_store();
        build_registry(
            config,
            store,
            Arc::new(PlainHasher),
            Arc::new(MemorySession::new()),
            Arc::new(MemoryCookieJar::new()),
            Arc::new(NullEventSink),
        )
    }

    fn two_guard_config() -> AuthConfig {
        let mut guards = HashMap::new();
        for name in ["web", "api"] {
            guards.insert(
                name.to_string(),
                GuardConfig {
                    driver: GuardDriver::Session,
                    provider: ProviderConfig::default(),
                },
            );
        }
        AuthConfig {
            default_guard: "web".to_string(),
            guards,
        }
    }

    #[tokio::test]
    async fn test_build_registry_rejects_unknown_default() {
        let mut config = two_guard_config();
        config.default_guard = "missing".to_string();

        let result = registry(&config);
        assert!(matches!(result.unwrap_err(), AuthError::UnknownGuard(_)));
    }

    #[tokio::test]
    async fn test_guard_selection() {
        let auth = registry(&two_guard_config()).unwrap();

        assert_eq!(auth.guard(None).unwrap().name(), "web");
        assert_eq!(auth.guard(Some("api")).unwrap().name(), "api");
        assert!(matches!(
            auth.guard(Some("ldap")).unwrap_err(),
            AuthError::UnknownGuard(_)
        ));
    }

    #[tokio::test]
    async fn test_facade_delegates_to_default_guard() {
        let mut auth = registry(&two_guard_config()).unwrap();

        assert!(auth.is_guest().unwrap());

        let user = auth.attempt("a@b.com", "secret", false).await.unwrap();
        assert_eq!(user.email, "a@b.com");

        assert!(auth.is_logged_in().unwrap());
        assert_eq!(auth.user().unwrap().map(|u| u.email), Some(user.email));
        assert_eq!(auth.name().unwrap(), "web");

        auth.logout(false).await.unwrap();
        assert!(auth.is_logged_out().unwrap());
    }

    #[tokio::test]
    async fn test_guards_do_not_share_session_state() {
        let mut auth = registry(&two_guard_config()).unwrap();

        auth.guard_mut(Some("web"))
            .unwrap()
            .attempt("a@b.com", "secret", false)
            .await
            .unwrap();

        // The web session key does not authenticate the api guard
        let result = auth.guard_mut(Some("api")).unwrap().authenticate().await;
        assert!(matches!(
            result.unwrap_err(),
            AuthError::InvalidSession { .. }
        ));
    }

    #[tokio::test]
    async fn test_facade_attempt_rejects_bad_credentials() {
        let mut auth = registry(&two_guard_config()).unwrap();

        let result = auth.attempt("a@b.com", "wrong", false).await;
        assert!(matches!(
            result.unwrap_err(),
            AuthError::InvalidPassword { guard } if guard == "web"
        ));
        assert!(auth.is_guest().unwrap());
    }
}
