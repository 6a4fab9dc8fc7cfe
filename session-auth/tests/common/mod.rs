//! Shared harness simulating a browser talking to the guard stack.
//!
//! The user store, hasher and cookie jar live for the whole scenario; the
//! session store stands in for the server-side session and can be swapped
//! out to model expiry. Each simulated request gets its own registry wired
//! to the shared handles.

use std::sync::Arc;

use chrono::Utc;

use hash::Argon2Hasher;
use hash::Hasher;
use session_auth::build_registry;
use session_auth::config::AuthConfig;
use session_auth::outbound::events::BroadcastEventSink;
use session_auth::outbound::request::MemoryCookieJar;
use session_auth::outbound::request::MemorySession;
use session_auth::outbound::stores::InMemoryUserStore;
use session_auth::Auth;
use session_auth::AuthUser;
use session_auth::UserId;

pub struct Harness {
    pub store: Arc<InMemoryUserStore>,
    pub hasher: Arc<dyn Hasher>,
    pub session: Arc<MemorySession>,
    pub cookies: Arc<MemoryCookieJar>,
    pub events: Arc<BroadcastEventSink>,
    config: AuthConfig,
}

impl Harness {
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        Self {
            store: Arc::new(InMemoryUserStore::new()),
            hasher: Arc::new(Argon2Hasher::new()),
            session: Arc::new(MemorySession::new()),
            cookies: Arc::new(MemoryCookieJar::new()),
            events: Arc::new(BroadcastEventSink::new(16)),
            config: AuthConfig::single_session_guard("web"),
        }
    }

    /// Insert a user with a properly hashed password.
    pub fn seed_user(&self, username: &str, email: &str, password: &str) -> AuthUser {
        let user = AuthUser {
            id: UserId::new(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: Some(self.hasher.make(password).unwrap()),
            remember_me_token: None,
            created_at: Utc::now(),
        };
        self.store.insert(user.clone()).unwrap();
        user
    }

    /// Build the registry for one simulated request.
    pub fn request(&self) -> Auth {
        build_registry(
            &self.config,
            self.store.clone(),
            self.hasher.clone(),
            self.session.clone(),
            self.cookies.clone(),
            self.events.clone(),
        )
        .unwrap()
    }

    /// Replace the server-side session, as if it had expired. Cookies held
    /// by the simulated browser survive.
    pub fn expire_session(&mut self) {
        self.session = Arc::new(MemorySession::new());
    }
}
