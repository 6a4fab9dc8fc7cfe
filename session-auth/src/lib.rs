//! Pluggable request-authentication core
//!
//! Resolves "who is making this request" through named authentication
//! strategies ("guards"), each backed by a swappable user-lookup strategy
//! ("provider"). Covers credential verification, session-based login,
//! remember-me persistent-token login, per-request authentication caching,
//! and logout, plus a multi-guard registry with a default fallback.
//!
//! The web framework, HTTP server, session/cookie codec, database, and event
//! bus stay outside: they are consumed through the port traits in
//! [`domain::auth::ports`].
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use hash::Argon2Hasher;
//! use session_auth::config::AuthConfig;
//! use session_auth::outbound::events::BroadcastEventSink;
//! use session_auth::outbound::request::MemoryCookieJar;
//! use session_auth::outbound::request::MemorySession;
//! use session_auth::outbound::stores::InMemoryUserStore;
//! use session_auth::registry::build_registry;
//!
//! # async fn demo() -> Result<(), session_auth::AuthError> {
//! let config = AuthConfig::single_session_guard("web");
//! let mut auth = build_registry(
//!     &config,
//!     Arc::new(InMemoryUserStore::new()),
//!     Arc::new(Argon2Hasher::new()),
//!     Arc::new(MemorySession::new()),
//!     Arc::new(MemoryCookieJar::new()),
//!     Arc::new(BroadcastEventSink::new(16)),
//! )?;
//!
//! let user = auth.attempt("a@b.com", "secret", true).await?;
//! assert!(auth.is_logged_in()?);
//! # let _ = user;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod domain;
pub mod outbound;

pub use domain::auth;
pub use domain::auth::registry;

// Re-export commonly used items
pub use domain::auth::errors::AuthError;
pub use domain::auth::guards::SessionGuard;
pub use domain::auth::models::AuthUser;
pub use domain::auth::models::GuardSnapshot;
pub use domain::auth::models::ProviderUser;
pub use domain::auth::models::UserId;
pub use domain::auth::ports::Guard;
pub use domain::auth::ports::UserProvider;
pub use domain::auth::providers::DatabaseUserProvider;
pub use domain::auth::registry::build_registry;
pub use domain::auth::registry::Auth;
