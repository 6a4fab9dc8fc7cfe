use serde::Serialize;

use crate::domain::auth::models::AuthUser;

/// Envelope for guard lifecycle events.
#[derive(Debug, Clone, Serialize)]
pub enum AuthEvent {
    Login(LoginEvent),
    Authenticate(AuthenticateEvent),
}

impl AuthEvent {
    /// Get the event name as observed by subscribers.
    pub fn event_name(&self) -> &'static str {
        match self {
            AuthEvent::Login(_) => "session:login",
            AuthEvent::Authenticate(_) => "session:authenticate",
        }
    }

    /// Name of the guard that emitted the event.
    pub fn guard(&self) -> &str {
        match self {
            AuthEvent::Login(e) => &e.guard,
            AuthEvent::Authenticate(e) => &e.guard,
        }
    }
}

/// Emitted after a user is logged in through `login` or `attempt`.
///
/// `token` carries the remember-me token only when remember was requested.
#[derive(Debug, Clone, Serialize)]
pub struct LoginEvent {
    pub guard: String,
    pub user: AuthUser,
    pub token: Option<String>,
}

impl LoginEvent {
    pub fn new(guard: &str, user: &AuthUser, token: Option<&str>) -> Self {
        Self {
            guard: guard.to_string(),
            user: user.clone(),
            token: token.map(String::from),
        }
    }
}

/// Emitted after `authenticate` resumes a session or remember-me cookie.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticateEvent {
    pub guard: String,
    pub user: AuthUser,
    pub via_remember: bool,
}

impl AuthenticateEvent {
    pub fn new(guard: &str, user: &AuthUser, via_remember: bool) -> Self {
        Self {
            guard: guard.to_string(),
            user: user.clone(),
            via_remember,
        }
    }
}
