use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose;
use base64::Engine as _;
use chrono::DateTime;
use chrono::Utc;
use rand::Rng;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::auth::errors::ProviderUserError;
use crate::domain::auth::errors::UserIdError;
use hash::Hasher;

/// Size of the raw remember-me token in bytes (43 chars base64url encoded).
const REMEMBER_ME_TOKEN_BYTES: usize = 32;

/// How long a remember-me cookie stays valid (5 years).
pub const REMEMBER_ME_MAX_AGE: Duration = Duration::from_secs(5 * 365 * 24 * 60 * 60);

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Raw domain user record as stored by the backing user store.
///
/// `password_hash` and `remember_me_token` never leave the process through
/// snapshots or events.
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    #[serde(skip_serializing)]
    pub remember_me_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuthUser {
    /// Resolve the value of a configured uid field by name.
    ///
    /// # Returns
    /// Field value, or None when the field is not a known uid field
    pub fn uid_value(&self, field: &str) -> Option<&str> {
        match field {
            "email" => Some(&self.email),
            "username" => Some(&self.username),
            _ => None,
        }
    }
}

/// Normalized wrapper bridging a provider and a guard.
///
/// Wraps the raw user a lookup produced - or its absence, which downstream
/// code treats as "not found" without erroring.
pub struct ProviderUser {
    user: Option<AuthUser>,
    identifier_key: String,
    hasher: Arc<dyn Hasher>,
}

impl ProviderUser {
    pub fn new(user: Option<AuthUser>, identifier_key: &str, hasher: Arc<dyn Hasher>) -> Self {
        Self {
            user,
            identifier_key: identifier_key.to_string(),
            hasher,
        }
    }

    /// The wrapped raw user, if the lookup matched.
    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    /// Consume the wrapper, yielding the raw user.
    pub fn into_user(self) -> Option<AuthUser> {
        self.user
    }

    /// Name of the field used as the durable identifier.
    pub fn identifier_key(&self) -> &str {
        &self.identifier_key
    }

    /// Value of the durable identifier.
    ///
    /// # Returns
    /// The user id, or None when no user is wrapped - absence signals
    /// "not found" without throwing
    pub fn id(&self) -> Option<UserId> {
        self.user.as_ref().map(|user| user.id)
    }

    /// Verify a plaintext password against the wrapped user's stored hash.
    ///
    /// # Errors
    /// * `MissingUser` - No user is wrapped
    /// * `MissingPassword` - The user carries no stored password hash
    /// * `HashError` - The hashing capability failed
    pub fn verify_password(&self, plain: &str) -> Result<bool, ProviderUserError> {
        let user = self.user.as_ref().ok_or(ProviderUserError::MissingUser {
            operation: "verify_password",
        })?;

        let hashed = user
            .password_hash
            .as_deref()
            .ok_or(ProviderUserError::MissingPassword)?;

        self.hasher
            .verify(plain, hashed)
            .map_err(ProviderUserError::Hash)
    }

    /// The wrapped user's persisted remember-me token, if any.
    pub fn remember_me_token(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|user| user.remember_me_token.as_deref())
    }

    /// Set the remember-me token on the wrapped user, in place.
    ///
    /// # Errors
    /// * `MissingUser` - No user is wrapped
    pub fn set_remember_me_token(&mut self, token: String) -> Result<(), ProviderUserError> {
        let user = self.user.as_mut().ok_or(ProviderUserError::MissingUser {
            operation: "set_remember_me_token",
        })?;

        user.remember_me_token = Some(token);
        Ok(())
    }
}

impl fmt::Debug for ProviderUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderUser")
            .field("user", &self.user)
            .field("identifier_key", &self.identifier_key)
            .finish()
    }
}

/// Externally observable projection of a guard's state.
#[derive(Debug, Clone, Serialize)]
pub struct GuardSnapshot {
    pub is_logged_in: bool,
    pub is_guest: bool,
    pub via_remember: bool,
    pub authentication_attempted: bool,
    pub is_authenticated: bool,
    pub user: Option<AuthUser>,
}

/// Payload of the signed remember-me cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RememberMeCookie {
    pub id: UserId,
    pub token: String,
}

impl RememberMeCookie {
    /// Serialize the payload for the cookie value.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a cookie value back into a payload.
    ///
    /// # Returns
    /// The payload, or None when the value is malformed or missing fields
    pub fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

/// Options forwarded to the cookie codec when setting a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieOptions {
    pub http_only: bool,
    pub signed: bool,
    pub max_age: Option<Duration>,
}

/// Mint an opaque remember-me token.
///
/// # Returns
/// URL-safe base64 string from 32 cryptographically random bytes, no padding
pub fn generate_remember_me_token() -> String {
    let mut token_bytes = [0u8; REMEMBER_ME_TOKEN_BYTES];
    rand::thread_rng().fill(&mut token_bytes);

    general_purpose::URL_SAFE_NO_PAD.encode(token_bytes)
}
