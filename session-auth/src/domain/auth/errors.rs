use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Programmer errors raised by the provider-user wrapper.
///
/// These indicate a wiring or usage defect, never bad user input.
#[derive(Debug, Clone, Error)]
pub enum ProviderUserError {
    #[error("Cannot \"{operation}\" for non-existing user")]
    MissingUser { operation: &'static str },

    #[error("Auth user must have a password hash in order to call \"verify_password\"")]
    MissingPassword,

    #[error("Hash error: {0}")]
    Hash(#[from] hash::HashError),
}

/// Backing user-store failures.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Unknown uid column: {0}")]
    UnknownColumn(String),
}

/// Request-scoped session and cookie channel failures.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Session store error: {0}")]
    Session(String),

    #[error("Cookie jar error: {0}")]
    Cookie(String),
}

/// Error for event sink delivery failures
#[derive(Debug, Clone, Error)]
pub enum EventSinkError {
    #[error("Failed to deliver event: {0}")]
    Delivery(String),
}

/// Top-level error for all authentication operations
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Credential and session errors: recoverable, expected to map to
    // client-facing "unauthorized" responses one layer up.
    #[error("User not found (guard: {guard})")]
    InvalidUid { guard: String },

    #[error("Password mis-match (guard: {guard})")]
    InvalidPassword { guard: String },

    #[error("Invalid session (guard: {guard})")]
    InvalidSession { guard: String },

    // Configuration and programmer errors: wiring defects, unrecoverable.
    #[error("Unknown guard: {0}")]
    UnknownGuard(String),

    #[error("Cannot login user: value of \"{identifier_key}\" is not defined")]
    MissingIdentifier { identifier_key: String },

    #[error("Provider user error: {0}")]
    ProviderUser(#[from] ProviderUserError),

    // Infrastructure errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AuthError {
    pub(crate) fn invalid_uid(guard: &str) -> Self {
        AuthError::InvalidUid {
            guard: guard.to_string(),
        }
    }

    pub(crate) fn invalid_password(guard: &str) -> Self {
        AuthError::InvalidPassword {
            guard: guard.to_string(),
        }
    }

    pub(crate) fn invalid_session(guard: &str) -> Self {
        AuthError::InvalidSession {
            guard: guard.to_string(),
        }
    }

    /// Whether this is the recoverable invalid-session class that `check`
    /// downgrades to a boolean.
    pub fn is_invalid_session(&self) -> bool {
        matches!(self, AuthError::InvalidSession { .. })
    }

    /// Whether this is a credential error (unknown identifier or wrong
    /// password).
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidUid { .. } | AuthError::InvalidPassword { .. }
        )
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Unknown(err.to_string())
    }
}
