use async_trait::async_trait;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::EventSinkError;
use crate::domain::auth::errors::SessionError;
use crate::domain::auth::errors::StoreError;
use crate::domain::auth::events::AuthEvent;
use crate::domain::auth::models::AuthUser;
use crate::domain::auth::models::CookieOptions;
use crate::domain::auth::models::GuardSnapshot;
use crate::domain::auth::models::ProviderUser;
use crate::domain::auth::models::UserId;

/// User-lookup strategy backing a guard.
///
/// Every lookup wraps its result in a [`ProviderUser`]; an absent wrapped
/// user signals "not found" without erroring.
#[async_trait]
pub trait UserProvider: Send + Sync {
    /// Wrap a raw user (or its absence) in the normalized provider view.
    fn user_for(&self, user: Option<AuthUser>) -> ProviderUser;

    /// Look up a user by primary key.
    ///
    /// # Errors
    /// * `StoreError` - Backing store failed
    async fn find_by_id(&self, id: &UserId) -> Result<ProviderUser, StoreError>;

    /// Look up a user across the configured uid fields, in order.
    ///
    /// The first field with a matching row wins.
    ///
    /// # Errors
    /// * `StoreError` - Backing store failed
    async fn find_by_uid(&self, uid: &str) -> Result<ProviderUser, StoreError>;

    /// Look up a user by the exact `(id, token)` remember-me pair.
    ///
    /// # Errors
    /// * `StoreError` - Backing store failed
    async fn find_by_remember_me_token(
        &self,
        user_id: &UserId,
        token: &str,
    ) -> Result<ProviderUser, StoreError>;

    /// Persist the remember-me token currently set on the wrapped user.
    ///
    /// # Errors
    /// * `MissingIdentifier` - The wrapper carries no resolvable id
    /// * `Store` - Backing store failed
    async fn update_remember_me_token(&self, user: &ProviderUser) -> Result<(), AuthError>;
}

/// Raw persistence beneath a database-backed provider.
///
/// Lookups are read-only; the single write is the keyed remember-me token
/// update for one row (last write wins, no optimistic concurrency).
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Retrieve a user by primary key.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<AuthUser>, StoreError>;

    /// Retrieve a user by a single uid field.
    ///
    /// # Errors
    /// * `UnknownColumn` - The field is not a known uid field
    /// * `Database` - Query failed
    async fn find_by_field(&self, field: &str, value: &str)
        -> Result<Option<AuthUser>, StoreError>;

    /// Retrieve a user matching both id and remember-me token.
    async fn find_by_remember_me_token(
        &self,
        id: &UserId,
        token: &str,
    ) -> Result<Option<AuthUser>, StoreError>;

    /// Update the remember-me token for the row matching `id`.
    async fn update_remember_me_token(
        &self,
        id: &UserId,
        token: Option<String>,
    ) -> Result<(), StoreError>;
}

/// Per-request key/value session, provided by the transport layer.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a session value.
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Write a session value.
    async fn put(&self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Clear the whole session.
    async fn clear(&self) -> Result<(), SessionError>;
}

/// Signed request/response cookie access, provided by the transport layer.
///
/// Signing and verification belong to the cookie codec; a cookie whose
/// signature does not verify reads back as absent.
#[async_trait]
pub trait CookieJar: Send + Sync {
    /// Read a signed cookie value.
    async fn get(&self, name: &str) -> Result<Option<String>, SessionError>;

    /// Set a cookie on the response.
    async fn set(&self, name: &str, value: &str, options: CookieOptions)
        -> Result<(), SessionError>;

    /// Expire a cookie on the response.
    async fn clear(&self, name: &str) -> Result<(), SessionError>;
}

/// Fire-and-forget lifecycle notification sink.
///
/// Guards log delivery failures and keep going; subscriber lifecycle is
/// never owned at this layer.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: AuthEvent) -> Result<(), EventSinkError>;
}

/// The authentication state machine contract implemented by every driver.
///
/// One instance per request scope; methods take `&mut self`, so concurrent
/// calls within a request are serialized by the borrow checker.
#[async_trait]
pub trait Guard: Send {
    /// Guard identifier, stable for the guard's lifetime.
    fn name(&self) -> &str;

    /// The logged-in or authenticated user.
    fn user(&self) -> Option<&AuthUser>;

    /// Whether a user is established for this request.
    fn is_logged_in(&self) -> bool {
        self.user().is_some()
    }

    /// Always the opposite of [`Guard::is_logged_in`].
    fn is_guest(&self) -> bool {
        !self.is_logged_in()
    }

    /// Whether logout completed with no subsequent login this request.
    fn is_logged_out(&self) -> bool;

    /// Whether the user was established via the `authenticate` flow, as
    /// opposed to a direct login.
    fn is_authenticated(&self) -> bool;

    /// Whether `authenticate` has run at least once this request.
    fn authentication_attempted(&self) -> bool;

    /// Whether the active session was resumed from a remember-me token.
    fn via_remember(&self) -> bool;

    /// Verify user credentials without logging in.
    ///
    /// # Errors
    /// * `InvalidUid` - Empty input or no user matches the uid
    /// * `InvalidPassword` - User found, password mismatch
    async fn verify_credentials(&self, uid: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Verify credentials and perform login.
    async fn attempt(
        &mut self,
        uid: &str,
        password: &str,
        remember: bool,
    ) -> Result<AuthUser, AuthError>;

    /// Log in a user without any verification.
    ///
    /// # Errors
    /// * `MissingIdentifier` - The user carries no resolvable id
    async fn login(&mut self, user: AuthUser, remember: bool) -> Result<(), AuthError>;

    /// Log in a user by their id.
    async fn login_via_id(&mut self, id: &UserId, remember: bool) -> Result<AuthUser, AuthError>;

    /// Authenticate the current request from session or remember-me state.
    ///
    /// Memoized: the first call this request decides the outcome, later
    /// calls replay it without touching the provider.
    ///
    /// # Errors
    /// * `InvalidSession` - No resumable session or remember-me state
    async fn authenticate(&mut self) -> Result<AuthUser, AuthError>;

    /// Like [`Guard::authenticate`] but downgrades invalid-session to a
    /// boolean; any other error class is rethrown.
    async fn check(&mut self) -> Result<bool, AuthError>;

    /// Log out, clearing session and remember-me cookie state.
    ///
    /// With `recycle_remember_token`, the persisted token is rotated first
    /// when a user can be resolved for the request.
    async fn logout(&mut self, recycle_remember_token: bool) -> Result<(), AuthError>;

    /// The externally observable projection of this guard's state.
    fn snapshot(&self) -> GuardSnapshot;
}

impl std::fmt::Debug for dyn Guard + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}
