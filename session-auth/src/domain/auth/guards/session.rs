use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::ProviderUserError;
use crate::domain::auth::events::AuthEvent;
use crate::domain::auth::events::AuthenticateEvent;
use crate::domain::auth::events::LoginEvent;
use crate::domain::auth::models::generate_remember_me_token;
use crate::domain::auth::models::AuthUser;
use crate::domain::auth::models::CookieOptions;
use crate::domain::auth::models::GuardSnapshot;
use crate::domain::auth::models::ProviderUser;
use crate::domain::auth::models::RememberMeCookie;
use crate::domain::auth::models::UserId;
use crate::domain::auth::models::REMEMBER_ME_MAX_AGE;
use crate::domain::auth::ports::CookieJar;
use crate::domain::auth::ports::EventSink;
use crate::domain::auth::ports::Guard;
use crate::domain::auth::ports::SessionStore;
use crate::domain::auth::ports::UserProvider;

/// Session-driven authentication guard.
///
/// One instance per request scope. Establishes the user from verified
/// credentials, a live session id, or a remember-me cookie, and keeps the
/// per-request authentication state described by [`Guard`].
pub struct SessionGuard<P>
where
    P: UserProvider,
{
    name: String,
    provider: Arc<P>,
    session: Arc<dyn SessionStore>,
    cookies: Arc<dyn CookieJar>,
    events: Arc<dyn EventSink>,
    user: Option<AuthUser>,
    auth_failure: Option<AuthError>,
    is_logged_out: bool,
    is_authenticated: bool,
    authentication_attempted: bool,
    via_remember: bool,
}

impl<P> SessionGuard<P>
where
    P: UserProvider,
{
    /// Create a new guard bound to one request's session and cookie handles.
    pub fn new(
        name: &str,
        provider: Arc<P>,
        session: Arc<dyn SessionStore>,
        cookies: Arc<dyn CookieJar>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            name: name.to_string(),
            provider,
            session,
            cookies,
            events,
            user: None,
            auth_failure: None,
            is_logged_out: false,
            is_authenticated: false,
            authentication_attempted: false,
            via_remember: false,
        }
    }

    /// The session key holding this guard's user id.
    fn session_key(&self) -> String {
        format!("auth_{}", self.name)
    }

    /// The cookie holding this guard's remember-me payload.
    fn remember_me_cookie_name(&self) -> String {
        format!("remember_{}", self.name)
    }

    async fn lookup_using_uid(&self, uid: &str) -> Result<ProviderUser, AuthError> {
        let provider_user = self.provider.find_by_uid(uid).await?;

        if provider_user.user().is_none() {
            return Err(AuthError::invalid_uid(&self.name));
        }

        Ok(provider_user)
    }

    async fn lookup_by_id(&self, id: &UserId) -> Result<ProviderUser, AuthError> {
        let provider_user = self.provider.find_by_id(id).await?;

        if provider_user.user().is_none() {
            return Err(AuthError::invalid_uid(&self.name));
        }

        Ok(provider_user)
    }

    fn verify_user_password(
        &self,
        provider_user: &ProviderUser,
        password: &str,
    ) -> Result<(), AuthError> {
        if !provider_user.verify_password(password)? {
            return Err(AuthError::invalid_password(&self.name));
        }

        Ok(())
    }

    /// Wrap a raw user for login, requiring a resolvable identifier.
    fn user_for_login(&self, user: AuthUser) -> Result<(ProviderUser, UserId), AuthError> {
        let provider_user = self.provider.user_for(Some(user));

        let id = provider_user
            .id()
            .ok_or_else(|| AuthError::MissingIdentifier {
                identifier_key: provider_user.identifier_key().to_string(),
            })?;

        Ok((provider_user, id))
    }

    fn mark_logged_in(&mut self, user: AuthUser, authenticated: bool, via_remember: bool) {
        self.user = Some(user);
        self.is_logged_out = false;
        if authenticated {
            self.is_authenticated = true;
        }
        if via_remember {
            self.via_remember = true;
        }
    }

    fn mark_logged_out(&mut self) {
        self.is_logged_out = true;
        self.is_authenticated = false;
        self.via_remember = false;
        self.user = None;
    }

    async fn set_session(&self, id: &UserId) -> Result<(), AuthError> {
        self.session
            .put(&self.session_key(), &id.to_string())
            .await?;
        Ok(())
    }

    /// Fetch the user's persisted remember-me token, minting and persisting
    /// one the first time it is requested.
    async fn persisted_remember_me_token(
        &self,
        provider_user: &mut ProviderUser,
    ) -> Result<String, AuthError> {
        if let Some(token) = provider_user.remember_me_token() {
            return Ok(token.to_string());
        }

        let token = generate_remember_me_token();
        provider_user.set_remember_me_token(token.clone())?;
        self.provider.update_remember_me_token(provider_user).await?;

        Ok(token)
    }

    async fn set_remember_me_cookie(&self, id: UserId, token: &str) -> Result<(), AuthError> {
        let payload = RememberMeCookie {
            id,
            token: token.to_string(),
        };
        let value = payload
            .encode()
            .map_err(|e| AuthError::Unknown(format!("Cookie payload serialization: {}", e)))?;

        self.cookies
            .set(
                &self.remember_me_cookie_name(),
                &value,
                CookieOptions {
                    http_only: true,
                    signed: true,
                    max_age: Some(REMEMBER_ME_MAX_AGE),
                },
            )
            .await?;

        Ok(())
    }

    async fn clear_user_from_storage(&self) -> Result<(), AuthError> {
        self.session.clear().await?;
        self.cookies.clear(&self.remember_me_cookie_name()).await?;
        Ok(())
    }

    async fn emit(&self, event: AuthEvent) {
        if let Err(e) = self.events.emit(event).await {
            tracing::error!(guard = %self.name, "Failed to emit auth event: {}", e);
        }
    }

    /// Resume from the remember-me cookie after no live session was found.
    async fn authenticate_via_remember_me(&mut self) -> Result<AuthUser, AuthError> {
        let raw = self
            .cookies
            .get(&self.remember_me_cookie_name())
            .await?
            .ok_or_else(|| AuthError::invalid_session(&self.name))?;

        let payload = RememberMeCookie::decode(&raw)
            .filter(|payload| !payload.token.is_empty())
            .ok_or_else(|| AuthError::invalid_session(&self.name))?;

        let provider_user = self
            .provider
            .find_by_remember_me_token(&payload.id, &payload.token)
            .await?;
        let user = provider_user
            .into_user()
            .ok_or_else(|| AuthError::invalid_session(&self.name))?;

        // Re-establish the session and re-issue the cookie with the same
        // token; rotation only happens through recycle-logout.
        self.set_session(&user.id).await?;
        self.set_remember_me_cookie(user.id, &payload.token).await?;

        self.mark_logged_in(user.clone(), true, true);
        self.emit(AuthEvent::Authenticate(AuthenticateEvent::new(
            &self.name, &user, true,
        )))
        .await;

        Ok(user)
    }

    /// Resolve the request's user, first from the session, then from the
    /// remember-me cookie.
    async fn resolve_authentication(&mut self) -> Result<AuthUser, AuthError> {
        // A live session id always wins over the remember-me cookie.
        if let Some(raw_id) = self.session.get(&self.session_key()).await? {
            let id = UserId::from_string(&raw_id)
                .map_err(|_| AuthError::invalid_session(&self.name))?;

            let provider_user = self.provider.find_by_id(&id).await?;
            let user = provider_user
                .into_user()
                .ok_or_else(|| AuthError::invalid_session(&self.name))?;

            self.mark_logged_in(user.clone(), true, false);
            self.emit(AuthEvent::Authenticate(AuthenticateEvent::new(
                &self.name, &user, false,
            )))
            .await;

            return Ok(user);
        }

        self.authenticate_via_remember_me().await
    }
}

#[async_trait]
impl<P> Guard for SessionGuard<P>
where
    P: UserProvider + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    fn is_logged_out(&self) -> bool {
        self.is_logged_out
    }

    fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    fn authentication_attempted(&self) -> bool {
        self.authentication_attempted
    }

    fn via_remember(&self) -> bool {
        self.via_remember
    }

    async fn verify_credentials(&self, uid: &str, password: &str) -> Result<AuthUser, AuthError> {
        if uid.is_empty() || password.is_empty() {
            return Err(AuthError::invalid_uid(&self.name));
        }

        let provider_user = self.lookup_using_uid(uid).await?;
        self.verify_user_password(&provider_user, password)?;

        provider_user
            .into_user()
            .ok_or_else(|| AuthError::invalid_uid(&self.name))
    }

    async fn attempt(
        &mut self,
        uid: &str,
        password: &str,
        remember: bool,
    ) -> Result<AuthUser, AuthError> {
        let user = self.verify_credentials(uid, password).await?;
        self.login(user, remember).await?;

        self.user
            .clone()
            .ok_or_else(|| AuthError::invalid_uid(&self.name))
    }

    async fn login(&mut self, user: AuthUser, remember: bool) -> Result<(), AuthError> {
        let (mut provider_user, id) = self.user_for_login(user)?;

        self.set_session(&id).await?;

        let mut token = None;
        if remember {
            let minted = self.persisted_remember_me_token(&mut provider_user).await?;
            self.set_remember_me_cookie(id, &minted).await?;
            token = Some(minted);
        }

        let user = provider_user
            .into_user()
            .ok_or(ProviderUserError::MissingUser { operation: "login" })?;

        self.emit(AuthEvent::Login(LoginEvent::new(
            &self.name,
            &user,
            token.as_deref(),
        )))
        .await;

        // A direct login is not the authenticate flow: the resume flags
        // stay false and only flip inside authenticate().
        self.mark_logged_in(user, false, false);

        Ok(())
    }

    async fn login_via_id(&mut self, id: &UserId, remember: bool) -> Result<AuthUser, AuthError> {
        let provider_user = self.lookup_by_id(id).await?;
        let user = provider_user
            .into_user()
            .ok_or_else(|| AuthError::invalid_uid(&self.name))?;

        self.login(user, remember).await?;

        self.user
            .clone()
            .ok_or_else(|| AuthError::invalid_uid(&self.name))
    }

    async fn authenticate(&mut self) -> Result<AuthUser, AuthError> {
        // One-shot latch: replay the cached outcome for repeat calls,
        // preserving the original failure class.
        if self.authentication_attempted {
            return match (&self.user, &self.auth_failure) {
                (Some(user), _) => Ok(user.clone()),
                (None, Some(failure)) => Err(failure.clone()),
                (None, None) => Err(AuthError::invalid_session(&self.name)),
            };
        }
        self.authentication_attempted = true;

        let result = self.resolve_authentication().await;
        if let Err(e) = &result {
            self.auth_failure = Some(e.clone());
        }

        result
    }

    async fn check(&mut self) -> Result<bool, AuthError> {
        match self.authenticate().await {
            Ok(_) => {}
            Err(e) if e.is_invalid_session() => {
                tracing::debug!(guard = %self.name, "Authentication check failed: {}", e);
            }
            Err(e) => return Err(e),
        }

        Ok(self.is_authenticated)
    }

    async fn logout(&mut self, recycle_remember_token: bool) -> Result<(), AuthError> {
        // Return early when not re-generating the remember-me token
        if !recycle_remember_token {
            self.clear_user_from_storage().await?;
            self.mark_logged_out();
            return Ok(());
        }

        // Authenticate the current request if not already attempted, so the
        // current user can be resolved; a missing session is swallowed.
        if !self.authentication_attempted {
            self.check().await?;
        }

        // If a user is present, rotate their persisted remember-me token so
        // previously issued cookies stop matching.
        if let Some(user) = self.user.clone() {
            let mut provider_user = self.provider.user_for(Some(user));

            tracing::trace!(guard = %self.name, "re-generating remember me token");
            provider_user.set_remember_me_token(generate_remember_me_token())?;
            self.provider
                .update_remember_me_token(&provider_user)
                .await?;
        }

        self.clear_user_from_storage().await?;
        self.mark_logged_out();

        Ok(())
    }

    fn snapshot(&self) -> GuardSnapshot {
        GuardSnapshot {
            is_logged_in: self.is_logged_in(),
            is_guest: self.is_guest(),
            via_remember: self.via_remember,
            authentication_attempted: self.authentication_attempted,
            is_authenticated: self.is_authenticated,
            user: self.user.clone(),
        }
    }
}
