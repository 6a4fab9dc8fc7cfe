//! In-memory request-scoped session and cookie adapters.
//!
//! Stand-ins for the transport layer's session and cookie codec: one
//! instance models one request/response exchange. The cookie jar doubles as
//! the client's cookie store when simulating consecutive requests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::auth::errors::SessionError;
use crate::domain::auth::models::CookieOptions;
use crate::domain::auth::ports::CookieJar;
use crate::domain::auth::ports::SessionStore;

/// Per-request key/value session held in memory.
pub struct MemorySession {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemorySession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySession {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let values = self
            .values
            .lock()
            .map_err(|_| SessionError::Session("session lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| SessionError::Session("session lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| SessionError::Session("session lock poisoned".to_string()))?;
        values.clear();
        Ok(())
    }
}

/// In-memory cookie jar storing values together with their set options.
pub struct MemoryCookieJar {
    cookies: Mutex<HashMap<String, (String, CookieOptions)>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self {
            cookies: Mutex::new(HashMap::new()),
        }
    }

    /// Inspect a stored cookie and the options it was set with.
    pub fn cookie(&self, name: &str) -> Option<(String, CookieOptions)> {
        self.cookies
            .lock()
            .ok()
            .and_then(|cookies| cookies.get(name).cloned())
    }

    /// Overwrite a cookie value directly, bypassing options.
    ///
    /// Lets tests model a client presenting a tampered or stale cookie.
    pub fn put_raw(&self, name: &str, value: &str) {
        if let Ok(mut cookies) = self.cookies.lock() {
            cookies.insert(
                name.to_string(),
                (
                    value.to_string(),
                    CookieOptions {
                        http_only: true,
                        signed: true,
                        max_age: None,
                    },
                ),
            );
        }
    }
}

impl Default for MemoryCookieJar {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CookieJar for MemoryCookieJar {
    async fn get(&self, name: &str) -> Result<Option<String>, SessionError> {
        let cookies = self
            .cookies
            .lock()
            .map_err(|_| SessionError::Cookie("cookie lock poisoned".to_string()))?;
        Ok(cookies.get(name).map(|(value, _)| value.clone()))
    }

    async fn set(
        &self,
        name: &str,
        value: &str,
        options: CookieOptions,
    ) -> Result<(), SessionError> {
        let mut cookies = self
            .cookies
            .lock()
            .map_err(|_| SessionError::Cookie("cookie lock poisoned".to_string()))?;
        cookies.insert(name.to_string(), (value.to_string(), options));
        Ok(())
    }

    async fn clear(&self, name: &str) -> Result<(), SessionError> {
        let mut cookies = self
            .cookies
            .lock()
            .map_err(|_| SessionError::Cookie("cookie lock poisoned".to_string()))?;
        cookies.remove(name);
        Ok(())
    }
}
