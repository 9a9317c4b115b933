//! Session state: the auth token and the identity derived from it
//!
//! Exactly one store exists per process. It is injected into everything that
//! needs it rather than read from a global, so tests can hand components a
//! fixture store.

use std::sync::{Arc, PoisonError, RwLock};

/// Avatar shown before the profile has loaded (and for logged-out users).
pub const DEFAULT_AVATAR: &str = "👤";

/// Identity fields returned by the `/auth/me` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
    pub avatar: String,
}

#[derive(Debug)]
struct SessionInner {
    token: Option<String>,
    username: String,
    avatar: String,
}

impl SessionInner {
    fn logged_out() -> Self {
        Self {
            token: None,
            username: String::new(),
            avatar: DEFAULT_AVATAR.to_string(),
        }
    }
}

/// Thread-safe holder for the current session.
///
/// Lock poisoning is recovered from rather than propagated: the inner state
/// is plain data and remains valid even if a writer panicked.
#[derive(Debug)]
pub struct SessionStore {
    inner: RwLock<SessionInner>,
}

pub type SharedSession = Arc<SessionStore>;

impl SessionStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(SessionInner::logged_out()),
        }
    }

    /// Store a freshly issued bearer token. Identity fields keep their
    /// defaults until [`apply_profile`](Self::apply_profile) runs.
    pub fn login(&self, token: impl Into<String>) {
        let mut inner = self.write();
        inner.token = Some(token.into());
        tracing::info!("session established");
    }

    /// Fill in identity fields fetched from the backend.
    pub fn apply_profile(&self, profile: Profile) {
        let mut inner = self.write();
        inner.username = profile.username;
        if !profile.avatar.is_empty() {
            inner.avatar = profile.avatar;
        }
    }

    /// Drop the token and reset identity to logged-out defaults.
    ///
    /// Also the landing state for an expired token: a 401 anywhere is
    /// treated as "no session".
    pub fn logout(&self) {
        let mut inner = self.write();
        if inner.token.is_some() {
            tracing::info!("session cleared");
        }
        *inner = SessionInner::logged_out();
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    pub fn username(&self) -> String {
        self.read().username.clone()
    }

    pub fn avatar(&self) -> String {
        self.read().avatar.clone()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
