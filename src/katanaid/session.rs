//! Session state shared by the transport, the verification gate and the auth
//! client. The store is the only globally shared mutable value in the crate:
//! readers take cheap snapshots and writers replace the whole `{token, user}`
//! pair at once, so nobody can observe a half-updated session. The token is
//! kept behind `SecretString` and never logged.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tokio::sync::watch;
use tracing::debug;

/// Profile of the signed-in user as returned by the auth endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
}

/// Local record of authentication state.
///
/// A token may be present while the profile is not loaded yet (for example
/// right after an OAuth callback).
#[derive(Clone, Default)]
pub struct Session {
    token: Option<SecretString>,
    user: Option<UserProfile>,
}

impl Session {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn new(token: Option<SecretString>, user: Option<UserProfile>) -> Self {
        Self { token, user }
    }

    #[must_use]
    pub fn authenticated(token: impl Into<String>, user: UserProfile) -> Self {
        Self {
            token: Some(SecretString::from(token.into())),
            user: Some(user),
        }
    }

    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|token| !token.expose_secret().is_empty())
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user)
            .finish()
    }
}

/// Owned handle to the current session. Clones share the same state.
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Arc<Session>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_session(Session::anonymous())
    }

    #[must_use]
    pub fn with_session(session: Session) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(session));
        Self { tx: Arc::new(tx) }
    }

    /// Returns a snapshot of the current session.
    #[must_use]
    pub fn get(&self) -> Arc<Session> {
        Arc::clone(&self.tx.borrow())
    }

    /// Replaces the whole session.
    pub fn set(&self, session: Session) {
        debug!(
            has_token = session.has_token(),
            has_user = session.user().is_some(),
            "session replaced"
        );
        self.tx.send_replace(Arc::new(session));
    }

    /// Drops token and profile, typically on logout or a 401.
    pub fn clear(&self) {
        debug!("session cleared");
        self.tx.send_replace(Arc::new(Session::anonymous()));
    }

    /// Subscribes to session replacements. The receiver starts at the current
    /// value and is notified after every `set` or `clear`.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Session>> {
        self.tx.subscribe()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &*self.get())
            .finish()
    }
}
