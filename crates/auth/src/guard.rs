//! Session guard: decides what a protected screen may show.
//!
//! ```text
//! Unknown ──initial lookup──▶ Authenticated ◀──session change──▶ Unauthenticated
//!         └─────────────────▶ Unauthenticated
//! ```
//!
//! There is no "refreshing" or "error" state: a failed lookup and an expired
//! session both end up `Unauthenticated`. Renewal is the caller's job; see
//! [`SessionGuard::is_expired`].

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::channel::{SessionChange, SessionChannel, SessionSubscription};
use crate::session::{Session, validate_session};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Session not resolved yet (startup).
    Unknown,
    Authenticated(Session),
    Unauthenticated,
}

impl SessionState {
    fn from_session(session: Option<Session>, now: DateTime<Utc>) -> Self {
        match session {
            Some(s) if validate_session(&s, now).is_ok() => SessionState::Authenticated(s),
            _ => SessionState::Unauthenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// Outcome of guarding a protected screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Session still being resolved: render a loading placeholder.
    Loading,
    /// Render the screen.
    Granted,
    /// Send the user to the login screen.
    RedirectToLogin,
}

/// Holds the current [`SessionState`].
///
/// Shared behind an `Arc` and updated from the session channel; screens
/// read it through the application context.
#[derive(Debug)]
pub struct SessionGuard {
    state: RwLock<SessionState>,
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionGuard {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SessionState::Unknown),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
            .read()
            .map(|s| s.clone())
            .unwrap_or(SessionState::Unauthenticated)
    }

    fn set(&self, next: SessionState) {
        if let Ok(mut state) = self.state.write() {
            let was = state.is_authenticated();
            if was != next.is_authenticated() {
                tracing::info!(authenticated = next.is_authenticated(), "session state changed");
            }
            *state = next;
        }
    }

    /// Record the result of the initial session lookup.
    pub fn resolve(&self, session: Option<Session>, now: DateTime<Utc>) {
        self.set(SessionState::from_session(session, now));
    }

    /// Apply a change published on the session channel.
    pub fn apply(&self, change: &SessionChange, now: DateTime<Utc>) {
        self.set(SessionState::from_session(change.session.clone(), now));
    }

    /// Whether the guard holds a session whose access token has run out at
    /// `now`; such a session can still be renewed by the auth client.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.state() {
            SessionState::Authenticated(session) => validate_session(&session, now).is_err(),
            _ => false,
        }
    }

    /// Decide access for a protected screen at `now`.
    ///
    /// A session found to be expired is dropped here, so the guard never
    /// grants access on a dead token even if no change was published.
    pub fn access(&self, now: DateTime<Utc>) -> Access {
        match self.state() {
            SessionState::Unknown => Access::Loading,
            SessionState::Unauthenticated => Access::RedirectToLogin,
            SessionState::Authenticated(session) => {
                if validate_session(&session, now).is_ok() {
                    Access::Granted
                } else {
                    self.set(SessionState::Unauthenticated);
                    Access::RedirectToLogin
                }
            }
        }
    }

    /// The current session, if authenticated and still valid at `now`.
    pub fn session(&self, now: DateTime<Utc>) -> Option<Session> {
        match self.access(now) {
            Access::Granted => match self.state() {
                SessionState::Authenticated(s) => Some(s),
                _ => None,
            },
            _ => None,
        }
    }

    /// Follow `channel`; the guard stays attached while the returned
    /// subscription is alive.
    pub fn attach(self: &Arc<Self>, channel: &SessionChannel) -> SessionSubscription {
        let guard = Arc::clone(self);
        channel.subscribe(move |change| guard.apply(change, Utc::now()))
    }
}
