use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The signed-in user as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Credential bundle identifying the current user.
///
/// Obtained and renewed by the data-access client's auth API; the rest of the
/// client only reads it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

// Tokens stay out of logs.
impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionValidationError {
    #[error("session has expired")]
    Expired,

    #[error("session has no access token")]
    MissingToken,
}

/// Deterministically validate a session at `now`.
///
/// Token signatures are the auth service's concern; this only checks that the
/// session is usable.
pub fn validate_session(session: &Session, now: DateTime<Utc>) -> Result<(), SessionValidationError> {
    if session.access_token.trim().is_empty() {
        return Err(SessionValidationError::MissingToken);
    }
    if session.is_expired(now) {
        return Err(SessionValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;

    pub(crate) fn session_expiring_at(expires_at: DateTime<Utc>) -> Session {
        Session {
            access_token: "token".to_string(),
            refresh_token: None,
            expires_at,
            user: AuthUser {
                id: Uuid::nil(),
                email: "clerk@example.com".to_string(),
            },
        }
    }

    #[test]
    fn live_session_is_valid() {
        let now = Utc::now();
        let s = session_expiring_at(now + Duration::minutes(30));
        assert_eq!(validate_session(&s, now), Ok(()));
    }

    #[test]
    fn expiry_instant_counts_as_expired() {
        let now = Utc::now();
        let s = session_expiring_at(now);
        assert_eq!(validate_session(&s, now), Err(SessionValidationError::Expired));
    }

    #[test]
    fn blank_token_is_rejected() {
        let now = Utc::now();
        let mut s = session_expiring_at(now + Duration::minutes(5));
        s.access_token = " ".to_string();
        assert_eq!(validate_session(&s, now), Err(SessionValidationError::MissingToken));
    }

    #[test]
    fn debug_output_hides_tokens() {
        let s = session_expiring_at(Utc::now());
        let rendered = format!("{s:?}");
        assert!(!rendered.contains("token\""));
        assert!(rendered.contains("clerk@example.com"));
    }
}
