use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use stockdesk_auth::{
    AuthEvent, AuthUser, Credentials, Session, SessionChange, SessionChannel, validate_session,
};

use super::client::AuthClient;
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone)]
struct Account {
    id: Uuid,
    password: String,
    confirmed: bool,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<String, Account>,
    session: Option<Session>,
}

/// In-memory auth service.
///
/// Accounts registered through [`AuthClient::sign_up`] must be confirmed
/// (see [`InMemoryAuth::confirm_email`]) before they can sign in, unless the
/// service was built with [`InMemoryAuth::auto_confirm`].
///
/// Intended for tests/dev.
#[derive(Debug)]
pub struct InMemoryAuth {
    state: Mutex<State>,
    channel: SessionChannel,
    session_ttl: Duration,
    auto_confirm: bool,
}

impl Default for InMemoryAuth {
    fn default() -> Self {
        Self::new(SessionChannel::new())
    }
}

impl InMemoryAuth {
    pub fn new(channel: SessionChannel) -> Self {
        Self {
            state: Mutex::new(State::default()),
            channel,
            session_ttl: Duration::hours(1),
            auto_confirm: false,
        }
    }

    /// Sign-up signs the new account in straight away.
    pub fn auto_confirm(mut self) -> Self {
        self.auto_confirm = true;
        self
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Create a confirmed account.
    pub fn with_account(self, email: &str, password: &str) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.accounts.insert(
                email.to_lowercase(),
                Account {
                    id: Uuid::now_v7(),
                    password: password.to_string(),
                    confirmed: true,
                },
            );
        }
        self
    }

    /// Mark an address as confirmed, as following the emailed link would.
    pub fn confirm_email(&self, email: &str) -> bool {
        self.state
            .lock()
            .ok()
            .and_then(|mut state| {
                state
                    .accounts
                    .get_mut(&email.to_lowercase())
                    .map(|account| account.confirmed = true)
            })
            .is_some()
    }

    fn lock(&self) -> ClientResult<std::sync::MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| ClientError::message("auth state lock poisoned"))
    }

    fn issue(&self, id: Uuid, email: &str, now: DateTime<Utc>) -> Session {
        Session {
            access_token: format!("access-{}", Uuid::now_v7()),
            refresh_token: Some(format!("refresh-{}", Uuid::now_v7())),
            expires_at: now + self.session_ttl,
            user: AuthUser {
                id,
                email: email.to_string(),
            },
        }
    }

    /// Store `session` and publish the change after the lock is released.
    fn replace_session(&self, session: Option<Session>, event: AuthEvent) -> ClientResult<()> {
        self.lock()?.session = session.clone();
        self.channel.publish(&SessionChange::new(event, session));
        Ok(())
    }
}

fn invalid_credentials() -> ClientError {
    ClientError::remote("invalid_credentials", "Invalid login credentials")
}

#[async_trait]
impl AuthClient for InMemoryAuth {
    async fn sign_in(&self, credentials: &Credentials) -> ClientResult<Session> {
        let email = credentials.email.trim().to_lowercase();
        let account = self
            .lock()?
            .accounts
            .get(&email)
            .cloned()
            .ok_or_else(invalid_credentials)?;

        if account.password != credentials.password {
            return Err(invalid_credentials());
        }
        if !account.confirmed {
            return Err(ClientError::remote("email_not_confirmed", "Email not confirmed"));
        }

        let session = self.issue(account.id, &email, Utc::now());
        self.replace_session(Some(session.clone()), AuthEvent::SignedIn)?;
        tracing::info!(user = %account.id, "signed in");
        Ok(session)
    }

    async fn sign_up(&self, credentials: &Credentials) -> ClientResult<Option<Session>> {
        let email = credentials.email.trim().to_lowercase();
        let id = Uuid::now_v7();
        {
            let mut state = self.lock()?;
            if state.accounts.contains_key(&email) {
                return Err(ClientError::remote("user_already_exists", "User already registered"));
            }
            state.accounts.insert(
                email.clone(),
                Account {
                    id,
                    password: credentials.password.clone(),
                    confirmed: self.auto_confirm,
                },
            );
        }
        tracing::info!(user = %id, "account registered");

        if !self.auto_confirm {
            return Ok(None);
        }
        let session = self.issue(id, &email, Utc::now());
        self.replace_session(Some(session.clone()), AuthEvent::SignedIn)?;
        Ok(Some(session))
    }

    async fn sign_out(&self) -> ClientResult<()> {
        self.replace_session(None, AuthEvent::SignedOut)
    }

    async fn current_session(&self) -> ClientResult<Option<Session>> {
        let now = Utc::now();
        let current = self.lock()?.session.clone();
        match current {
            Some(session) if validate_session(&session, now).is_ok() => Ok(Some(session)),
            Some(expired) => {
                // Renew with the refresh token, as the remote service would.
                let renewed = self.issue(expired.user.id, &expired.user.email, now);
                self.replace_session(Some(renewed.clone()), AuthEvent::TokenRefreshed)?;
                Ok(Some(renewed))
            }
            None => Ok(None),
        }
    }

    fn channel(&self) -> &SessionChannel {
        &self.channel
    }
}
