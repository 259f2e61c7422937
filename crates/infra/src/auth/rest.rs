use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

use stockdesk_auth::{
    AuthEvent, AuthUser, Credentials, Session, SessionChange, SessionChannel, validate_session,
};

use super::client::AuthClient;
use crate::error::{ClientError, ClientResult};
use crate::rest::{RestConnection, send, send_json};

const TOKEN_PATH: &str = "auth/v1/token";
const SIGNUP_PATH: &str = "auth/v1/signup";
const LOGOUT_PATH: &str = "auth/v1/logout";

/// Session lifetime assumed when the service reports neither expiry field.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Token grant returned by the auth service.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(|| {
                now + Duration::seconds(self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS))
            });
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Sign-up answers with a token grant when confirmation is disabled, and
/// with the bare user otherwise.
fn session_from_signup(body: JsonValue, now: DateTime<Utc>) -> ClientResult<Option<Session>> {
    if body.get("access_token").is_some() {
        let grant: TokenResponse = serde_json::from_value(body)?;
        Ok(Some(grant.into_session(now)))
    } else {
        Ok(None)
    }
}

/// GoTrue-compatible auth client.
pub struct RestAuthClient {
    conn: RestConnection,
    session: Mutex<Option<Session>>,
    channel: SessionChannel,
}

impl RestAuthClient {
    pub fn new(conn: RestConnection, channel: SessionChannel) -> Self {
        Self {
            conn,
            session: Mutex::new(None),
            channel,
        }
    }

    fn stored(&self) -> Option<Session> {
        self.session.lock().ok().and_then(|s| s.clone())
    }

    fn replace_session(&self, session: Option<Session>, event: AuthEvent) {
        self.conn
            .set_access_token(session.as_ref().map(|s| s.access_token.clone()));
        if let Ok(mut current) = self.session.lock() {
            *current = session.clone();
        }
        self.channel.publish(&SessionChange::new(event, session));
    }

    async fn grant(&self, grant_type: &str, body: JsonValue) -> ClientResult<Session> {
        let req = self
            .conn
            .post(TOKEN_PATH)
            .query(&[("grant_type", grant_type)])
            .json(&body);
        let grant: TokenResponse = send_json(req).await?;
        Ok(grant.into_session(Utc::now()))
    }
}

impl core::fmt::Debug for RestAuthClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RestAuthClient")
            .field("conn", &self.conn)
            .field("session", &self.stored())
            .finish()
    }
}

#[async_trait]
impl AuthClient for RestAuthClient {
    async fn sign_in(&self, credentials: &Credentials) -> ClientResult<Session> {
        let session = self
            .grant(
                "password",
                json!({ "email": credentials.email, "password": credentials.password }),
            )
            .await?;
        tracing::info!(user = %session.user.id, "signed in");
        self.replace_session(Some(session.clone()), AuthEvent::SignedIn);
        Ok(session)
    }

    async fn sign_up(&self, credentials: &Credentials) -> ClientResult<Option<Session>> {
        let req = self
            .conn
            .post(SIGNUP_PATH)
            .json(&json!({ "email": credentials.email, "password": credentials.password }));
        let body: JsonValue = send_json(req).await?;
        let session = session_from_signup(body, Utc::now())?;
        if let Some(session) = &session {
            self.replace_session(Some(session.clone()), AuthEvent::SignedIn);
        }
        Ok(session)
    }

    async fn sign_out(&self) -> ClientResult<()> {
        if self.stored().is_some() {
            // The local session is dropped even if the service call fails.
            if let Err(err) = send(self.conn.post(LOGOUT_PATH)).await {
                tracing::warn!(error = %err, "sign-out request failed");
            }
        }
        self.replace_session(None, AuthEvent::SignedOut);
        Ok(())
    }

    async fn current_session(&self) -> ClientResult<Option<Session>> {
        let Some(session) = self.stored() else {
            return Ok(None);
        };
        if validate_session(&session, Utc::now()).is_ok() {
            return Ok(Some(session));
        }

        let Some(refresh_token) = session.refresh_token.clone() else {
            self.replace_session(None, AuthEvent::Expired);
            return Ok(None);
        };
        match self
            .grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
        {
            Ok(renewed) => {
                self.replace_session(Some(renewed.clone()), AuthEvent::TokenRefreshed);
                Ok(Some(renewed))
            }
            Err(ClientError::Transport(msg)) => Err(ClientError::Transport(msg)),
            Err(err) => {
                tracing::info!(error = %err, "session refresh rejected");
                self.replace_session(None, AuthEvent::Expired);
                Ok(None)
            }
        }
    }

    fn channel(&self) -> &SessionChannel {
        &self.channel
    }
}
