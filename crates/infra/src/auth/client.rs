use async_trait::async_trait;

use stockdesk_auth::{Credentials, Session, SessionChange, SessionChannel, SessionSubscription};

use crate::error::ClientResult;

/// Listener registered through [`AuthClient::on_session_change`].
pub type SessionListener = Box<dyn Fn(&SessionChange) + Send + Sync>;

/// Sign-in, sign-up and session lookup against the auth service.
///
/// Every change of the current session is published once on
/// [`AuthClient::channel`].
#[async_trait]
pub trait AuthClient: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> ClientResult<Session>;

    /// Register a new account. Returns `None` when the service requires the
    /// address to be confirmed before the first sign-in.
    async fn sign_up(&self, credentials: &Credentials) -> ClientResult<Option<Session>>;

    async fn sign_out(&self) -> ClientResult<()>;

    /// The current session, renewed first if it has expired and can be.
    async fn current_session(&self) -> ClientResult<Option<Session>>;

    fn channel(&self) -> &SessionChannel;

    fn on_session_change(&self, listener: SessionListener) -> SessionSubscription {
        self.channel().subscribe(listener)
    }
}
