//! Explicit application context handed to every screen at construction.

use std::sync::Arc;

use chrono::Utc;

use stockdesk_auth::{Access, Session, SessionChannel, SessionGuard, SessionSubscription};
use stockdesk_infra::{
    AuthClient, ClientConfig, ClientResult, DataClient, InMemoryAuth, InMemoryDataStore,
    RestAuthClient, RestConnection, RestDataClient,
};

use crate::config::AppConfig;
use crate::i18n::Locale;
use crate::routes::{Navigation, Route, navigate};

/// Data client, auth client, session guard and settings.
///
/// Cheap to clone; clones share the same clients and guard. The guard
/// follows the auth client's session channel for as long as any clone is
/// alive.
#[derive(Clone)]
pub struct AppContext {
    data: Arc<dyn DataClient>,
    auth: Arc<dyn AuthClient>,
    guard: Arc<SessionGuard>,
    config: AppConfig,
    _subscription: Arc<SessionSubscription>,
}

impl AppContext {
    pub fn new(data: Arc<dyn DataClient>, auth: Arc<dyn AuthClient>, config: AppConfig) -> Self {
        let guard = Arc::new(SessionGuard::new());
        let subscription = guard.attach(auth.channel());
        Self {
            data,
            auth,
            guard,
            config,
            _subscription: Arc::new(subscription),
        }
    }

    /// Context backed by the remote store.
    pub fn connect(client: &ClientConfig, config: AppConfig) -> Self {
        let conn = RestConnection::new(client);
        let data = Arc::new(RestDataClient::new(conn.clone()));
        let auth = Arc::new(RestAuthClient::new(conn, SessionChannel::new()));
        Self::new(data, auth, config)
    }

    /// Context backed by in-memory doubles; the store and auth service are
    /// returned for seeding and inspection.
    pub fn in_memory(
        config: AppConfig,
        auth: InMemoryAuth,
    ) -> (Self, Arc<InMemoryDataStore>, Arc<InMemoryAuth>) {
        let store = Arc::new(InMemoryDataStore::new());
        let auth = Arc::new(auth);
        let ctx = Self::new(store.clone(), auth.clone(), config);
        (ctx, store, auth)
    }

    /// Resolve the initial session; until this completes every protected
    /// route shows the loading placeholder.
    pub async fn start(&self) {
        self.lookup_session().await;
    }

    /// Ask the auth client for the current session, which renews an expired
    /// access token when a refresh token is held.
    async fn lookup_session(&self) {
        let session = match self.auth.current_session().await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = %err, "session lookup failed");
                None
            }
        };
        self.guard.resolve(session, Utc::now());
    }

    pub async fn sign_out(&self) -> ClientResult<()> {
        self.auth.sign_out().await
    }

    pub fn data(&self) -> &dyn DataClient {
        self.data.as_ref()
    }

    pub fn auth(&self) -> &dyn AuthClient {
        self.auth.as_ref()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn locale(&self) -> Locale {
        self.config.locale
    }

    /// Access decision for protected screens. An expired session is renewed
    /// through the auth client before falling back to the login screen.
    pub async fn access(&self) -> Access {
        if self.guard.is_expired(Utc::now()) {
            tracing::debug!("session expired, renewing");
            self.lookup_session().await;
        }
        self.guard.access(Utc::now())
    }

    pub async fn session(&self) -> Option<Session> {
        match self.access().await {
            Access::Granted => self.guard.session(Utc::now()),
            _ => None,
        }
    }

    /// Where a request for `route` ends up given the current session.
    pub async fn navigate(&self, route: Route) -> Navigation {
        navigate(route, self.access().await)
    }
}

impl core::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppContext")
            .field("guard", &self.guard)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
