use stockdesk_auth::Credentials;

use crate::context::AppContext;
use crate::i18n::Msg;
use crate::notice::{ScreenError, ScreenStatus};
use crate::routes::Route;

#[derive(Debug)]
pub struct LoginScreen {
    ctx: AppContext,
    pub status: ScreenStatus,
    pub email: String,
    pub password: String,
}

impl LoginScreen {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            status: ScreenStatus::default(),
            email: String::new(),
            password: String::new(),
        }
    }

    /// Sign in; the session guard learns about the new session from the
    /// session channel. Returns the dashboard route on success.
    pub async fn submit(&mut self) -> Option<Route> {
        let locale = self.ctx.locale();
        self.status.begin();
        let result = self.sign_in().await;
        self.status.finish(locale, result)?;
        Some(Route::Dashboard)
    }

    async fn sign_in(&self) -> Result<(), ScreenError> {
        let credentials = Credentials::new(self.email.clone(), self.password.clone()).validated()?;
        self.ctx
            .auth()
            .sign_in(&credentials)
            .await
            .map(|_| ())
            .map_err(ScreenError::remote(Msg::LoginFailed))
    }
}
