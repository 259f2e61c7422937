use stockdesk_auth::Registration;

use crate::context::AppContext;
use crate::i18n::Msg;
use crate::notice::{Redirect, ScreenError, ScreenStatus};
use crate::routes::Route;

#[derive(Debug)]
pub struct RegisterScreen {
    ctx: AppContext,
    pub status: ScreenStatus,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterScreen {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            status: ScreenStatus::default(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
        }
    }

    /// Check the confirmation locally, then create the account. The user is
    /// sent to the login screen to sign in once the email is confirmed.
    pub async fn submit(&mut self) -> Option<Redirect> {
        let locale = self.ctx.locale();
        self.status.begin();
        let result = if self.password != self.confirm_password {
            Err(ScreenError::Validation(locale.text(Msg::PasswordMismatch).to_string()))
        } else {
            self.sign_up().await
        };
        self.status.finish(locale, result)?;

        self.status.succeed(locale, Msg::RegisterComplete);
        Some(Redirect::after(Route::Login, self.ctx.config().redirect_delay))
    }

    async fn sign_up(&self) -> Result<(), ScreenError> {
        let credentials = Registration::new(
            self.email.clone(),
            self.password.clone(),
            self.confirm_password.clone(),
        )
        .validated()?;
        self.ctx
            .auth()
            .sign_up(&credentials)
            .await
            .map(|_| ())
            .map_err(ScreenError::remote(Msg::RegisterFailed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::i18n::Locale;
    use stockdesk_auth::{Access, Credentials};
    use stockdesk_infra::{AuthClient, InMemoryAuth};

    #[tokio::test]
    async fn mismatch_is_caught_before_sign_up() {
        let (ctx, _store, _auth) =
            AppContext::in_memory(AppConfig::default().with_locale(Locale::Ja), InMemoryAuth::default());
        let mut screen = RegisterScreen::new(ctx);
        screen.email = "new@example.com".into();
        screen.password = "secret1".into();
        screen.confirm_password = "secret2".into();

        assert_eq!(screen.submit().await, None);
        assert_eq!(screen.status.error.as_deref(), Some("パスワードが一致しません"));
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let (ctx, _store, _auth) = AppContext::in_memory(AppConfig::default(), InMemoryAuth::default());
        let mut screen = RegisterScreen::new(ctx);
        screen.email = "new@example.com".into();
        screen.password = "abc".into();
        screen.confirm_password = "abc".into();

        assert_eq!(screen.submit().await, None);
        assert_eq!(
            screen.status.error.as_deref(),
            Some("password must be at least 6 characters")
        );
    }

    #[tokio::test]
    async fn success_points_to_login_without_a_session() {
        let (ctx, _store, auth) = AppContext::in_memory(AppConfig::default(), InMemoryAuth::default());
        ctx.start().await;
        let mut screen = RegisterScreen::new(ctx.clone());
        screen.email = "new@example.com".into();
        screen.password = "secret1".into();
        screen.confirm_password = "secret1".into();

        let redirect = screen.submit().await.unwrap();
        assert_eq!(redirect.to, Route::Login);
        assert_eq!(
            screen.status.notice.as_deref(),
            Some("Registration complete. Check your email to activate your account.")
        );
        assert_eq!(ctx.access().await, Access::RedirectToLogin);

        assert!(auth.confirm_email("new@example.com"));
        auth.sign_in(&Credentials::new("new@example.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(ctx.access().await, Access::Granted);
    }

    #[tokio::test]
    async fn duplicate_account_shows_service_message() {
        let (ctx, _store, _auth) = AppContext::in_memory(
            AppConfig::default(),
            InMemoryAuth::default().with_account("taken@example.com", "secret1"),
        );
        let mut screen = RegisterScreen::new(ctx);
        screen.email = "taken@example.com".into();
        screen.password = "secret1".into();
        screen.confirm_password = "secret1".into();

        assert_eq!(screen.submit().await, None);
        assert_eq!(
            screen.status.error.as_deref(),
            Some("Registration failed: User already registered")
        );
    }
}
