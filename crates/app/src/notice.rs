//! Error and success banners shared by the screens.

use std::time::Duration;

use thiserror::Error;

use stockdesk_core::DomainError;
use stockdesk_infra::ClientError;

use crate::i18n::{Locale, Msg};
use crate::routes::Route;

/// What a screen surfaces when an action fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScreenError {
    /// Input rejected before anything was sent.
    #[error("{0}")]
    Validation(String),

    /// The remote call failed; `action` names what was being attempted.
    #[error("{source}")]
    Remote { action: Msg, source: ClientError },
}

impl ScreenError {
    pub fn remote(action: Msg) -> impl FnOnce(ClientError) -> ScreenError {
        move |source| ScreenError::Remote { action, source }
    }

    /// Banner text: the localized action prefix followed by the reason.
    pub fn banner(&self, locale: Locale) -> String {
        match self {
            ScreenError::Validation(message) => message.clone(),
            ScreenError::Remote { action, source } => {
                format!("{}: {}", locale.text(*action), source)
            }
        }
    }
}

impl From<DomainError> for ScreenError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(message) | DomainError::InvariantViolation(message) => {
                ScreenError::Validation(message)
            }
            other => ScreenError::Validation(other.to_string()),
        }
    }
}

/// Navigation scheduled after a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect {
    pub to: Route,
    pub after: Duration,
}

impl Redirect {
    pub fn now(to: Route) -> Self {
        Self {
            to,
            after: Duration::ZERO,
        }
    }

    pub fn after(to: Route, delay: Duration) -> Self {
        Self { to, after: delay }
    }

    /// Wait out the delay, then hand back the destination.
    pub async fn wait(self) -> Route {
        if !self.after.is_zero() {
            tokio::time::sleep(self.after).await;
        }
        self.to
    }
}

/// Loading flag and banners of one screen.
///
/// The loading flag only covers this screen's own pending call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenStatus {
    pub loading: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl ScreenStatus {
    /// Start of a call: set loading and clear both banners.
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
        self.notice = None;
    }

    /// End of a call; failures become the error banner.
    pub fn finish<T>(&mut self, locale: Locale, result: Result<T, ScreenError>) -> Option<T> {
        self.loading = false;
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(error = %err, "screen action failed");
                self.error = Some(err.banner(locale));
                None
            }
        }
    }

    pub fn succeed(&mut self, locale: Locale, msg: Msg) {
        self.notice = Some(locale.text(msg).to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_banner_is_prefix_and_message() {
        let err = ScreenError::remote(Msg::SaveFailed)(ClientError::message(
            "duplicate key value violates unique constraint",
        ));
        assert_eq!(
            err.banner(Locale::Ja),
            "データの保存に失敗しました: duplicate key value violates unique constraint"
        );
        assert_eq!(
            err.banner(Locale::En),
            "Failed to save data: duplicate key value violates unique constraint"
        );
    }

    #[test]
    fn validation_banner_is_the_message() {
        let err: ScreenError = DomainError::validation("product name is required").into();
        assert_eq!(err.banner(Locale::En), "product name is required");
    }

    #[test]
    fn status_tracks_loading_and_banners() {
        let mut status = ScreenStatus::default();
        status.begin();
        assert!(status.loading);

        let out = status.finish::<()>(Locale::En, Err(ScreenError::Validation("nope".into())));
        assert_eq!(out, None);
        assert!(!status.loading);
        assert_eq!(status.error.as_deref(), Some("nope"));

        status.begin();
        assert_eq!(status.error, None);
        assert_eq!(status.finish(Locale::En, Ok(3)), Some(3));
        status.succeed(Locale::En, Msg::ProductSaved);
        assert_eq!(status.notice.as_deref(), Some("Product saved"));
    }

    #[tokio::test]
    async fn immediate_redirect_does_not_sleep() {
        assert_eq!(Redirect::now(Route::Login).wait().await, Route::Login);
    }
}
