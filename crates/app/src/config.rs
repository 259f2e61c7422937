//! Application settings read from the environment.

use std::time::Duration;

use stockdesk_infra::ConfigError;
use stockdesk_observability::LogFormat;

use crate::i18n::Locale;

pub const LOCALE_VAR: &str = "STOCKDESK_LOCALE";
pub const REDIRECT_DELAY_VAR: &str = "STOCKDESK_REDIRECT_DELAY_MS";
pub const RECORD_ADJUSTMENTS_VAR: &str = "STOCKDESK_RECORD_ADJUSTMENTS";
pub const LOG_FORMAT_VAR: &str = "STOCKDESK_LOG_FORMAT";

/// Pause between a successful save and the redirect back to the list.
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub locale: Locale,
    pub redirect_delay: Duration,
    /// Append a transaction for every manual stock adjustment.
    pub record_adjustments: bool,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            record_adjustments: false,
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn recording_adjustments(mut self) -> Self {
        self.record_adjustments = true;
        self
    }

    /// Read settings through `lookup`; unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = Self::default();

        if let Some(raw) = get(LOCALE_VAR) {
            cfg.locale = raw.parse()?;
        }
        if let Some(raw) = get(REDIRECT_DELAY_VAR) {
            let millis = raw
                .parse::<u64>()
                .map_err(|e| ConfigError::invalid(REDIRECT_DELAY_VAR, e.to_string()))?;
            cfg.redirect_delay = Duration::from_millis(millis);
        }
        if let Some(raw) = get(RECORD_ADJUSTMENTS_VAR) {
            cfg.record_adjustments = parse_bool(&raw)
                .ok_or_else(|| ConfigError::invalid(RECORD_ADJUSTMENTS_VAR, format!("not a boolean: '{raw}'")))?;
        }
        if let Some(raw) = get(LOG_FORMAT_VAR) {
            cfg.log_format = raw
                .parse()
                .map_err(|e: stockdesk_observability::LogFormatError| {
                    ConfigError::invalid(LOG_FORMAT_VAR, e.to_string())
                })?;
        }
        Ok(cfg)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
