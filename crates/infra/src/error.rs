//! Errors raised by the data-access and auth clients.

use thiserror::Error;

use crate::config::ConfigError;

pub type ClientResult<T> = Result<T, ClientError>;

/// Failure of a remote operation.
///
/// `Display` is the human-readable message shown to the user after the
/// screen's prefix, so variants render the store's own wording verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The store rejected the request (constraint violation, bad column, ...).
    #[error("{message}")]
    Remote { code: Option<String>, message: String },

    /// A single row was expected but none matched.
    #[error("no rows returned")]
    NotFound,

    /// Missing or rejected credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// The request never got a response (DNS, TLS, connection reset, ...).
    #[error("network error: {0}")]
    Transport(String),

    /// A response could not be decoded into the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    pub fn remote(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::Remote {
            code: None,
            message: message.into(),
        }
    }

    pub fn decode(err: impl core::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }

    /// Store error code, when the store reported one (e.g. `23505`).
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Remote { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(value: serde_json::Error) -> Self {
        Self::decode(value)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::decode(value)
        } else {
            Self::Transport(value.to_string())
        }
    }
}
