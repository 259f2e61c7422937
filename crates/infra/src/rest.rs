//! Shared HTTP plumbing for the REST data and auth clients.

use std::sync::{Arc, RwLock};

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Base URL, project key and the current access token, shared by the data
/// and auth clients so that signing in authorizes subsequent table calls.
#[derive(Clone)]
pub struct RestConnection {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: Arc<RwLock<Option<String>>>,
}

impl RestConnection {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            access_token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn set_access_token(&self, token: Option<String>) {
        if let Ok(mut current) = self.access_token.write() {
            *current = token;
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.access_token.read().ok().and_then(|t| t.clone())
    }

    /// Attach the project key and the bearer token (the key itself when
    /// nobody is signed in).
    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token().unwrap_or_else(|| self.anon_key.clone());
        req.header("apikey", &self.anon_key).bearer_auth(bearer)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.get(self.url(path)))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.post(self.url(path)))
    }

    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.patch(self.url(path)))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.delete(self.url(path)))
    }
}

impl core::fmt::Debug for RestConnection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RestConnection")
            .field("base_url", &self.base_url)
            .field("signed_in", &self.access_token().is_some())
            .finish_non_exhaustive()
    }
}

/// Send `req` and decode a successful JSON body.
pub async fn send_json<T>(req: RequestBuilder) -> ClientResult<T>
where
    T: DeserializeOwned,
{
    let resp = send(req).await?;
    Ok(resp.json::<T>().await?)
}

/// Send `req`, turning non-success statuses into [`ClientError`]s.
pub async fn send(req: RequestBuilder) -> ClientResult<Response> {
    let resp = req.send().await?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let err = error_from_body(status, &body);
    tracing::warn!(status = status.as_u16(), error = %err, "remote call failed");
    Err(err)
}

/// Map an error response to a [`ClientError`].
///
/// Table errors carry `{code, message}`; auth errors use `msg`,
/// `error_description` or `error`.
pub fn error_from_body(status: StatusCode, body: &str) -> ClientError {
    let json: JsonValue = serde_json::from_str(body).unwrap_or(JsonValue::Null);
    let text = |key: &str| json.get(key).and_then(JsonValue::as_str).map(str::to_string);

    let message = text("message")
        .or_else(|| text("msg"))
        .or_else(|| text("error_description"))
        .or_else(|| text("error"))
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                body.trim().to_string()
            }
        });
    let code = text("code")
        .or_else(|| json.get("code").and_then(JsonValue::as_u64).map(|c| c.to_string()))
        .or_else(|| text("error_code"));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN if code.is_none() => {
            ClientError::Unauthorized(message)
        }
        _ => ClientError::Remote { code, message },
    }
}
