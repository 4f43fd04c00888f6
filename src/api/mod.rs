//! Client for the platform's web API
//!
//! [`ApiClient`] owns the HTTP client, attaches the session cookies of a
//! [`Credential`] and unwraps the `{code, message, data}` response envelope.
//! The endpoint wrappers live in the submodules:
//!
//! - [`login`] - QR-code login producing a [`Credential`]
//! - [`video`] - video info and play-url lookup
//! - [`favorite`] - favorite-list folders and their contents
//! - [`audio`] - standalone audio (AU number) info and download URL

use crate::config::{Config, HttpConfig};
use crate::credential::Credential;
use crate::error::{Error, Result};
use reqwest::header::{COOKIE, HeaderMap, HeaderValue, REFERER, USER_AGENT};
use serde_json::Value;
use std::sync::Arc;

pub mod audio;
pub mod favorite;
pub mod login;
pub mod video;

pub use audio::{Audio, AudioDownloadUrl, AudioInfo};
pub use favorite::{FavoriteFolder, FavoriteItem, FavoriteList, FavoriteListContentOrder, FavoritePage};
pub use login::{QrCode, QrCodeLogin, QrPollResult, QrPollStatus};
pub use video::{Video, VideoInfo, VideoPage};

/// Build a reqwest client carrying the configured User-Agent, Referer and timeouts
///
/// Shared by the API layer and the file downloader; the CDN rejects requests
/// without these headers.
pub(crate) fn build_http_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&config.user_agent).map_err(|e| Error::Config {
            message: format!("invalid user_agent: {}", e),
            key: Some("user_agent".to_string()),
        })?,
    );
    headers.insert(
        REFERER,
        HeaderValue::from_str(&config.referer).map_err(|e| Error::Config {
            message: format!("invalid referer: {}", e),
            key: Some("referer".to_string()),
        })?,
    );

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(config.connect_timeout);
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    builder.build().map_err(|e| Error::Config {
        message: format!("failed to create HTTP client: {}", e),
        key: None,
    })
}

/// Authenticated JSON client for the platform's endpoints
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    credential: Arc<Credential>,
    config: Arc<HttpConfig>,
}

impl ApiClient {
    /// Create a client from HTTP settings and a credential
    pub fn new(config: &HttpConfig, credential: Credential) -> Result<Self> {
        Ok(Self {
            http: build_http_client(config)?,
            credential: Arc::new(credential),
            config: Arc::new(config.clone()),
        })
    }

    /// Create a client from the full configuration
    pub fn from_config(config: &Config, credential: Credential) -> Result<Self> {
        Self::new(&config.http, credential)
    }

    /// Create a client without session cookies
    pub fn anonymous(config: &HttpConfig) -> Result<Self> {
        Self::new(config, Credential::anonymous())
    }

    /// Same connection pool and settings, different credential
    pub fn with_credential(&self, credential: Credential) -> Self {
        Self {
            http: self.http.clone(),
            credential: Arc::new(credential),
            config: self.config.clone(),
        }
    }

    /// The credential attached to every request
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// HTTP settings this client was built from
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// The underlying reqwest client (default headers included, no cookies)
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Absolute URL on the main API host
    pub fn api_url(&self, path: &str) -> String {
        join_url(&self.config.api_base, path)
    }

    /// Absolute URL on the passport host
    pub fn passport_url(&self, path: &str) -> String {
        join_url(&self.config.passport_base, path)
    }

    /// Absolute URL on the main site host
    pub fn www_url(&self, path: &str) -> String {
        join_url(&self.config.www_base, path)
    }

    /// GET `url` with query parameters and return the checked JSON envelope
    pub async fn get_json(&self, url: &str, params: &[(&str, String)]) -> Result<Value> {
        tracing::debug!(url = %url, params = params.len(), "GET");
        let request = self.http.get(url).query(params);
        self.send(request, url).await
    }

    /// POST `params` as a form to `url` and return the checked JSON envelope
    pub async fn post_form(&self, url: &str, params: &[(&str, String)]) -> Result<Value> {
        tracing::debug!(url = %url, params = params.len(), "POST");
        let request = self.http.post(url).form(params);
        self.send(request, url).await
    }

    async fn send(&self, mut request: reqwest::RequestBuilder, url: &str) -> Result<Value> {
        if let Some(cookie) = self.credential.cookie_header() {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let document: Value = response.json().await?;
        check_envelope(&document)?;
        Ok(document)
    }
}

/// Reject envelopes whose `code` is present and non-zero
pub(crate) fn check_envelope(document: &Value) -> Result<()> {
    match document.get("code").and_then(Value::as_i64) {
        Some(0) | None => Ok(()),
        Some(code) => {
            let message = document
                .get("message")
                .or_else(|| document.get("msg"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            tracing::debug!(code, message = %message, "API returned an error envelope");
            Err(Error::Api { code, message })
        }
    }
}

/// The `data` object of an envelope, or the document itself when it has none
pub(crate) fn data_of(document: &Value) -> &Value {
    document
        .get("data")
        .filter(|d| !d.is_null())
        .unwrap_or(document)
}

/// Required string field
pub(crate) fn require_str<'a>(value: &'a Value, key: &str, context: &str) -> Result<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Parse(format!("{} response is missing `{}`", context, key)))
}

/// Required integer field
pub(crate) fn require_i64(value: &Value, key: &str, context: &str) -> Result<i64> {
    value
        .get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::Parse(format!("{} response is missing `{}`", context, key)))
}

/// Optional string field, empty when absent
pub(crate) fn str_or_empty(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
