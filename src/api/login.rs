//! QR-code login
//!
//! The web login flow is: request a QR code (a link plus a `qrcode_key`), let
//! the user scan it with the mobile app, then poll the key until the scan is
//! confirmed. The confirmed poll carries a URL whose query string holds the
//! session cookies.

use super::{ApiClient, data_of, require_str, str_or_empty};
use crate::config::LoginConfig;
use crate::credential::Credential;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const GENERATE_PATH: &str = "/x/passport-login/web/qrcode/generate";
const POLL_PATH: &str = "/x/passport-login/web/qrcode/poll";

const CODE_SUCCESS: i64 = 0;
const CODE_NOT_SCANNED: i64 = 86101;
const CODE_NOT_CONFIRMED: i64 = 86090;
const CODE_EXPIRED: i64 = 86038;

/// A generated login QR code
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrCode {
    /// Link to encode as the QR image
    pub url: String,
    /// Key used to poll the login status
    pub qrcode_key: String,
}

/// Status of a pending QR login
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QrPollStatus {
    /// Not scanned yet
    NotScanned,
    /// Scanned, waiting for confirmation in the app
    ScannedNotConfirmed,
    /// The code expired; a new one must be generated
    Expired,
    /// Login confirmed
    Success,
}

/// Outcome of one status poll
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrPollResult {
    /// Poll status
    pub status: QrPollStatus,
    /// Message returned by the platform
    pub message: String,
    /// Session credential, present only on success
    pub credential: Option<Credential>,
}

/// QR-code login session
pub struct QrCodeLogin {
    client: ApiClient,
    poll_interval: Duration,
    max_poll_attempts: Option<u32>,
    qrcode: Option<QrCode>,
}

impl QrCodeLogin {
    /// Create a login session using the polling settings from `config`
    pub fn new(client: ApiClient, config: &LoginConfig) -> Self {
        Self {
            client,
            poll_interval: config.poll_interval,
            max_poll_attempts: config.max_poll_attempts,
            qrcode: None,
        }
    }

    /// Poll until the code expires instead of stopping after a fixed number of attempts
    pub fn wait_forever(mut self) -> Self {
        self.max_poll_attempts = None;
        self
    }

    /// The most recently generated QR code
    pub fn qrcode(&self) -> Option<&QrCode> {
        self.qrcode.as_ref()
    }

    /// Request a new QR code, replacing any previous one
    pub async fn generate(&mut self) -> Result<QrCode> {
        let url = self.client.passport_url(GENERATE_PATH);
        let document = self.client.get_json(&url, &[]).await?;
        let data = data_of(&document);

        let qrcode = QrCode {
            url: require_str(data, "url", "QR generate")?.to_string(),
            qrcode_key: require_str(data, "qrcode_key", "QR generate")?.to_string(),
        };
        tracing::debug!(qrcode_key = %qrcode.qrcode_key, "generated login QR code");

        self.qrcode = Some(qrcode.clone());
        Ok(qrcode)
    }

    /// Check the login status of the current QR code once
    pub async fn poll(&self) -> Result<QrPollResult> {
        let qrcode = self.qrcode.as_ref().ok_or_else(|| {
            Error::InvalidInput("no QR code generated; call generate() first".to_string())
        })?;

        let url = self.client.passport_url(POLL_PATH);
        let document = self
            .client
            .get_json(&url, &[("qrcode_key", qrcode.qrcode_key.clone())])
            .await?;

        parse_poll(data_of(&document))
    }

    /// Poll until the login is confirmed
    ///
    /// Sleeps `poll_interval` before each poll. Fails when the code expires or
    /// when `max_poll_attempts` polls pass without confirmation.
    pub async fn login(&mut self) -> Result<Credential> {
        if self.qrcode.is_none() {
            self.generate().await?;
        }

        let mut attempt: u32 = 0;
        let mut scanned = false;
        loop {
            if let Some(max) = self.max_poll_attempts
                && attempt >= max
            {
                return Err(Error::Login(format!(
                    "login not confirmed after {} polls",
                    max
                )));
            }

            tokio::time::sleep(self.poll_interval).await;
            attempt += 1;

            let result = self.poll().await?;
            match result.status {
                QrPollStatus::NotScanned => {
                    tracing::debug!(attempt, "waiting for QR code scan");
                }
                QrPollStatus::ScannedNotConfirmed => {
                    if !scanned {
                        tracing::info!("QR code scanned, waiting for confirmation");
                        scanned = true;
                    }
                }
                QrPollStatus::Expired => {
                    return Err(Error::Login("QR code expired".to_string()));
                }
                QrPollStatus::Success => {
                    let credential = result.credential.ok_or_else(|| {
                        Error::Login("login succeeded without a credential".to_string())
                    })?;
                    tracing::info!(uid = %credential.dedeuserid, "QR login succeeded");
                    return Ok(credential);
                }
            }
        }
    }
}

fn parse_poll(data: &Value) -> Result<QrPollResult> {
    let code = data
        .get("code")
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::Parse("QR poll response is missing `code`".to_string()))?;
    let message = str_or_empty(data, "message");

    tracing::debug!(code, message = %message, "QR poll response");

    let status = match code {
        CODE_SUCCESS => QrPollStatus::Success,
        CODE_NOT_SCANNED => QrPollStatus::NotScanned,
        CODE_NOT_CONFIRMED => QrPollStatus::ScannedNotConfirmed,
        CODE_EXPIRED => QrPollStatus::Expired,
        _ => return Err(Error::Api { code, message }),
    };

    let credential = if status == QrPollStatus::Success {
        let url = require_str(data, "url", "QR poll")?;
        let refresh_token = str_or_empty(data, "refresh_token");
        Some(parse_credential(url, &refresh_token)?)
    } else {
        None
    };

    Ok(QrPollResult {
        status,
        message,
        credential,
    })
}

/// Extract session cookies from the query string of a confirmed-login URL
///
/// Cookie values are kept exactly as they appear in the URL (still
/// percent-encoded), which is the form the platform expects them back in.
pub fn parse_credential(url: &str, refresh_token: &str) -> Result<Credential> {
    let (_, query) = url
        .split_once('?')
        .ok_or_else(|| Error::Login(format!("credential URL has no query string: {}", url)))?;

    let mut credential = Credential {
        ac_time_value: refresh_token.to_string(),
        ..Default::default()
    };
    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        match key {
            "SESSDATA" => credential.sessdata = value.to_string(),
            "bili_jct" => credential.bili_jct = value.to_string(),
            "DedeUserID" => credential.dedeuserid = value.to_string(),
            _ => {}
        }
    }

    if !credential.has_sessdata() {
        return Err(Error::Login(
            "credential URL does not contain SESSDATA".to_string(),
        ));
    }
    Ok(credential)
}
