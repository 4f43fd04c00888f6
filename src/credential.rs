//! Session credential passed through to authenticated API calls

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Login session tokens
///
/// The library never interprets these values; it only checks for presence and
/// forwards them as cookies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// `SESSDATA` cookie
    #[serde(default)]
    pub sessdata: String,
    /// `bili_jct` cookie (CSRF token)
    #[serde(default)]
    pub bili_jct: String,
    /// `DedeUserID` cookie (user id)
    #[serde(default)]
    pub dedeuserid: String,
    /// Refresh token returned by the QR login
    #[serde(default)]
    pub ac_time_value: String,
    /// `buvid3` device cookie
    #[serde(default)]
    pub buvid3: String,
}

impl Credential {
    /// Anonymous credential (no cookies)
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Whether `SESSDATA` is present
    pub fn has_sessdata(&self) -> bool {
        !self.sessdata.is_empty()
    }

    /// Whether `bili_jct` is present
    pub fn has_bili_jct(&self) -> bool {
        !self.bili_jct.is_empty()
    }

    /// Whether `DedeUserID` is present
    pub fn has_dedeuserid(&self) -> bool {
        !self.dedeuserid.is_empty()
    }

    /// Fail unless `SESSDATA` is present
    pub fn require_sessdata(&self) -> Result<()> {
        if self.has_sessdata() {
            Ok(())
        } else {
            Err(Error::InvalidInput("credential is missing SESSDATA".to_string()))
        }
    }

    /// Fail unless `bili_jct` is present
    pub fn require_bili_jct(&self) -> Result<()> {
        if self.has_bili_jct() {
            Ok(())
        } else {
            Err(Error::InvalidInput("credential is missing bili_jct".to_string()))
        }
    }

    /// Fail unless `DedeUserID` is present
    pub fn require_dedeuserid(&self) -> Result<()> {
        if self.has_dedeuserid() {
            Ok(())
        } else {
            Err(Error::InvalidInput(
                "credential is missing DedeUserID".to_string(),
            ))
        }
    }

    /// Render the non-empty tokens as a `Cookie` header value
    ///
    /// Returns `None` for an anonymous credential.
    pub fn cookie_header(&self) -> Option<String> {
        let pairs: Vec<String> = [
            ("SESSDATA", &self.sessdata),
            ("bili_jct", &self.bili_jct),
            ("DedeUserID", &self.dedeuserid),
            ("buvid3", &self.buvid3),
        ]
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();

        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }
}
