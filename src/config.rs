//! Configuration types for bili-audio-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Default desktop browser User-Agent; the CDN rejects requests without one
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0";

/// Default Referer sent with every request
pub const DEFAULT_REFERER: &str = "https://www.bilibili.com/";

/// Download behavior configuration (directory and concurrency)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Download directory (default: "downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Maximum concurrent file transfers (default: 3)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_downloads: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            max_concurrent_downloads: default_max_concurrent(),
        }
    }
}

/// HTTP client settings and endpoint bases
///
/// The endpoint bases exist so the whole client can be pointed at a mirror
/// or a local mock server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Referer header sent with every request
    #[serde(default = "default_referer")]
    pub referer: String,

    /// Whole-request timeout (None = no timeout, default: None)
    ///
    /// Applies to media downloads too, so leave it unset when fetching large files
    /// over slow links.
    #[serde(default, with = "optional_duration_serde")]
    pub timeout: Option<Duration>,

    /// Connect timeout (default: 10 seconds)
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,

    /// Base URL of the main API host (default: "https://api.bilibili.com")
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Base URL of the passport (login) host (default: "https://passport.bilibili.com")
    #[serde(default = "default_passport_base")]
    pub passport_base: String,

    /// Base URL of the main site, used by the audio endpoints (default: "https://www.bilibili.com")
    #[serde(default = "default_www_base")]
    pub www_base: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            referer: default_referer(),
            timeout: None,
            connect_timeout: default_connect_timeout(),
            api_base: default_api_base(),
            passport_base: default_passport_base(),
            www_base: default_www_base(),
        }
    }
}

impl HttpConfig {
    /// Point every endpoint base at the same host (useful for mock servers)
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        let base = base.trim_end_matches('/').to_string();
        self.api_base = base.clone();
        self.passport_base = base.clone();
        self.www_base = base;
        self
    }
}

/// QR-code login polling behavior
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginConfig {
    /// Delay between status polls (default: 3 seconds)
    #[serde(default = "default_poll_interval", with = "duration_serde")]
    pub poll_interval: Duration,

    /// Maximum number of polls before giving up (None = poll until the code expires)
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: Option<u32>,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            max_poll_attempts: default_max_poll_attempts(),
        }
    }
}

/// Main configuration
///
/// Fields are organized into sub-configs:
/// - [`download`](DownloadConfig) - directory and concurrency
/// - [`http`](HttpConfig) - client headers, timeouts and endpoint bases
/// - [`login`](LoginConfig) - QR polling
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Download behavior settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Login polling settings
    #[serde(default)]
    pub login: LoginConfig,
}

impl Config {
    /// Download directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }

    /// Check settings that would otherwise fail later at run time
    pub fn validate(&self) -> Result<()> {
        if self.download.max_concurrent_downloads == 0 {
            return Err(Error::Config {
                message: "max_concurrent_downloads must be greater than zero".to_string(),
                key: Some("max_concurrent_downloads".to_string()),
            });
        }
        if self.download.max_concurrent_downloads > tokio::sync::Semaphore::MAX_PERMITS {
            return Err(Error::Config {
                message: format!(
                    "max_concurrent_downloads must be at most {}",
                    tokio::sync::Semaphore::MAX_PERMITS
                ),
                key: Some("max_concurrent_downloads".to_string()),
            });
        }
        for (key, value) in [
            ("api_base", &self.http.api_base),
            ("passport_base", &self.http.passport_base),
            ("www_base", &self.http.www_base),
        ] {
            if url::Url::parse(value).is_err() {
                return Err(Error::Config {
                    message: format!("{} is not a valid URL: {}", key, value),
                    key: Some(key.to_string()),
                });
            }
        }
        if self.login.max_poll_attempts == Some(0) {
            return Err(Error::Config {
                message: "max_poll_attempts must be greater than zero when set".to_string(),
                key: Some("max_poll_attempts".to_string()),
            });
        }
        Ok(())
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_max_concurrent() -> usize {
    3
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_referer() -> String {
    DEFAULT_REFERER.to_string()
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_api_base() -> String {
    "https://api.bilibili.com".to_string()
}

fn default_passport_base() -> String {
    "https://passport.bilibili.com".to_string()
}

fn default_www_base() -> String {
    "https://www.bilibili.com".to_string()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(3)
}

fn default_max_poll_attempts() -> Option<u32> {
    Some(100)
}

/// Durations as seconds: whole seconds serialize as integers, anything finer
/// as a float. Both forms are accepted when reading.
mod duration_serde {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_nanos() == 0 {
            serializer.serialize_u64(duration.as_secs())
        } else {
            serializer.serialize_f64(duration.as_secs_f64())
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|e| D::Error::custom(format!("invalid duration {}: {}", secs, e)))
    }
}

mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => super::duration_serde::serialize(d, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wrapped(#[serde(with = "super::duration_serde")] Duration);

        Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(d)| d))
    }
}
