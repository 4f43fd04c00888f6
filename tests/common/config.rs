//! Test configuration helpers for loading .env credentials and pointing configs at mock servers

use bili_audio_dl::Config;
use bili_audio_dl::Credential;
use tempfile::TempDir;

/// Error type for test configuration
#[derive(Debug)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Config whose endpoints all point at `base` and which downloads into the temp dir
pub fn mock_config(base: &str, temp_dir: &TempDir, max_concurrent: usize) -> Config {
    let mut config = Config::default();
    config.http = config.http.with_base(base);
    config.download.download_dir = temp_dir.path().join("downloads");
    config.download.max_concurrent_downloads = max_concurrent;
    config
}

/// Load a session credential from environment variables
///
/// Required environment variables:
/// - `BILI_SESSDATA` - `SESSDATA` cookie
///
/// Optional environment variables:
/// - `BILI_JCT` - `bili_jct` cookie
/// - `BILI_DEDEUSERID` - `DedeUserID` cookie
pub fn load_credential() -> Result<Credential, ConfigError> {
    dotenvy::dotenv().ok();

    let sessdata = std::env::var("BILI_SESSDATA")
        .map_err(|_| ConfigError("BILI_SESSDATA not set in environment".to_string()))?;

    Ok(Credential {
        sessdata,
        bili_jct: std::env::var("BILI_JCT").unwrap_or_default(),
        dedeuserid: std::env::var("BILI_DEDEUSERID").unwrap_or_default(),
        ..Default::default()
    })
}

/// Favorite list id used by live tests (`BILI_FAV_MEDIA_ID`)
pub fn live_media_id() -> Result<i64, ConfigError> {
    dotenvy::dotenv().ok();

    std::env::var("BILI_FAV_MEDIA_ID")
        .map_err(|_| ConfigError("BILI_FAV_MEDIA_ID not set in environment".to_string()))?
        .parse()
        .map_err(|e| ConfigError(format!("BILI_FAV_MEDIA_ID is not a number: {}", e)))
}
