//! Standalone audio tracks (AU numbers)

use super::{ApiClient, data_of, require_i64, str_or_empty};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const SONG_INFO_PATH: &str = "/audio/music-service-c/web/song/info";
const SONG_URL_PATH: &str = "/audio/music-service-c/web/url";

/// Metadata of an audio track
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioInfo {
    /// AU number
    pub id: i64,
    /// Track title
    pub title: String,
    /// Uploader's display name
    pub author: String,
    /// Duration in seconds
    pub duration: i64,
}

/// Resolved download location of an audio track
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioDownloadUrl {
    /// CDN URLs, best first
    pub cdns: Vec<String>,
    /// Declared file size in bytes
    pub size: u64,
}

impl AudioDownloadUrl {
    /// The preferred CDN URL
    pub fn url(&self) -> Option<&str> {
        self.cdns.first().map(String::as_str)
    }
}

/// An audio track identified by its AU number
#[derive(Clone, Debug)]
pub struct Audio {
    client: ApiClient,
    auid: i64,
}

impl Audio {
    /// Create a handle for track `auid`
    pub fn new(client: ApiClient, auid: i64) -> Self {
        Self { client, auid }
    }

    /// AU number
    pub fn auid(&self) -> i64 {
        self.auid
    }

    /// Track metadata
    pub async fn info(&self) -> Result<AudioInfo> {
        let url = self.client.www_url(SONG_INFO_PATH);
        let document = self
            .client
            .get_json(&url, &[("sid", self.auid.to_string())])
            .await?;
        let data = data_of(&document);

        Ok(AudioInfo {
            id: require_i64(data, "id", "audio info")?,
            title: str_or_empty(data, "title"),
            author: str_or_empty(data, "author"),
            duration: data.get("duration").and_then(Value::as_i64).unwrap_or(0),
        })
    }

    /// Download URLs for the track
    pub async fn download_url(&self) -> Result<AudioDownloadUrl> {
        let url = self.client.www_url(SONG_URL_PATH);
        let document = self
            .client
            .get_json(
                &url,
                &[
                    ("sid", self.auid.to_string()),
                    ("privilege", "2".to_string()),
                    ("quality", "2".to_string()),
                ],
            )
            .await?;
        let data = data_of(&document);

        let cdns: Vec<String> = data
            .get("cdns")
            .and_then(Value::as_array)
            .map(|cdns| {
                cdns.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        if cdns.is_empty() {
            return Err(Error::NoStream {
                item: format!("au{}", self.auid),
            });
        }

        Ok(AudioDownloadUrl {
            cdns,
            size: data.get("size").and_then(Value::as_u64).unwrap_or(0),
        })
    }
}
