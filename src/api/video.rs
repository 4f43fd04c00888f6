//! Video metadata and play-url lookup

use super::{ApiClient, data_of, require_i64, str_or_empty};
use crate::error::{Error, Result};
use crate::stream::{AudioQuality, StreamSource, StreamVariant};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;

const VIEW_PATH: &str = "/x/web-interface/view";
const PLAYURL_PATH: &str = "/x/player/playurl";

/// Request every DASH stream kind (HDR, 4K, Dolby, 8K, AV1)
const FNVAL_ALL_DASH: &str = "4048";

/// One page (part) of a video
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoPage {
    /// Content id used by the play-url endpoint
    pub cid: i64,
    /// One-based page number
    pub page: i64,
    /// Page title
    pub part: String,
    /// Duration in seconds
    pub duration: i64,
}

/// Basic video information
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfo {
    /// AV number
    pub aid: i64,
    /// BV id
    pub bvid: String,
    /// Video title
    pub title: String,
    /// Pages in order
    pub pages: Vec<VideoPage>,
}

impl VideoInfo {
    fn from_data(data: &Value) -> Result<Self> {
        let pages = data
            .get("pages")
            .and_then(Value::as_array)
            .map(|pages| {
                pages
                    .iter()
                    .map(|p| {
                        Ok(VideoPage {
                            cid: require_i64(p, "cid", "video page")?,
                            page: p.get("page").and_then(Value::as_i64).unwrap_or(1),
                            part: str_or_empty(p, "part"),
                            duration: p.get("duration").and_then(Value::as_i64).unwrap_or(0),
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            aid: require_i64(data, "aid", "video info")?,
            bvid: str_or_empty(data, "bvid"),
            title: str_or_empty(data, "title"),
            pages,
        })
    }
}

/// A video identified by BV id or AV number
pub struct Video {
    client: ApiClient,
    bvid: Option<String>,
    aid: Option<i64>,
    info: OnceCell<VideoInfo>,
}

impl Video {
    /// Create a video handle
    ///
    /// At least one of `bvid` and `aid` must be given; an empty BV id counts
    /// as missing.
    pub fn new(client: ApiClient, bvid: Option<&str>, aid: Option<i64>) -> Result<Self> {
        let bvid = bvid.filter(|b| !b.is_empty()).map(str::to_string);
        if bvid.is_none() && aid.is_none() {
            return Err(Error::InvalidInput(
                "a video needs either a bvid or an aid".to_string(),
            ));
        }
        Ok(Self {
            client,
            bvid,
            aid,
            info: OnceCell::new(),
        })
    }

    /// Video by BV id
    pub fn from_bvid(client: ApiClient, bvid: &str) -> Result<Self> {
        Self::new(client, Some(bvid), None)
    }

    /// Video by AV number
    pub fn from_aid(client: ApiClient, aid: i64) -> Result<Self> {
        Self::new(client, None, Some(aid))
    }

    /// BV id given at construction
    pub fn bvid(&self) -> Option<&str> {
        self.bvid.as_deref()
    }

    /// AV number given at construction
    pub fn aid(&self) -> Option<i64> {
        self.aid
    }

    /// Raw `view` response
    pub async fn info_document(&self) -> Result<Value> {
        let url = self.client.api_url(VIEW_PATH);
        self.client.get_json(&url, &self.id_params()).await
    }

    /// Video information (fetched once, then cached)
    pub async fn info(&self) -> Result<&VideoInfo> {
        self.info
            .get_or_try_init(|| async {
                let document = self.info_document().await?;
                VideoInfo::from_data(data_of(&document))
            })
            .await
    }

    /// Video title
    pub async fn title(&self) -> Result<String> {
        Ok(self.info().await?.title.clone())
    }

    /// Video pages
    pub async fn pages(&self) -> Result<Vec<VideoPage>> {
        Ok(self.info().await?.pages.clone())
    }

    /// Play-url document for the page at zero-based `page_index`
    pub async fn play_url(&self, page_index: usize) -> Result<Value> {
        let info = self.info().await?;
        let page = info.pages.get(page_index).ok_or_else(|| {
            Error::InvalidInput(format!(
                "page index {} out of range ({} pages)",
                page_index,
                info.pages.len()
            ))
        })?;

        let mut params = vec![
            ("cid", page.cid.to_string()),
            ("fnval", FNVAL_ALL_DASH.to_string()),
            ("fnver", "0".to_string()),
            ("fourk", "1".to_string()),
        ];
        if info.bvid.is_empty() {
            params.push(("avid", info.aid.to_string()));
        } else {
            params.push(("bvid", info.bvid.clone()));
        }

        let url = self.client.api_url(PLAYURL_PATH);
        self.client.get_json(&url, &params).await
    }

    /// Audio variants of a page, in document order
    pub async fn audio_streams(&self, page_index: usize) -> Result<Vec<StreamVariant>> {
        let document = self.play_url(page_index).await?;
        Ok(StreamSource::from_document(&document).into_variants())
    }

    /// Best audio variant of a page at or below `ceiling`
    pub async fn best_audio_stream(
        &self,
        page_index: usize,
        ceiling: Option<AudioQuality>,
    ) -> Result<Option<StreamVariant>> {
        let document = self.play_url(page_index).await?;
        Ok(StreamSource::from_document(&document)
            .best_variant(ceiling)
            .cloned())
    }

    fn id_params(&self) -> Vec<(&'static str, String)> {
        match (&self.bvid, self.aid) {
            (Some(bvid), _) => vec![("bvid", bvid.clone())],
            (None, Some(aid)) => vec![("aid", aid.to_string())],
            (None, None) => Vec::new(),
        }
    }
}
