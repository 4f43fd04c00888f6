//! Favorite lists (collections of videos)

use super::{ApiClient, data_of, require_i64, str_or_empty};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const FOLDER_INFO_PATH: &str = "/x/v3/fav/folder/info";
const RESOURCE_LIST_PATH: &str = "/x/v3/fav/resource/list";
const CREATED_LIST_PATH: &str = "/x/v3/fav/folder/created/list-all";

/// Items per content page (the endpoint's maximum)
pub const PAGE_SIZE: u32 = 20;

/// Sort order of a favorite list's contents
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteListContentOrder {
    /// Most recently favorited first
    #[default]
    Mtime,
    /// Most played first
    View,
    /// Most recently published first
    Pubtime,
}

impl FavoriteListContentOrder {
    /// Query parameter value
    pub fn as_str(&self) -> &'static str {
        match self {
            FavoriteListContentOrder::Mtime => "mtime",
            FavoriteListContentOrder::View => "view",
            FavoriteListContentOrder::Pubtime => "pubtime",
        }
    }
}

/// A favorite folder
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteFolder {
    /// Folder (media) id
    pub id: i64,
    /// Folder title
    pub title: String,
    /// Number of items in the folder
    pub media_count: i64,
    /// Owner's user id, when reported
    pub owner: Option<i64>,
}

impl FavoriteFolder {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            id: require_i64(value, "id", "favorite folder")?,
            title: str_or_empty(value, "title"),
            media_count: value
                .get("media_count")
                .and_then(Value::as_i64)
                .unwrap_or(0),
            owner: value
                .get("mid")
                .and_then(Value::as_i64)
                .or_else(|| value.pointer("/upper/mid").and_then(Value::as_i64)),
        })
    }
}

/// One video in a favorite list
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteItem {
    /// Media id (the video's AV number)
    pub id: i64,
    /// BV id; empty for deleted or invalid media
    pub bvid: String,
    /// Title
    pub title: String,
    /// Number of pages
    pub page_count: i64,
    /// Duration in seconds
    pub duration: i64,
    /// When the item was favorited
    pub fav_time: Option<DateTime<Utc>>,
    /// Uploader's display name
    pub upper_name: String,
}

impl FavoriteItem {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            id: require_i64(value, "id", "favorite item")?,
            bvid: str_or_empty(value, "bvid"),
            title: str_or_empty(value, "title"),
            page_count: value.get("page").and_then(Value::as_i64).unwrap_or(1),
            duration: value.get("duration").and_then(Value::as_i64).unwrap_or(0),
            fav_time: value
                .get("fav_time")
                .and_then(Value::as_i64)
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
            upper_name: value
                .pointer("/upper/name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }
}

/// One page of a favorite list's contents
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritePage {
    /// Items on this page
    pub items: Vec<FavoriteItem>,
    /// Whether another page follows
    pub has_more: bool,
}

/// A favorite list identified by its media id
#[derive(Clone, Debug)]
pub struct FavoriteList {
    client: ApiClient,
    media_id: i64,
}

impl FavoriteList {
    /// Create a handle for the folder `media_id`
    pub fn new(client: ApiClient, media_id: i64) -> Self {
        Self { client, media_id }
    }

    /// Folder media id
    pub fn media_id(&self) -> i64 {
        self.media_id
    }

    /// The client this list queries through
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Folder information
    pub async fn info(&self) -> Result<FavoriteFolder> {
        let url = self.client.api_url(FOLDER_INFO_PATH);
        let document = self
            .client
            .get_json(&url, &[("media_id", self.media_id.to_string())])
            .await?;
        FavoriteFolder::from_value(data_of(&document))
    }

    /// Raw content page document (one-based `page`)
    pub async fn content_document(
        &self,
        page: u32,
        keyword: Option<&str>,
        order: FavoriteListContentOrder,
    ) -> Result<Value> {
        let mut params = vec![
            ("media_id", self.media_id.to_string()),
            ("pn", page.to_string()),
            ("ps", PAGE_SIZE.to_string()),
            ("order", order.as_str().to_string()),
            ("type", "0".to_string()),
            ("tid", "0".to_string()),
        ];
        if let Some(keyword) = keyword.filter(|k| !k.is_empty()) {
            params.push(("keyword", keyword.to_string()));
        }

        let url = self.client.api_url(RESOURCE_LIST_PATH);
        self.client.get_json(&url, &params).await
    }

    /// One page of contents (one-based `page`)
    pub async fn content(
        &self,
        page: u32,
        keyword: Option<&str>,
        order: FavoriteListContentOrder,
    ) -> Result<FavoritePage> {
        let document = self.content_document(page, keyword, order).await?;
        let data = data_of(&document);

        let items = data
            .get("medias")
            .and_then(Value::as_array)
            .map(|medias| {
                medias
                    .iter()
                    .map(FavoriteItem::from_value)
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        Ok(FavoritePage {
            items,
            has_more: data
                .get("has_more")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }

    /// Every item, following pages until the list reports no more
    pub async fn all_items(&self) -> Result<Vec<FavoriteItem>> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let content = self
                .content(page, None, FavoriteListContentOrder::Mtime)
                .await?;
            let empty = content.items.is_empty();
            items.extend(content.items);
            if !content.has_more || empty {
                break;
            }
            page += 1;
        }
        tracing::debug!(media_id = self.media_id, items = items.len(), pages = page, "listed favorite list");
        Ok(items)
    }

    /// Folders created by user `uid`
    pub async fn list_user_folders(client: &ApiClient, uid: i64) -> Result<Vec<FavoriteFolder>> {
        let url = client.api_url(CREATED_LIST_PATH);
        let document = client
            .get_json(&url, &[("up_mid", uid.to_string()), ("type", "2".to_string())])
            .await?;

        data_of(&document)
            .get("list")
            .and_then(Value::as_array)
            .map(|list| list.iter().map(FavoriteFolder::from_value).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::anonymous(&HttpConfig::default().with_base(server.uri())).unwrap()
    }

    fn media(id: i64) -> Value {
        json!({
            "id": id,
            "type": 2,
            "bvid": format!("BV{}", id),
            "title": format!("song {}", id),
            "page": 1,
            "duration": 200,
            "fav_time": 1700000000,
            "upper": {"mid": 7, "name": "up"}
        })
    }

    #[tokio::test]
    async fn info_parses_folder() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(FOLDER_INFO_PATH))
            .and(query_param("media_id", "123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": {"id": 123, "title": "music", "media_count": 41, "mid": 7}
            })))
            .mount(&server)
            .await;

        let folder = FavoriteList::new(client_for(&server), 123).info().await.unwrap();
        assert_eq!(folder.title, "music");
        assert_eq!(folder.media_count, 41);
        assert_eq!(folder.owner, Some(7));
    }

    #[tokio::test]
    async fn content_sends_paging_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RESOURCE_LIST_PATH))
            .and(query_param("pn", "2"))
            .and(query_param("ps", "20"))
            .and(query_param("order", "view"))
            .and(query_param("keyword", "live"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": {"medias": [media(5)], "has_more": false}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let list = FavoriteList::new(client_for(&server), 123);
        let page = list
            .content(2, Some("live"), FavoriteListContentOrder::View)
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        let item = &page.items[0];
        assert_eq!(item.bvid, "BV5");
        assert_eq!(item.upper_name, "up");
        assert_eq!(item.fav_time.unwrap().timestamp(), 1700000000);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn all_items_follows_has_more() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RESOURCE_LIST_PATH))
            .and(query_param("pn", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": {"medias": [media(1), media(2)], "has_more": true}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(RESOURCE_LIST_PATH))
            .and(query_param("pn", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": {"medias": [media(3)], "has_more": false}
            })))
            .mount(&server)
            .await;

        let items = FavoriteList::new(client_for(&server), 9)
            .all_items()
            .await
            .unwrap();
        let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn empty_folder_has_null_medias() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RESOURCE_LIST_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": {"medias": null, "has_more": false}
            })))
            .mount(&server)
            .await;

        let items = FavoriteList::new(client_for(&server), 9)
            .all_items()
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn user_folders_are_listed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CREATED_LIST_PATH))
            .and(query_param("up_mid", "7"))
            .and(query_param("type", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "data": {"count": 2, "list": [
                    {"id": 1, "title": "default", "media_count": 3, "mid": 7},
                    {"id": 2, "title": "music", "media_count": 0, "mid": 7}
                ]}
            })))
            .mount(&server)
            .await;

        let folders = FavoriteList::list_user_folders(&client_for(&server), 7)
            .await
            .unwrap();
        assert_eq!(folders.len(), 2);
        assert_eq!(folders[1].title, "music");
    }
}
