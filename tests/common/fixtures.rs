//! Canned API responses and mock-server setup

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Favorite list id served by [`mount_favorite_list`]
pub const MEDIA_ID: i64 = 777;

/// One favorite-list entry
pub fn media(id: i64, bvid: &str, title: &str) -> Value {
    json!({
        "id": id,
        "type": 2,
        "bvid": bvid,
        "title": title,
        "page": 1,
        "duration": 180,
        "fav_time": 1700000000 + id,
        "upper": {"mid": 1, "name": "uploader"}
    })
}

/// Mount a two-page favorite list; `entries` are split after the first two
pub async fn mount_favorite_list(server: &MockServer, entries: Vec<Value>) {
    let (first, second) = entries.split_at(entries.len().min(2));
    for (page, medias, has_more) in [(1, first, !second.is_empty()), (2, second, false)] {
        Mock::given(method("GET"))
            .and(path("/x/v3/fav/resource/list"))
            .and(query_param("media_id", MEDIA_ID.to_string()))
            .and(query_param("pn", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 0,
                "message": "0",
                "data": {"info": {"id": MEDIA_ID}, "medias": medias, "has_more": has_more}
            })))
            .mount(server)
            .await;
    }
}

/// Mount view + play-url + CDN responses for a video with one page
pub async fn mount_video(server: &MockServer, bvid: &str, title: &str, cid: i64, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path("/x/web-interface/view"))
        .and(query_param("bvid", bvid))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": {
                "aid": cid * 10,
                "bvid": bvid,
                "title": title,
                "pages": [{"cid": cid, "page": 1, "part": title, "duration": 180}]
            }
        })))
        .mount(server)
        .await;

    let cdn_path = format!("/upgcxcode/{}/{}-30280.m4s", cid, cid);
    Mock::given(method("GET"))
        .and(path("/x/player/playurl"))
        .and(query_param("cid", cid.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": {
                "dash": {
                    "audio": [
                        {"id": 30216, "baseUrl": format!("{}/low/{}.m4s", server.uri(), cid)},
                        {"id": 30280, "baseUrl": format!("{}{}", server.uri(), cdn_path)}
                    ],
                    "dolby": {"type": 0, "audio": null},
                    "flac": null
                }
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(cdn_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/low/{}.m4s", cid)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"low".to_vec()))
        .mount(server)
        .await;
}

/// Mount a video whose play-url uses the legacy single-file layout (no audio tracks)
pub async fn mount_legacy_video(server: &MockServer, bvid: &str, title: &str, cid: i64) {
    Mock::given(method("GET"))
        .and(path("/x/web-interface/view"))
        .and(query_param("bvid", bvid))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": {
                "aid": cid * 10,
                "bvid": bvid,
                "title": title,
                "pages": [{"cid": cid, "page": 1, "part": title, "duration": 60}]
            }
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/x/player/playurl"))
        .and(query_param("cid", cid.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": {"durl": [{"order": 1, "url": "https://cdn.invalid/v.flv", "size": 1}]}
        })))
        .mount(server)
        .await;
}
