//! End-to-end favorite-list download against a mock platform
//!
//! A single wiremock server plays the API host and the CDN. The listing,
//! video info, play-url and media responses mirror the real endpoints.

mod common;

use bili_audio_dl::progress::BatchSummary;
use bili_audio_dl::{
    ApiClient, AudioQuality, Credential, DownloadAllOptions, ItemId, ItemOutcome,
    ItemProgressCallback, download_favorite_list_audio,
};
use common::{MEDIA_ID, media, mock_config, mount_favorite_list, mount_legacy_video, mount_video};
use std::sync::{Arc, Mutex};
use wiremock::MockServer;

async fn mount_collection(server: &MockServer) {
    mount_favorite_list(
        server,
        vec![
            media(1, "BV1a", "Song A"),
            media(2, "BV1b", "Song/B"),
            media(3, "", "已失效视频"),
            media(4, "BV1d", "Old upload"),
            media(5, "BV1e", "Song E"),
        ],
    )
    .await;
    mount_video(server, "BV1a", "Song A", 101, vec![1; 300]).await;
    mount_video(server, "BV1b", "Song/B", 102, vec![2; 200]).await;
    mount_legacy_video(server, "BV1d", "Old upload", 104).await;
    mount_video(server, "BV1e", "Song E", 105, vec![5; 500]).await;
}

#[tokio::test]
async fn test_favorite_list_download_records_every_item() {
    let server = MockServer::start().await;
    mount_collection(&server).await;

    let temp_dir = tempfile::tempdir().unwrap();
    let config = mock_config(&server.uri(), &temp_dir, 2);
    let client = ApiClient::from_config(&config, Credential::anonymous()).unwrap();

    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);
    let on_item: ItemProgressCallback = Arc::new(move |done: usize, total: usize, label: &str| {
        sink.lock().unwrap().push((done, total, label.to_string()));
    });

    let results = download_favorite_list_audio(
        client,
        config,
        MEDIA_ID,
        &DownloadAllOptions::default(),
        Some(on_item),
    )
    .await
    .unwrap();

    let dir = temp_dir.path().join("downloads");
    assert_eq!(results.len(), 5);
    assert_eq!(
        results[&ItemId(1)],
        ItemOutcome::Downloaded(dir.join("Song A_p1_192K.m4a"))
    );
    assert_eq!(
        results[&ItemId(2)],
        ItemOutcome::Downloaded(dir.join("Song_B_p1_192K.m4a"))
    );
    assert_eq!(
        std::fs::read(dir.join("Song E_p1_192K.m4a")).unwrap(),
        vec![5u8; 500]
    );
    assert!(!results[&ItemId(3)].is_success());
    assert!(
        results[&ItemId(4)]
            .error()
            .unwrap()
            .contains("no usable audio stream")
    );

    let summary = BatchSummary::from_results(&results);
    assert_eq!((summary.success, summary.failed), (3, 2));

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 5);
    assert_eq!(calls.last().unwrap().0, 5);
}

#[tokio::test]
async fn test_quality_ceiling_and_item_limit() {
    let server = MockServer::start().await;
    mount_collection(&server).await;

    let temp_dir = tempfile::tempdir().unwrap();
    let config = mock_config(&server.uri(), &temp_dir, 3);
    let client = ApiClient::from_config(&config, Credential::anonymous()).unwrap();
    let options = DownloadAllOptions {
        max_items: Some(1),
        quality_ceiling: Some(AudioQuality::K132),
    };

    let results = download_favorite_list_audio(client, config, MEDIA_ID, &options, None)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    let path = results[&ItemId(1)].path().unwrap();
    assert!(path.ends_with("Song A_p1_64K.m4a"));
    assert_eq!(std::fs::read(path).unwrap(), b"low");
}

#[tokio::test]
async fn test_zero_concurrency_fails_before_listing() {
    let server = MockServer::start().await;

    let temp_dir = tempfile::tempdir().unwrap();
    let config = mock_config(&server.uri(), &temp_dir, 0);
    let client = ApiClient::from_config(&config, Credential::anonymous()).unwrap();

    let err = download_favorite_list_audio(
        client,
        config,
        MEDIA_ID,
        &DownloadAllOptions::default(),
        None,
    )
    .await
    .unwrap_err();

    assert!(err.is_input_error());
    assert!(server.received_requests().await.unwrap().is_empty());
}
