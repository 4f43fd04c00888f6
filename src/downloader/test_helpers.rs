//! Shared test helpers for creating Downloader instances and fake endpoints in tests.

use crate::config::Config;
use crate::downloader::{CatalogItem, Downloader, MediaCatalog, ResolvedAudio};
use crate::error::{Error, Result};
use crate::stream::{AudioQuality, StreamVariant};
use crate::types::{DownloadTask, ItemId, ProgressCallback, TaskStatus};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::{TempDir, tempdir};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Config writing into `<temp>/downloads` with the given concurrency limit
pub(crate) fn test_config(temp_dir: &TempDir, max_concurrent: usize) -> Config {
    let mut config = Config::default();
    config.download.download_dir = temp_dir.path().join("downloads");
    config.download.max_concurrent_downloads = max_concurrent;
    config
}

/// Helper to create a test Downloader instance.
/// Returns the downloader and the tempdir (which must be kept alive).
pub(crate) fn create_test_downloader(max_concurrent: usize) -> (Downloader, TempDir) {
    let temp_dir = tempdir().unwrap();
    let downloader = Downloader::new(test_config(&temp_dir, max_concurrent)).unwrap();
    (downloader, temp_dir)
}

/// Deterministic payload of `len` bytes
pub(crate) fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Serve every connection a 200 response that declares `declared` bytes,
/// sends only `body`, then closes the connection.
pub(crate) async fn spawn_truncated_server(declared: usize, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            // Consume the request head before answering
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }

            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
                declared
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(&body).await;
            let _ = socket.flush().await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{}/truncated.m4s", addr)
}

/// Records every progress notification
#[derive(Default)]
pub(crate) struct ProgressLog {
    events: Mutex<Vec<DownloadTask>>,
}

impl ProgressLog {
    pub(crate) fn callback(self: &Arc<Self>) -> ProgressCallback {
        let log = Arc::clone(self);
        Arc::new(move |task: &DownloadTask| {
            log.events.lock().unwrap().push(task.clone());
        })
    }

    pub(crate) fn events(&self) -> Vec<DownloadTask> {
        self.events.lock().unwrap().clone()
    }

    /// File names in the order their tasks reached a terminal state
    pub(crate) fn finish_order(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|t| t.status.is_terminal())
            .map(|t| t.file_name)
            .collect()
    }
}

/// Tracks how many transfers are in `Downloading` at the same time
#[derive(Default)]
pub(crate) struct ConcurrencyProbe {
    active: Mutex<HashSet<PathBuf>>,
    peak: AtomicUsize,
}

impl ConcurrencyProbe {
    pub(crate) fn callback(self: &Arc<Self>) -> ProgressCallback {
        let probe = Arc::clone(self);
        Arc::new(move |task: &DownloadTask| {
            let mut active = probe.active.lock().unwrap();
            match task.status {
                TaskStatus::Downloading => {
                    active.insert(task.destination_path.clone());
                    probe.peak.fetch_max(active.len(), Ordering::SeqCst);
                }
                TaskStatus::Completed | TaskStatus::Failed => {
                    active.remove(&task.destination_path);
                }
                TaskStatus::Pending => {}
            }
        })
    }

    pub(crate) fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// In-memory catalog: items with a stream URL resolve, the rest fail
pub(crate) struct StaticCatalog {
    pub(crate) items: Vec<CatalogItem>,
    pub(crate) streams: HashMap<ItemId, String>,
}

impl StaticCatalog {
    /// `titles[i]` becomes item id `i + 1`; ids in `unresolvable` get no stream
    pub(crate) fn new(base_url: &str, titles: &[&str], unresolvable: &[i64]) -> Self {
        let mut items = Vec::new();
        let mut streams = HashMap::new();
        for (i, title) in titles.iter().enumerate() {
            let id = ItemId(i as i64 + 1);
            items.push(CatalogItem {
                id,
                bvid: format!("BV{}", id),
                title: title.to_string(),
            });
            if !unresolvable.contains(&id.get()) {
                streams.insert(id, format!("{}/audio/{}.m4s", base_url, id));
            }
        }
        Self { items, streams }
    }
}

#[async_trait]
impl MediaCatalog for StaticCatalog {
    async fn list_items(&self) -> Result<Vec<CatalogItem>> {
        Ok(self.items.clone())
    }

    async fn resolve_audio(
        &self,
        item: &CatalogItem,
        ceiling: Option<AudioQuality>,
    ) -> Result<ResolvedAudio> {
        let url = self.streams.get(&item.id).ok_or_else(|| Error::NoStream {
            item: item.title.clone(),
        })?;
        let quality = ceiling
            .map(|c| c.min(AudioQuality::K192))
            .unwrap_or(AudioQuality::K192);

        Ok(ResolvedAudio {
            title: item.title.clone(),
            page_index: 0,
            variant: StreamVariant {
                url: url.clone(),
                backup_urls: Vec::new(),
                quality_id: quality.id(),
                quality: Some(quality),
            },
        })
    }
}
