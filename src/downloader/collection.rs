//! Collection-wide audio download
//!
//! Items are resolved one after another (title plus best audio variant). Each
//! resolved item's transfer is submitted to the shared concurrency gate right
//! away, so resolution of later items overlaps earlier transfers.
//! Each item ends up in the result map as either the written path or the
//! error that stopped it.

use super::Downloader;
use crate::api::{ApiClient, FavoriteList, Video};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::stream::{AudioQuality, StreamVariant};
use crate::types::{CollectionResult, ItemId, ItemOutcome, ItemProgressCallback, ProgressCallback};
use crate::utils::{audio_file_name, sanitize_filename};
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One entry of a collection listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogItem {
    /// Item identity (media id)
    pub id: ItemId,
    /// BV id; empty for deleted or invalid media
    pub bvid: String,
    /// Title as listed
    pub title: String,
}

/// An item's selected audio track
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedAudio {
    /// Title used for the file name
    pub title: String,
    /// Zero-based page the track belongs to
    pub page_index: usize,
    /// The selected variant
    pub variant: StreamVariant,
}

/// Source of collection items and their audio streams
///
/// [`FavoriteList`] is the production implementation.
#[async_trait]
pub trait MediaCatalog: Send + Sync {
    /// Every item of the collection in listing order
    async fn list_items(&self) -> Result<Vec<CatalogItem>>;

    /// Best audio variant of the item's first page at or below `ceiling`
    async fn resolve_audio(
        &self,
        item: &CatalogItem,
        ceiling: Option<AudioQuality>,
    ) -> Result<ResolvedAudio>;
}

#[async_trait]
impl MediaCatalog for FavoriteList {
    async fn list_items(&self) -> Result<Vec<CatalogItem>> {
        Ok(self
            .all_items()
            .await?
            .into_iter()
            .map(|item| CatalogItem {
                id: ItemId(item.id),
                bvid: item.bvid,
                title: item.title,
            })
            .collect())
    }

    async fn resolve_audio(
        &self,
        item: &CatalogItem,
        ceiling: Option<AudioQuality>,
    ) -> Result<ResolvedAudio> {
        if item.bvid.is_empty() {
            return Err(Error::NoStream {
                item: item_label(item),
            });
        }

        let video = Video::from_bvid(self.client().clone(), &item.bvid)?;
        let title = video.title().await?;
        let variant = video
            .best_audio_stream(0, ceiling)
            .await?
            .ok_or_else(|| Error::NoStream {
                item: title.clone(),
            })?;

        Ok(ResolvedAudio {
            title,
            page_index: 0,
            variant,
        })
    }
}

fn item_label(item: &CatalogItem) -> String {
    if item.title.is_empty() {
        item.id.to_string()
    } else {
        item.title.clone()
    }
}

/// Options for [`CollectionDownloader::download_all_audio`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DownloadAllOptions {
    /// Only the first N items in listing order (None = all)
    pub max_items: Option<usize>,
    /// Highest acceptable audio tier (None = best available)
    pub quality_ceiling: Option<AudioQuality>,
}

/// Downloads the audio of every item in a collection
pub struct CollectionDownloader<C: MediaCatalog> {
    catalog: C,
    downloader: Downloader,
    download_dir: PathBuf,
    file_progress: Option<ProgressCallback>,
}

impl<C: MediaCatalog> CollectionDownloader<C> {
    /// Create a collection downloader writing into the downloader's configured directory
    pub fn new(catalog: C, downloader: Downloader) -> Self {
        let download_dir = downloader.config.download.download_dir.clone();
        Self {
            catalog,
            downloader,
            download_dir,
            file_progress: None,
        }
    }

    /// Write into `dir` instead of the configured download directory
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// Also report byte-level progress of every file transfer
    pub fn with_file_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.file_progress = Some(on_progress);
        self
    }

    /// The catalog items are listed from
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Download the audio of every item
    ///
    /// `on_item_progress(completed, total, title)` is called once per item as
    /// soon as it finishes, successfully or not. Only a failure to list the
    /// collection is returned as an error; per-item failures are recorded in
    /// the result map.
    pub async fn download_all_audio(
        &self,
        options: &DownloadAllOptions,
        on_item_progress: Option<ItemProgressCallback>,
    ) -> Result<CollectionResult> {
        let mut items = self.catalog.list_items().await?;
        if let Some(max) = options.max_items {
            items.truncate(max);
        }
        let total = items.len();
        tracing::info!(items = total, dir = %self.download_dir.display(), "starting collection download");

        let completed = AtomicUsize::new(0);
        let report = |label: &str| {
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(callback) = &on_item_progress {
                callback(done, total, label);
            }
        };

        let transfer = |id: ItemId, resolved: ResolvedAudio, destination: PathBuf| {
            let file_progress = self.file_progress.clone();
            let report = &report;
            let future: BoxFuture<'_, (ItemId, ItemOutcome)> = Box::pin(async move {
                let task = self
                    .downloader
                    .download_gated(&resolved.variant.url, &destination, file_progress.as_ref())
                    .await;
                report(&resolved.title);

                let outcome = if task.is_completed() {
                    ItemOutcome::Downloaded(task.destination_path)
                } else {
                    ItemOutcome::Failed(
                        task.error.unwrap_or_else(|| "download failed".to_string()),
                    )
                };
                (id, outcome)
            });
            future
        };

        let mut results = CollectionResult::new();
        let mut in_flight: FuturesUnordered<BoxFuture<'_, (ItemId, ItemOutcome)>> =
            FuturesUnordered::new();
        // Lowercased: names differing only in case collide on some filesystems
        let mut used_names = HashSet::new();

        for item in &items {
            // Earlier transfers keep running while this item resolves
            let resolution = self.catalog.resolve_audio(item, options.quality_ceiling);
            tokio::pin!(resolution);
            let resolution = loop {
                tokio::select! {
                    biased;
                    resolved = &mut resolution => break resolved,
                    Some((id, outcome)) = in_flight.next(), if !in_flight.is_empty() => {
                        results.insert(id, outcome);
                    }
                }
            };

            match resolution {
                Ok(resolved) => {
                    let mut file_name = audio_file_name(
                        &resolved.title,
                        resolved.page_index,
                        &resolved.variant.quality_label(),
                    );
                    if !used_names.insert(file_name.to_lowercase()) {
                        file_name = format!(
                            "{}_p{}_{}_{}.m4a",
                            sanitize_filename(&resolved.title),
                            resolved.page_index + 1,
                            resolved.variant.quality_label(),
                            item.id
                        );
                        used_names.insert(file_name.to_lowercase());
                    }
                    let destination = self.download_dir.join(file_name);
                    in_flight.push(transfer(item.id, resolved, destination));
                }
                Err(e) => {
                    tracing::warn!(item_id = item.id.get(), error = %e, "could not resolve audio");
                    results.insert(item.id, ItemOutcome::Failed(e.to_string()));
                    report(&item_label(item));
                }
            }
        }

        while let Some((id, outcome)) = in_flight.next().await {
            results.insert(id, outcome);
        }

        let downloaded = results.values().filter(|o| o.is_success()).count();
        tracing::info!(
            items = total,
            downloaded,
            failed = total - downloaded,
            "collection download finished"
        );
        Ok(results)
    }
}

/// Download the audio of every video in favorite list `media_id`
///
/// Builds a [`Downloader`] from `config` and lists the folder through `client`.
pub async fn download_favorite_list_audio(
    client: ApiClient,
    config: Config,
    media_id: i64,
    options: &DownloadAllOptions,
    on_item_progress: Option<ItemProgressCallback>,
) -> Result<CollectionResult> {
    let downloader = Downloader::new(config)?;
    let list = FavoriteList::new(client, media_id);
    CollectionDownloader::new(list, downloader)
        .download_all_audio(options, on_item_progress)
        .await
}

impl<C: MediaCatalog> std::fmt::Debug for CollectionDownloader<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionDownloader")
            .field("download_dir", &self.download_dir)
            .field("has_file_progress", &self.file_progress.is_some())
            .finish()
    }
}

#[async_trait]
impl<C: MediaCatalog + ?Sized> MediaCatalog for Arc<C> {
    async fn list_items(&self) -> Result<Vec<CatalogItem>> {
        (**self).list_items().await
    }

    async fn resolve_audio(
        &self,
        item: &CatalogItem,
        ceiling: Option<AudioQuality>,
    ) -> Result<ResolvedAudio> {
        (**self).resolve_audio(item, ceiling).await
    }
}
