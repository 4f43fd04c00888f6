//! Bounded-concurrency file downloader split into focused submodules.
//!
//! The [`Downloader`] struct and its methods are organized by layer:
//! - [`single`] - Streaming one URL to one file with progress tracking
//! - [`batch`] - Running many transfers under the shared concurrency gate
//! - [`video`] - Downloading a video page's audio track
//! - [`collection`] - Downloading the audio of every item in a collection

mod batch;
mod collection;
mod single;
mod video;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use collection::{
    CatalogItem, CollectionDownloader, DownloadAllOptions, MediaCatalog, ResolvedAudio,
    download_favorite_list_audio,
};
pub use video::{AudioSelection, VideoDownloader};

use crate::config::Config;
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// File downloader (cloneable - all fields are Arc-wrapped or cheap handles)
///
/// Every transfer started through a `Downloader` or any of its clones, whether
/// from one batch or several, holds a permit of the same semaphore, so at most
/// `max_concurrent_downloads` files are transferred at once.
#[derive(Clone, Debug)]
pub struct Downloader {
    /// HTTP client carrying the CDN-required default headers
    pub(crate) http: reqwest::Client,
    /// Semaphore to limit concurrent transfers (respects max_concurrent_downloads config)
    pub(crate) concurrent_limit: Arc<Semaphore>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
}

impl Downloader {
    /// Create a new downloader
    ///
    /// Fails with a configuration error (before any I/O) when the config is
    /// invalid, e.g. when `max_concurrent_downloads` is zero.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let http = crate::api::build_http_client(&config.http)?;

        let concurrent_limit = Arc::new(Semaphore::new(config.download.max_concurrent_downloads));

        tracing::debug!(
            max_concurrent = config.download.max_concurrent_downloads,
            download_dir = %config.download.download_dir.display(),
            "downloader created"
        );

        Ok(Self {
            http,
            concurrent_limit,
            config: Arc::new(config),
        })
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Maximum number of simultaneous transfers
    pub fn max_concurrent(&self) -> usize {
        self.config.download.max_concurrent_downloads
    }

    /// Transfer slots currently free
    pub fn available_permits(&self) -> usize {
        self.concurrent_limit.available_permits()
    }
}
