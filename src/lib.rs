//! # bili-audio-dl
//!
//! Client library for Bilibili's web API built around a bounded-concurrency
//! audio downloader.
//!
//! ## Overview
//!
//! - **Login** - QR-code login producing a [`Credential`]
//! - **Metadata** - videos, favorite lists and standalone audio tracks
//! - **Stream selection** - best audio variant under an optional quality ceiling
//! - **Downloads** - streamed single-file transfers, batches gated by a shared
//!   semaphore, and whole-collection downloads with per-item results
//!
//! The library logs through `tracing` and never installs a subscriber.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bili_audio_dl::{ApiClient, Config, Credential, DownloadAllOptions, download_favorite_list_audio};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let credential = Credential {
//!         sessdata: "your SESSDATA".to_string(),
//!         ..Default::default()
//!     };
//!     let client = ApiClient::from_config(&config, credential)?;
//!
//!     let results = download_favorite_list_audio(
//!         client,
//!         config,
//!         123456,
//!         &DownloadAllOptions::default(),
//!         Some(Arc::new(|done: usize, total: usize, title: &str| {
//!             println!("{}/{} {}", done, total, title);
//!         })),
//!     )
//!     .await?;
//!
//!     for (id, outcome) in &results {
//!         println!("{}: {:?}", id, outcome);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Web API client (login, video, favorite list, audio)
pub mod api;
/// Configuration types
pub mod config;
/// Session credential
pub mod credential;
/// Single-file, batch, video and collection downloaders
pub mod downloader;
/// Error types
pub mod error;
/// Progress formatting helpers
pub mod progress;
/// Audio stream variants and selection
pub mod stream;
/// Core types and callbacks
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use api::{
    ApiClient, Audio, FavoriteList, FavoriteListContentOrder, QrCodeLogin, QrPollStatus, Video,
};
pub use config::Config;
pub use credential::Credential;
pub use downloader::{
    AudioSelection, CollectionDownloader, DownloadAllOptions, Downloader, MediaCatalog,
    VideoDownloader, download_favorite_list_audio,
};
pub use error::{DownloadError, Error, Result};
pub use stream::{AudioQuality, StreamSource, StreamVariant};
pub use types::{
    CollectionResult, DownloadTask, ItemId, ItemOutcome, ItemProgressCallback, ProgressCallback,
    TaskStatus,
};
