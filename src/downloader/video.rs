//! Audio download for a single video

use super::Downloader;
use crate::api::Video;
use crate::error::{DownloadError, Error, Result};
use crate::stream::{AudioQuality, StreamSource, StreamVariant};
use crate::types::ProgressCallback;
use crate::utils::audio_file_name;
use std::path::PathBuf;

/// Which audio variant to download
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AudioSelection {
    /// Highest available tier
    #[default]
    Best,
    /// Highest tier at or below the given ceiling
    AtMost(AudioQuality),
    /// Exactly this tier; fails when the video does not offer it
    Exactly(AudioQuality),
}

impl AudioSelection {
    fn pick<'a>(&self, source: &'a StreamSource) -> Option<&'a StreamVariant> {
        match self {
            AudioSelection::Best => source.best_variant(None),
            AudioSelection::AtMost(ceiling) => source.best_variant(Some(*ceiling)),
            AudioSelection::Exactly(quality) => source.variant_for(*quality),
        }
    }
}

/// Downloads tracks of one video into a directory
pub struct VideoDownloader {
    video: Video,
    downloader: Downloader,
    download_dir: PathBuf,
}

impl VideoDownloader {
    /// Create a video downloader writing into the downloader's configured directory
    pub fn new(video: Video, downloader: Downloader) -> Self {
        let download_dir = downloader.config.download.download_dir.clone();
        Self {
            video,
            downloader,
            download_dir,
        }
    }

    /// Write into `dir` instead of the configured download directory
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// The video being downloaded
    pub fn video(&self) -> &Video {
        &self.video
    }

    /// Download the audio track of the page at zero-based `page_index`
    ///
    /// Without an explicit `file_name` the file is named
    /// `{title}_p{page+1}_{QUALITY}.m4a`. Returns the written path.
    pub async fn download_audio(
        &self,
        page_index: usize,
        selection: AudioSelection,
        file_name: Option<&str>,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<PathBuf> {
        let document = self.video.play_url(page_index).await?;
        let source = StreamSource::from_document(&document);
        let title = self.video.title().await?;

        let variant = selection.pick(&source).ok_or_else(|| Error::NoStream {
            item: match selection {
                AudioSelection::Exactly(q) => format!("{} at {}", title, q),
                _ => title.clone(),
            },
        })?;

        let file_name = match file_name {
            Some(name) => name.to_string(),
            None => audio_file_name(&title, page_index, &variant.quality_label()),
        };

        tokio::fs::create_dir_all(&self.download_dir).await?;
        let destination = self.download_dir.join(file_name);

        let task = self
            .downloader
            .download_gated(&variant.url, &destination, on_progress)
            .await;
        if !task.is_completed() {
            return Err(Error::Download(DownloadError::Failed(
                task.error.unwrap_or_else(|| "download failed".to_string()),
            )));
        }

        Ok(destination)
    }

    /// Video stream download is not supported; only audio tracks are
    pub async fn download_video(
        &self,
        _page_index: usize,
        _file_name: Option<&str>,
        _on_progress: Option<&ProgressCallback>,
    ) -> Result<PathBuf> {
        Err(Error::NotSupported(
            "video stream download is not supported, use download_audio".to_string(),
        ))
    }
}
