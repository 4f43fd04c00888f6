//! Single-file streaming download

use super::Downloader;
use crate::error::DownloadError;
use crate::types::{DownloadTask, ProgressCallback};
use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;

fn notify(on_progress: Option<&ProgressCallback>, task: &DownloadTask) {
    if let Some(callback) = on_progress {
        callback(task);
    }
}

impl Downloader {
    /// Download `url` to `destination`, returning whether it completed
    ///
    /// `on_progress` receives the task after every state change and after
    /// every written chunk. Failures never propagate; they end the task in
    /// `Failed` and yield `false`.
    ///
    /// This call does not take a concurrency permit; use
    /// [`download_batch`](Downloader::download_batch) for gated transfers.
    pub async fn download_single(
        &self,
        url: &str,
        destination: impl AsRef<Path>,
        on_progress: Option<&ProgressCallback>,
    ) -> bool {
        self.download_task(url, destination, on_progress)
            .await
            .is_completed()
    }

    /// Like [`download_single`](Downloader::download_single), returning the terminal task record
    pub async fn download_task(
        &self,
        url: &str,
        destination: impl AsRef<Path>,
        on_progress: Option<&ProgressCallback>,
    ) -> DownloadTask {
        let mut task = DownloadTask::new(url, destination);
        notify(on_progress, &task);

        task.start();
        notify(on_progress, &task);

        match self.transfer(&mut task, on_progress).await {
            Ok(()) => {
                task.complete();
                tracing::info!(
                    url = %task.source_url,
                    path = %task.destination_path.display(),
                    bytes = task.bytes_downloaded,
                    "download completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    url = %task.source_url,
                    path = %task.destination_path.display(),
                    error = %e,
                    "download failed"
                );
                task.fail(e.to_string());
            }
        }

        notify(on_progress, &task);
        task
    }

    /// Stream the response body into the destination file
    ///
    /// The response and file handle are dropped when this returns, on success
    /// and on every error path.
    async fn transfer(
        &self,
        task: &mut DownloadTask,
        on_progress: Option<&ProgressCallback>,
    ) -> std::result::Result<(), DownloadError> {
        if let Some(parent) = task
            .destination_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::CreateDir {
                    path: parent.to_path_buf(),
                    reason: e.to_string(),
                })?;
        }

        let response = self
            .http
            .get(&task.source_url)
            .send()
            .await
            .map_err(|e| DownloadError::Request {
                url: task.source_url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                status: status.as_u16(),
                url: task.source_url.clone(),
            });
        }

        task.total_size = response.content_length().unwrap_or(0);
        tracing::debug!(url = %task.source_url, total_size = task.total_size, "response received");

        let write_error = |path: &Path, e: std::io::Error| DownloadError::Write {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let mut file = tokio::fs::File::create(&task.destination_path)
            .await
            .map_err(|e| write_error(&task.destination_path, e))?;

        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| DownloadError::Stream {
                received: task.bytes_downloaded,
                reason: e.to_string(),
            })?;
            if chunk.is_empty() {
                continue;
            }

            file.write_all(&chunk)
                .await
                .map_err(|e| write_error(&task.destination_path, e))?;
            task.record_chunk(chunk.len());
            notify(on_progress, task);
        }

        file.flush()
            .await
            .map_err(|e| write_error(&task.destination_path, e))?;

        Ok(())
    }
}
