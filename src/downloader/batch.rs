//! Semaphore-gated batch downloads

use super::Downloader;
use crate::types::{DownloadTask, ProgressCallback};
use futures::future::join_all;
use std::path::{Path, PathBuf};

impl Downloader {
    /// Download every `(url, destination)` pair, at most `max_concurrent_downloads` at a time
    ///
    /// Returns one success flag per input pair, in input order regardless of
    /// completion order. A failed transfer never cancels its siblings.
    /// Destinations must be distinct within one batch.
    pub async fn download_batch(
        &self,
        tasks: Vec<(String, PathBuf)>,
        on_progress: Option<ProgressCallback>,
    ) -> Vec<bool> {
        self.download_batch_tasks(tasks, on_progress)
            .await
            .iter()
            .map(DownloadTask::is_completed)
            .collect()
    }

    /// Like [`download_batch`](Downloader::download_batch), returning the terminal task records
    pub async fn download_batch_tasks(
        &self,
        tasks: Vec<(String, PathBuf)>,
        on_progress: Option<ProgressCallback>,
    ) -> Vec<DownloadTask> {
        let total = tasks.len();
        tracing::debug!(tasks = total, max_concurrent = self.max_concurrent(), "starting batch");

        let results = join_all(tasks.into_iter().map(|(url, destination)| {
            let on_progress = on_progress.clone();
            async move {
                self.download_gated(&url, &destination, on_progress.as_ref())
                    .await
            }
        }))
        .await;

        let completed = results.iter().filter(|t| t.is_completed()).count();
        tracing::info!(
            tasks = total,
            completed,
            failed = total - completed,
            "batch finished"
        );
        results
    }

    /// Run one transfer while holding a permit of the shared semaphore
    pub(crate) async fn download_gated(
        &self,
        url: &str,
        destination: &Path,
        on_progress: Option<&ProgressCallback>,
    ) -> DownloadTask {
        let _permit = match self.concurrent_limit.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                // Only reachable if the semaphore is closed, which nothing does
                let mut task = DownloadTask::new(url, destination);
                task.start();
                task.fail(format!("concurrency gate unavailable: {}", e));
                return task;
            }
        };

        self.download_task(url, destination, on_progress).await
    }
}
