//! Progress formatting helpers for callers that render download status

use crate::types::{CollectionResult, DownloadTask, ItemOutcome, TaskStatus};
use std::time::Instant;

const KIB: u64 = 1024;
const MIB: u64 = KIB * 1024;
const GIB: u64 = MIB * 1024;

/// Maximum number of error lines kept in a [`BatchSummary`] report
pub const MAX_REPORTED_ERRORS: usize = 5;

/// Human-readable byte count ("512B", "1.5KB", "3.2MB", "1.0GB")
pub fn format_size(bytes: u64) -> String {
    if bytes < KIB {
        format!("{}B", bytes)
    } else if bytes < MIB {
        format!("{:.1}KB", bytes as f64 / KIB as f64)
    } else if bytes < GIB {
        format!("{:.1}MB", bytes as f64 / MIB as f64)
    } else {
        format!("{:.1}GB", bytes as f64 / GIB as f64)
    }
}

/// Human-readable transfer rate ("1.5MB/s")
pub fn format_speed(bytes_per_sec: f64) -> String {
    format!("{}/s", format_size(bytes_per_sec.max(0.0) as u64))
}

/// One-line description of a task's current state
pub fn describe_task(task: &DownloadTask) -> String {
    match task.status {
        TaskStatus::Pending => format!("{} pending", task.file_name),
        TaskStatus::Downloading if task.total_size > 0 => format!(
            "{} {:.1}% ({}/{})",
            task.file_name,
            task.progress_percent(),
            format_size(task.bytes_downloaded),
            format_size(task.total_size)
        ),
        TaskStatus::Downloading => format!(
            "{} {}",
            task.file_name,
            format_size(task.bytes_downloaded)
        ),
        TaskStatus::Completed => format!(
            "{} completed ({})",
            task.file_name,
            format_size(task.bytes_downloaded)
        ),
        TaskStatus::Failed => format!(
            "{} failed: {}",
            task.file_name,
            task.error.as_deref().unwrap_or("unknown error")
        ),
    }
}

/// Tracks transfer speed between successive progress snapshots of one task
#[derive(Debug)]
pub struct SpeedMeter {
    last_instant: Option<Instant>,
    last_bytes: u64,
}

impl Default for SpeedMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeedMeter {
    /// Create a meter with no samples
    pub fn new() -> Self {
        Self {
            last_instant: None,
            last_bytes: 0,
        }
    }

    /// Record a byte count and return the rate since the previous sample
    ///
    /// The first sample (and samples taken in the same instant) yield `None`.
    pub fn sample(&mut self, bytes_downloaded: u64) -> Option<f64> {
        self.sample_at(bytes_downloaded, Instant::now())
    }

    fn sample_at(&mut self, bytes_downloaded: u64, now: Instant) -> Option<f64> {
        let rate = self.last_instant.and_then(|last| {
            let elapsed = now.saturating_duration_since(last).as_secs_f64();
            (elapsed > 0.0)
                .then(|| bytes_downloaded.saturating_sub(self.last_bytes) as f64 / elapsed)
        });
        self.last_instant = Some(now);
        self.last_bytes = bytes_downloaded;
        rate
    }
}

/// Success/failure counts over a collection result
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Items whose audio was downloaded
    pub success: usize,
    /// Items that failed to resolve or transfer
    pub failed: usize,
    /// `"{item_id}: {error}"` for every failed item, in item order
    pub errors: Vec<String>,
}

impl BatchSummary {
    /// Tally a collection result
    pub fn from_results(results: &CollectionResult) -> Self {
        let mut summary = Self::default();
        for (id, outcome) in results {
            match outcome {
                ItemOutcome::Downloaded(_) => summary.success += 1,
                ItemOutcome::Failed(e) => {
                    summary.failed += 1;
                    summary.errors.push(format!("{}: {}", id, e));
                }
            }
        }
        summary
    }

    /// Total number of items
    pub fn total(&self) -> usize {
        self.success + self.failed
    }

    /// Multi-line report listing at most [`MAX_REPORTED_ERRORS`] errors
    pub fn report(&self) -> String {
        let mut out = format!(
            "batch finished: {} succeeded, {} failed",
            self.success, self.failed
        );
        for error in self.errors.iter().take(MAX_REPORTED_ERRORS) {
            out.push_str("\n  - ");
            out.push_str(error);
        }
        if self.errors.len() > MAX_REPORTED_ERRORS {
            out.push_str(&format!(
                "\n  ... and {} more",
                self.errors.len() - MAX_REPORTED_ERRORS
            ));
        }
        out
    }
}
