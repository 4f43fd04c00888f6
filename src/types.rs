//! Core types: download task records, item identities and progress callbacks

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Download task status
///
/// Linear state machine: `Pending → Downloading → {Completed | Failed}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Created, not yet started
    Pending,
    /// Bytes are being transferred
    Downloading,
    /// Successfully completed
    Completed,
    /// Failed with error
    Failed,
}

impl TaskStatus {
    /// Whether no further transitions are allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (*self, next),
            (TaskStatus::Pending, TaskStatus::Downloading)
                | (TaskStatus::Downloading, TaskStatus::Completed)
                | (TaskStatus::Downloading, TaskStatus::Failed)
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Downloading => "downloading",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One in-flight or completed single-file download
///
/// Owned by the download call that created it; observers only ever see
/// `&DownloadTask` snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadTask {
    /// URL being fetched
    pub source_url: String,
    /// Where the bytes are written
    pub destination_path: PathBuf,
    /// Final path component of `destination_path`
    pub file_name: String,
    /// Declared content length (0 while unknown or when the server omits it)
    pub total_size: u64,
    /// Bytes written so far
    pub bytes_downloaded: u64,
    /// Current state
    pub status: TaskStatus,
    /// Error description, set only when `status` is `Failed`
    pub error: Option<String>,
}

impl DownloadTask {
    /// Create a pending task for `source_url` → `destination_path`
    pub fn new(source_url: impl Into<String>, destination_path: impl AsRef<Path>) -> Self {
        let destination_path = destination_path.as_ref().to_path_buf();
        let file_name = destination_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            source_url: source_url.into(),
            destination_path,
            file_name,
            total_size: 0,
            bytes_downloaded: 0,
            status: TaskStatus::Pending,
            error: None,
        }
    }

    /// Move to `Downloading`. Returns false if the task is not pending.
    pub(crate) fn start(&mut self) -> bool {
        self.transition(TaskStatus::Downloading)
    }

    /// Record a written chunk
    pub(crate) fn record_chunk(&mut self, len: usize) {
        if self.status == TaskStatus::Downloading {
            self.bytes_downloaded += len as u64;
        }
    }

    /// Move to `Completed`. Returns false if the task is not downloading.
    pub(crate) fn complete(&mut self) -> bool {
        self.transition(TaskStatus::Completed)
    }

    /// Move to `Failed` with an error description. Returns false unless downloading.
    pub(crate) fn fail(&mut self, error: impl Into<String>) -> bool {
        if self.transition(TaskStatus::Failed) {
            self.error = Some(error.into());
            true
        } else {
            false
        }
    }

    fn transition(&mut self, next: TaskStatus) -> bool {
        if self.status.can_transition_to(next) {
            self.status = next;
            true
        } else {
            false
        }
    }

    /// Progress in percent (0.0 when the total size is unknown)
    pub fn progress_percent(&self) -> f64 {
        if self.total_size == 0 {
            return 0.0;
        }
        (self.bytes_downloaded as f64 / self.total_size as f64) * 100.0
    }

    /// Whether the task finished successfully
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Identity of an item in a collection (the platform's numeric media id)
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl ItemId {
    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-item outcome of a collection download
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemOutcome {
    /// The audio track was written to this path
    Downloaded(PathBuf),
    /// Resolution or transfer failed
    Failed(String),
}

impl ItemOutcome {
    /// Whether the item was downloaded
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Downloaded(_))
    }

    /// Path of the downloaded file, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            ItemOutcome::Downloaded(p) => Some(p),
            ItemOutcome::Failed(_) => None,
        }
    }

    /// Error message, if the item failed
    pub fn error(&self) -> Option<&str> {
        match self {
            ItemOutcome::Downloaded(_) => None,
            ItemOutcome::Failed(e) => Some(e),
        }
    }
}

/// Result of a collection download, keyed by item identity
pub type CollectionResult = BTreeMap<ItemId, ItemOutcome>;

/// Observer of single-file progress; may be called from several tasks at once
pub type ProgressCallback = Arc<dyn Fn(&DownloadTask) + Send + Sync>;

/// Observer of collection progress: `(completed, total, current item label)`
pub type ItemProgressCallback = Arc<dyn Fn(usize, usize, &str) + Send + Sync>;
