//! Error types for bili-audio-dl
//!
//! This module provides the error handling for the library:
//! - A top-level [`Error`] covering API, login, configuration and I/O failures
//! - A [`DownloadError`] describing why a single file transfer failed
//! - Machine-readable error codes for consumers that log or display errors

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bili-audio-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for bili-audio-dl
///
/// Each variant includes enough context to diagnose the failure without
/// re-running the request.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "max_concurrent_downloads")
        key: Option<String>,
    },

    /// A required identifying parameter was missing or out of range
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Network error from the HTTP client
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status from an API endpoint
    #[error("HTTP error {status} from {url}")]
    Http {
        /// HTTP status code returned by the server
        status: u16,
        /// The requested URL
        url: String,
    },

    /// The platform answered with a non-zero `code` in its response envelope
    #[error("API error {code}: {message}")]
    Api {
        /// Platform error code (e.g., -101 for "not logged in")
        code: i64,
        /// Message returned by the platform
        message: String,
    },

    /// A response document was missing an expected field
    #[error("parse error: {0}")]
    Parse(String),

    /// QR-code login failed (expired code, polling exhausted, bad credential URL)
    #[error("login error: {0}")]
    Login(String),

    /// No usable audio stream could be resolved for an item
    #[error("no usable audio stream for {item}")]
    NoStream {
        /// Human-readable item label (title or id)
        item: String,
    },

    /// A single file transfer failed
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation not supported
    #[error("not supported: {0}")]
    NotSupported(String),
}

/// Reasons a single file transfer can fail
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Connecting to or requesting the source URL failed
    #[error("request to {url} failed: {reason}")]
    Request {
        /// The source URL
        url: String,
        /// Underlying transport error text
        reason: String,
    },

    /// The server answered with a non-success status
    #[error("HTTP status {status} for {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// The source URL
        url: String,
    },

    /// Reading the response body failed mid-transfer
    #[error("stream interrupted after {received} bytes: {reason}")]
    Stream {
        /// Bytes received before the failure
        received: u64,
        /// Underlying transport error text
        reason: String,
    },

    /// Creating the destination directory failed
    #[error("failed to create directory {path}: {reason}")]
    CreateDir {
        /// The directory that could not be created
        path: PathBuf,
        /// Underlying I/O error text
        reason: String,
    },

    /// Opening or writing the destination file failed
    #[error("failed to write {path}: {reason}")]
    Write {
        /// The destination file
        path: PathBuf,
        /// Underlying I/O error text
        reason: String,
    },

    /// A batch-level transfer ended without success; carries the task's error text
    #[error("{0}")]
    Failed(String),
}

impl Error {
    /// Get the machine-readable error code
    pub fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidInput(_) => "invalid_input",
            Error::Network(_) => "network_error",
            Error::Http { .. } => "http_error",
            Error::Api { .. } => "api_error",
            Error::Parse(_) => "parse_error",
            Error::Login(_) => "login_error",
            Error::NoStream { .. } => "no_stream",
            Error::Download(e) => match e {
                DownloadError::Request { .. } => "request_failed",
                DownloadError::Status { .. } => "bad_status",
                DownloadError::Stream { .. } => "stream_interrupted",
                DownloadError::CreateDir { .. } => "create_dir_failed",
                DownloadError::Write { .. } => "write_failed",
                DownloadError::Failed(_) => "download_failed",
            },
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::NotSupported(_) => "not_supported",
        }
    }

    /// Whether the error was caused by the caller's input rather than I/O
    ///
    /// Input errors are raised before any request is sent.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::Config { .. } | Error::InvalidInput(_))
    }
}
