use std::time::Duration;

use thiserror::Error;

/// Downloader errors
#[derive(Debug, Error)]
pub enum DownloaderError {
    #[error("Failed to start downloader: {0}")]
    Spawn(String),

    #[error("Downloader exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("Downloader timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid downloader output: {0}")]
    InvalidOutput(String),

    #[error("No file was downloaded")]
    NoOutputFile,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for downloader operations
pub type DownloaderResult<T> = Result<T, DownloaderError>;
