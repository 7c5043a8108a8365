//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::StorageBackend;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Invalid file token: {0}")]
    InvalidToken(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this trait so the
/// download pipeline never couples to a specific backend.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload a local file to `storage_key`.
    async fn upload_file(
        &self,
        local_path: &Path,
        storage_key: &str,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Issue a GET link for `storage_key` that stops working at `expires_at_ms`
    /// (epoch milliseconds).
    async fn signed_url(&self, storage_key: &str, expires_at_ms: i64) -> StorageResult<String>;

    /// Delete a file by its storage key
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
