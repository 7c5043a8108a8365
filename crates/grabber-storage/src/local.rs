use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use grabber_core::Clock;
use tokio::fs;

use crate::signed_token;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;

/// Local filesystem storage implementation
///
/// Signed links point at `{base_url}/{token}` where the token is an HMAC over
/// the storage key and expiry. The HTTP layer resolves them with
/// [`LocalStorage::resolve_token`].
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    signing_secret: Vec<u8>,
    clock: Arc<dyn Clock>,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/grabber/storage")
    /// * `base_url` - Base URL of the signed file route (e.g., "http://localhost:8080/files")
    /// * `signing_secret` - HMAC key for link tokens
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        signing_secret: Vec<u8>,
        clock: Arc<dyn Clock>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        if signing_secret.is_empty() {
            return Err(StorageError::ConfigError(
                "Signing secret must not be empty".to_string(),
            ));
        }

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
            signing_secret,
            clock,
        })
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Rejects keys that could escape the base storage directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty()
            || storage_key.contains("..")
            || storage_key.starts_with('/')
            || storage_key.contains('\\')
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        let path = self.base_path.join(storage_key);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    fn generate_url(&self, token: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), token)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Resolve a link token to the file it grants, if the token is genuine,
    /// unexpired and the file still exists.
    pub async fn resolve_token(&self, token: &str) -> StorageResult<(String, PathBuf)> {
        let storage_key = signed_token::verify(token, &self.signing_secret, self.clock.now_ms())?;
        let path = self.key_to_path(&storage_key)?;

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok((storage_key, path)),
            Ok(_) => Err(StorageError::NotFound(storage_key)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(storage_key))
            }
            Err(e) => Err(StorageError::IoError(e)),
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_file(
        &self,
        local_path: &Path,
        storage_key: &str,
        _content_type: &str,
    ) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let size = fs::copy(local_path, &path).await.map_err(|e| {
            tracing::error!(
                error = %e,
                key = %storage_key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Local upload failed"
            );
            StorageError::UploadFailed(format!(
                "Failed to copy {} to {}: {}",
                local_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::info!(
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local upload successful"
        );

        Ok(())
    }

    async fn signed_url(&self, storage_key: &str, expires_at_ms: i64) -> StorageResult<String> {
        // Validate before signing so a bad key never yields a link.
        self.key_to_path(storage_key)?;

        let token = signed_token::create(storage_key, expires_at_ms, &self.signing_secret)?;

        Ok(self.generate_url(&token))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(key = %storage_key, "Local file already absent");
                return Ok(());
            }
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        // Drop the per-download directory once it is empty.
        if let Some(parent) = path.parent() {
            if parent != self.base_path {
                let _ = fs::remove_dir(parent).await;
            }
        }

        tracing::info!(key = %storage_key, "Local delete successful");
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
