#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use grabber_core::{Clock, StorageConfig};
use std::sync::Arc;

/// Storage created from configuration.
///
/// `local_files` is set only for the local backend, whose signed links are
/// served by this process.
#[derive(Clone)]
pub struct StorageHandles {
    pub storage: Arc<dyn Storage>,
    #[cfg(feature = "storage-local")]
    pub local_files: Option<Arc<LocalStorage>>,
}

/// Create a storage backend based on configuration
pub async fn create_storage(
    config: &StorageConfig,
    clock: Arc<dyn Clock>,
) -> StorageResult<StorageHandles> {
    match config.backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let storage =
                S3Storage::new(bucket, region, config.s3_endpoint.clone(), clock).await?;
            tracing::info!("Using S3 storage backend");
            Ok(StorageHandles {
                storage: Arc::new(storage),
                #[cfg(feature = "storage-local")]
                local_files: None,
            })
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config.local_base_url.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
            })?;
            let secret = match config.signing_secret.as_deref() {
                Some(secret) if !secret.is_empty() => secret.as_bytes().to_vec(),
                _ => {
                    tracing::warn!(
                        "STORAGE_SIGNING_SECRET not set; using an ephemeral secret, links will not survive a restart"
                    );
                    ephemeral_secret()
                }
            };

            let storage = Arc::new(LocalStorage::new(base_path, base_url, secret, clock).await?);
            tracing::info!("Using local filesystem storage backend");
            Ok(StorageHandles {
                storage: storage.clone(),
                local_files: Some(storage),
            })
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

#[cfg(feature = "storage-local")]
fn ephemeral_secret() -> Vec<u8> {
    let mut secret = Vec::with_capacity(32);
    secret.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
    secret.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
    secret
}
