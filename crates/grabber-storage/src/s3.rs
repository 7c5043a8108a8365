use std::path::Path as FsPath;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use grabber_core::Clock;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStore, ObjectStoreExt, PutMultipartOptions,
    Result as ObjectResult, WriteMultipart,
};
use tokio::io::AsyncReadExt;

use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;

/// Part size for multipart uploads (S3 minimum is 5 MiB).
const UPLOAD_PART_SIZE: usize = 8 * 1024 * 1024;
const READ_BUFFER_SIZE: usize = 256 * 1024;
/// Parts in flight per upload.
const MAX_CONCURRENT_PARTS: usize = 4;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    clock: Arc<dyn Clock>,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `clock` - Used to turn absolute link expiries into presign lifetimes
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        clock: Arc<dyn Clock>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            clock,
        })
    }
}

/// Stream `local_path` into `store` as a multipart upload tagged with
/// `content_type`. Memory use is bounded by `part_size` times the part
/// concurrency, whatever the file size. Returns the number of bytes written.
pub(crate) async fn stream_upload(
    store: &dyn ObjectStore,
    location: &Path,
    local_path: &FsPath,
    content_type: &str,
    part_size: usize,
) -> StorageResult<u64> {
    let mut file = tokio::fs::File::open(local_path).await.map_err(|e| {
        StorageError::UploadFailed(format!("Failed to open {}: {}", local_path.display(), e))
    })?;

    let opts = PutMultipartOptions {
        attributes: Attributes::from_iter([(Attribute::ContentType, content_type.to_string())]),
        ..Default::default()
    };
    let upload = store
        .put_multipart_opts(location, opts)
        .await
        .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
    let mut writer = WriteMultipart::new_with_chunk_size(upload, part_size);

    match copy_parts(&mut file, &mut writer).await {
        Ok(size) => {
            writer
                .finish()
                .await
                .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
            Ok(size)
        }
        Err(e) => {
            if let Err(abort_err) = writer.abort().await {
                tracing::warn!(
                    error = %abort_err,
                    location = %location,
                    "Failed to abort multipart upload"
                );
            }
            Err(e)
        }
    }
}

async fn copy_parts(
    file: &mut tokio::fs::File,
    writer: &mut WriteMultipart,
) -> StorageResult<u64> {
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let mut size = 0u64;

    loop {
        let read = file.read(&mut buf).await?;
        if read == 0 {
            return Ok(size);
        }
        writer
            .wait_for_capacity(MAX_CONCURRENT_PARTS)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        writer.write(&buf[..read]);
        size += read as u64;
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload_file(
        &self,
        local_path: &FsPath,
        storage_key: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        let location = Path::from(storage_key.to_string());
        let start = std::time::Instant::now();

        let size = stream_upload(
            &self.store,
            &location,
            local_path,
            content_type,
            UPLOAD_PART_SIZE,
        )
        .await
        .map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            e
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn signed_url(&self, storage_key: &str, expires_at_ms: i64) -> StorageResult<String> {
        // Presigned URLs have whole-second resolution; round down so the link
        // never outlives `expires_at_ms`.
        let remaining_secs = expires_at_ms.saturating_sub(self.clock.now_ms()) / 1000;
        if remaining_secs <= 0 {
            return Err(StorageError::SigningFailed(
                "Link expiry is already in the past".to_string(),
            ));
        }

        let location = Path::from(storage_key.to_string());
        let url_result: ObjectResult<_> = self
            .store
            .signed_url(
                Method::GET,
                &location,
                Duration::from_secs(remaining_secs as u64),
            )
            .await;

        let url = url_result
            .map_err(|e| StorageError::SigningFailed(e.to_string()))?
            .to_string();

        Ok(url)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let location = Path::from(storage_key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let location = Path::from(storage_key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use tempfile::TempDir;

    async fn source_file(dir: &TempDir, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join("clip.mp4");
        tokio::fs::write(&path, contents).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_stream_upload_sets_content_type() {
        let dir = TempDir::new().unwrap();
        let src = source_file(&dir, b"video-bytes").await;
        let store = InMemory::new();
        let location = Path::from("downloads/abc/clip.mp4");

        let size = stream_upload(&store, &location, &src, "video/mp4", UPLOAD_PART_SIZE)
            .await
            .unwrap();
        assert_eq!(size, 11);

        let object = store.get(&location).await.unwrap();
        assert_eq!(
            object
                .attributes
                .get(&Attribute::ContentType)
                .map(|v| v.as_ref()),
            Some("video/mp4")
        );
        assert_eq!(object.bytes().await.unwrap().as_ref(), b"video-bytes");
    }

    #[tokio::test]
    async fn test_stream_upload_splits_into_parts_in_order() {
        let dir = TempDir::new().unwrap();
        let contents: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let src = source_file(&dir, &contents).await;
        let store = InMemory::new();
        let location = Path::from("downloads/def/clip.webm");

        let size = stream_upload(&store, &location, &src, "video/webm", 1024)
            .await
            .unwrap();
        assert_eq!(size, 10_000);

        let stored = store.get(&location).await.unwrap().bytes().await.unwrap();
        assert_eq!(stored.as_ref(), contents.as_slice());
    }

    #[tokio::test]
    async fn test_missing_source_is_upload_failure() {
        let dir = TempDir::new().unwrap();
        let store = InMemory::new();
        let location = Path::from("downloads/ghi/clip.mp4");

        let result = stream_upload(
            &store,
            &location,
            &dir.path().join("missing.mp4"),
            "video/mp4",
            UPLOAD_PART_SIZE,
        )
        .await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
        assert!(store.head(&location).await.is_err());
    }
}
