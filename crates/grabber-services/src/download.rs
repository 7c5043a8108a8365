//! Download pipeline.
//!
//! Fetches the requested format to a scratch location, uploads it under a fresh
//! key, issues a signed link and caches the resulting grant for exactly the
//! link lifetime. The uploaded object is scheduled for deletion at the instant
//! the link expires, so a cached grant never outlives its object.
//!
//! The local artifact is removed on every path once the fetch has succeeded.

use std::sync::Arc;
use std::time::Duration;

use grabber_cache::CacheClient;
use grabber_core::constants::DOWNLOAD_KEY_PREFIX;
use grabber_core::{AppError, Clock, DownloadGrant, FetchedArtifact, SupportedUrl};
use grabber_downloader::VideoDownloader;
use grabber_storage::{generate_download_key, Storage};

use crate::cleanup::CleanupScheduler;
use crate::errors::{download_error, storage_error};

#[derive(Clone)]
pub struct DownloadService {
    downloader: Arc<dyn VideoDownloader>,
    storage: Arc<dyn Storage>,
    cache: CacheClient,
    scheduler: Arc<dyn CleanupScheduler>,
    clock: Arc<dyn Clock>,
    lifetime: Duration,
}

impl DownloadService {
    pub fn new(
        downloader: Arc<dyn VideoDownloader>,
        storage: Arc<dyn Storage>,
        cache: CacheClient,
        scheduler: Arc<dyn CleanupScheduler>,
        clock: Arc<dyn Clock>,
        lifetime: Duration,
    ) -> Self {
        Self {
            downloader,
            storage,
            cache,
            scheduler,
            clock,
            lifetime,
        }
    }

    pub fn cache_key(url: &SupportedUrl, format_id: &str) -> String {
        format!("{}{}:{}", DOWNLOAD_KEY_PREFIX, url.as_str(), format_id)
    }

    /// Produce a signed download link for `format_id` of `url`.
    ///
    /// A cached grant is returned unchanged while it is still valid.
    #[tracing::instrument(skip(self), fields(platform))]
    pub async fn download(
        &self,
        url: &str,
        format_id: &str,
        request_id: &str,
    ) -> Result<DownloadGrant, AppError> {
        let url = SupportedUrl::parse(url)?;
        tracing::Span::current().record("platform", tracing::field::display(url.platform()));

        let format_id = format_id.trim();
        if format_id.is_empty() {
            return Err(AppError::Validation("Format ID is required".to_string()));
        }

        let key = Self::cache_key(&url, format_id);
        if let Some(grant) = self.cache.get_json::<DownloadGrant>(&key).await {
            if grant.is_valid_at(self.clock.now_ms()) {
                tracing::info!(
                    request_id = %request_id,
                    cache_key = %key,
                    expires_at_ms = grant.expires_at_epoch_ms,
                    "Cache hit for download"
                );
                return Ok(grant);
            }
            tracing::debug!(cache_key = %key, "Cached grant expired, downloading again");
        }

        tracing::info!(request_id = %request_id, cache_key = %key, "Cache miss, downloading");

        let artifact = self
            .downloader
            .fetch_file(&url, format_id)
            .await
            .map_err(download_error)?;

        let storage_key = generate_download_key(&artifact.file_name);
        let stored = self.store_artifact(&artifact, &storage_key).await;

        remove_artifact(&artifact).await;

        let (signed_url, expires_at_ms) = stored?;

        let grant = DownloadGrant {
            signed_url,
            file_name: artifact.file_name,
            mime_type: artifact.mime_type,
            size_bytes: artifact.size_bytes,
            expires_at_epoch_ms: expires_at_ms,
        };

        self.cache.set_json(&key, &grant, self.lifetime).await;

        if let Err(e) = self.scheduler.schedule_deletion(&storage_key, expires_at_ms) {
            tracing::error!(
                error = %e,
                request_id = %request_id,
                storage_key = %storage_key,
                "Failed to schedule deletion of uploaded file"
            );
        }

        tracing::info!(
            request_id = %request_id,
            storage_key = %storage_key,
            size_bytes = grant.size_bytes,
            expires_at_ms,
            "Download ready"
        );

        Ok(grant)
    }

    /// Upload the artifact and sign a link to it, returning the link and the
    /// instant it stops working.
    ///
    /// The expiry is fixed once the upload has finished and handed to the
    /// backend as an absolute instant, so the link, the grant and the scheduled
    /// deletion all share it. If signing fails the uploaded object is deleted
    /// straight away, since no grant will ever reference it.
    async fn store_artifact(
        &self,
        artifact: &FetchedArtifact,
        storage_key: &str,
    ) -> Result<(String, i64), AppError> {
        self.storage
            .upload_file(&artifact.local_file_path, storage_key, &artifact.mime_type)
            .await
            .map_err(storage_error)?;

        let expires_at_ms = self
            .clock
            .now_ms()
            .saturating_add(duration_ms(self.lifetime));

        match self.storage.signed_url(storage_key, expires_at_ms).await {
            Ok(url) => Ok((url, expires_at_ms)),
            Err(e) => {
                if let Err(delete_err) = self.storage.delete(storage_key).await {
                    tracing::warn!(
                        error = %delete_err,
                        storage_key = %storage_key,
                        "Failed to delete unsigned upload"
                    );
                }
                Err(storage_error(e))
            }
        }
    }
}

fn duration_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Remove the scratch directory if the downloader reported one, else the file.
async fn remove_artifact(artifact: &FetchedArtifact) {
    let result = match &artifact.scratch_dir {
        Some(dir) => tokio::fs::remove_dir_all(dir).await,
        None => tokio::fs::remove_file(&artifact.local_file_path).await,
    };

    if let Err(e) = result {
        tracing::warn!(
            error = %e,
            path = %artifact.local_file_path.display(),
            "Failed to remove temporary download"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        MockDownloader, MockStorage, RecordingScheduler, UnavailableCache, INSTAGRAM_URL,
        YOUTUBE_URL,
    };
    use grabber_cache::MemoryCache;
    use grabber_core::{ErrorMetadata, ManualClock};
    use grabber_storage::{LocalStorage, StorageError};

    const LIFETIME: Duration = Duration::from_secs(30 * 60);
    const START_MS: i64 = 1_700_000_000_000;

    struct Harness {
        service: DownloadService,
        downloader: MockDownloader,
        storage: MockStorage,
        scheduler: RecordingScheduler,
        clock: Arc<ManualClock>,
    }

    fn harness_with(downloader: MockDownloader, scheduler: RecordingScheduler) -> Harness {
        let clock = Arc::new(ManualClock::from_millis(START_MS));
        let storage = MockStorage::new();
        let cache = CacheClient::new(Arc::new(MemoryCache::new(clock.clone())));
        let service = DownloadService::new(
            Arc::new(downloader.clone()),
            Arc::new(storage.clone()),
            cache,
            Arc::new(scheduler.clone()),
            clock.clone(),
            LIFETIME,
        );
        Harness {
            service,
            downloader,
            storage,
            scheduler,
            clock,
        }
    }

    fn harness() -> Harness {
        harness_with(MockDownloader::new(), RecordingScheduler::new())
    }

    fn scratch_dirs(downloader: &MockDownloader) -> Vec<std::path::PathBuf> {
        downloader
            .artifacts()
            .into_iter()
            .filter_map(|a| a.scratch_dir)
            .collect()
    }

    #[tokio::test]
    async fn test_download_issues_grant_and_schedules_deletion() {
        let h = harness();

        let grant = h.service.download(YOUTUBE_URL, "18", "req-1").await.unwrap();

        assert_eq!(grant.file_name, "Sample clip.mp4");
        assert_eq!(grant.mime_type, "video/mp4");
        assert_eq!(grant.size_bytes, b"mock-video-bytes".len() as u64);
        assert_eq!(grant.expires_at_epoch_ms, START_MS + 30 * 60 * 1000);

        let uploaded = h.storage.uploaded_keys();
        assert_eq!(uploaded.len(), 1);
        assert!(uploaded[0].starts_with("downloads/"));
        assert!(uploaded[0].ends_with("/Sample clip.mp4"));
        assert!(h.storage.contains(&uploaded[0]));
        assert!(grant.signed_url.contains(&uploaded[0]));

        assert_eq!(
            h.storage.signed_links(),
            vec![(uploaded[0].clone(), grant.expires_at_epoch_ms)]
        );
        assert_eq!(
            h.scheduler.scheduled(),
            vec![(uploaded[0].clone(), grant.expires_at_epoch_ms)]
        );
    }

    #[tokio::test]
    async fn test_local_artifact_removed_after_success() {
        let h = harness();
        h.service.download(YOUTUBE_URL, "18", "req-1").await.unwrap();

        let dirs = scratch_dirs(&h.downloader);
        assert_eq!(dirs.len(), 1);
        assert!(!dirs[0].exists());
    }

    #[tokio::test]
    async fn test_upload_failure_cleans_up_and_reports_storage_failure() {
        let h = harness();
        h.storage.fail_uploads(true);

        let err = h
            .service
            .download(YOUTUBE_URL, "18", "req-1")
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "DOWNLOAD_ERROR");
        assert!(err.client_message().starts_with("Storage failure:"));

        let dirs = scratch_dirs(&h.downloader);
        assert_eq!(dirs.len(), 1);
        assert!(!dirs[0].exists());
        assert!(h.scheduler.scheduled().is_empty());
    }

    #[tokio::test]
    async fn test_failed_attempt_is_not_cached() {
        let h = harness();
        h.storage.fail_uploads(true);
        assert!(h.service.download(YOUTUBE_URL, "18", "req-1").await.is_err());

        h.storage.fail_uploads(false);
        h.service.download(YOUTUBE_URL, "18", "req-2").await.unwrap();
        assert_eq!(h.downloader.file_calls(), 2);
    }

    #[tokio::test]
    async fn test_signing_failure_deletes_uploaded_object() {
        let h = harness();
        h.storage.fail_signing(true);

        let err = h
            .service
            .download(YOUTUBE_URL, "18", "req-1")
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "DOWNLOAD_ERROR");

        let uploaded = h.storage.uploaded_keys();
        assert_eq!(uploaded.len(), 1);
        assert_eq!(h.storage.deleted_keys(), uploaded);
        assert!(!h.storage.contains(&uploaded[0]));
        assert!(h.scheduler.scheduled().is_empty());
        assert!(!scratch_dirs(&h.downloader)[0].exists());
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_upload() {
        let h = harness_with(
            MockDownloader::new().failing_file("Requested format is not available"),
            RecordingScheduler::new(),
        );

        let err = h
            .service
            .download(YOUTUBE_URL, "999", "req-1")
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "DOWNLOAD_ERROR");
        assert!(err.client_message().starts_with("Download failed:"));
        assert!(err.client_message().contains("Requested format is not available"));
        assert!(h.storage.uploaded_keys().is_empty());
    }

    #[tokio::test]
    async fn test_valid_cached_grant_is_reused() {
        let h = harness();

        let first = h.service.download(YOUTUBE_URL, "18", "req-1").await.unwrap();
        h.clock.advance(Duration::from_secs(29 * 60));
        let second = h.service.download(YOUTUBE_URL, "18", "req-2").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(h.downloader.file_calls(), 1);
        assert_eq!(h.storage.uploaded_keys().len(), 1);
    }

    #[tokio::test]
    async fn test_expired_grant_triggers_new_download() {
        let h = harness();

        let first = h.service.download(YOUTUBE_URL, "18", "req-1").await.unwrap();
        h.clock.advance(LIFETIME);
        let second = h.service.download(YOUTUBE_URL, "18", "req-2").await.unwrap();

        assert_eq!(h.downloader.file_calls(), 2);
        assert_ne!(first.signed_url, second.signed_url);
        assert_eq!(
            second.expires_at_epoch_ms,
            first.expires_at_epoch_ms + 30 * 60 * 1000
        );

        let uploaded = h.storage.uploaded_keys();
        assert_eq!(uploaded.len(), 2);
        assert_ne!(uploaded[0], uploaded[1]);
    }

    #[tokio::test]
    async fn test_formats_are_cached_separately() {
        let h = harness();

        h.service.download(INSTAGRAM_URL, "18", "req-1").await.unwrap();
        h.service.download(INSTAGRAM_URL, "140", "req-2").await.unwrap();
        assert_eq!(h.downloader.file_calls(), 2);
    }

    #[tokio::test]
    async fn test_scheduler_failure_still_returns_grant() {
        let h = harness_with(MockDownloader::new(), RecordingScheduler::failing());

        let grant = h.service.download(YOUTUBE_URL, "18", "req-1").await.unwrap();
        assert_eq!(grant.expires_at_epoch_ms, START_MS + 30 * 60 * 1000);
    }

    #[tokio::test]
    async fn test_empty_format_id_is_validation_error() {
        let h = harness();

        let err = h.service.download(YOUTUBE_URL, "  ", "req-1").await.unwrap_err();
        assert_eq!(err, AppError::Validation("Format ID is required".to_string()));
        assert_eq!(h.downloader.file_calls(), 0);
    }

    #[tokio::test]
    async fn test_expiry_is_fixed_after_upload() {
        let h = harness();
        h.storage
            .advance_clock_during_upload(h.clock.clone(), Duration::from_secs(300));

        let grant = h.service.download(YOUTUBE_URL, "18", "req-1").await.unwrap();

        let expected = START_MS + 300_000 + 30 * 60 * 1000;
        assert_eq!(grant.expires_at_epoch_ms, expected);
        let uploaded = h.storage.uploaded_keys();
        assert_eq!(h.storage.signed_links(), vec![(uploaded[0].clone(), expected)]);
        assert_eq!(h.scheduler.scheduled(), vec![(uploaded[0].clone(), expected)]);
    }

    #[tokio::test]
    async fn test_slow_upload_link_expires_with_grant() {
        let dir = tempfile::TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::from_millis(START_MS));
        let local = Arc::new(
            LocalStorage::new(
                dir.path().join("store"),
                "http://localhost:8080/files".to_string(),
                b"download-pipeline-test-secret".to_vec(),
                clock.clone(),
            )
            .await
            .unwrap(),
        );
        let slow = SlowUpload {
            inner: local.clone(),
            clock: clock.clone(),
            takes: Duration::from_secs(300),
        };
        let scheduler = RecordingScheduler::new();
        let service = DownloadService::new(
            Arc::new(MockDownloader::new()),
            Arc::new(slow),
            CacheClient::new(Arc::new(MemoryCache::new(clock.clone()))),
            Arc::new(scheduler.clone()),
            clock.clone(),
            LIFETIME,
        );

        let grant = service.download(YOUTUBE_URL, "18", "req-1").await.unwrap();
        let token = grant.signed_url.rsplit('/').next().unwrap().to_string();

        clock.set_millis(grant.expires_at_epoch_ms - 1);
        assert!(local.resolve_token(&token).await.is_ok());

        clock.set_millis(grant.expires_at_epoch_ms);
        assert!(matches!(
            local.resolve_token(&token).await,
            Err(StorageError::NotFound(_))
        ));
        assert_eq!(scheduler.scheduled()[0].1, grant.expires_at_epoch_ms);
    }

    /// Local storage whose uploads take simulated time.
    struct SlowUpload {
        inner: Arc<LocalStorage>,
        clock: Arc<ManualClock>,
        takes: Duration,
    }

    #[async_trait::async_trait]
    impl Storage for SlowUpload {
        async fn upload_file(
            &self,
            local_path: &std::path::Path,
            storage_key: &str,
            content_type: &str,
        ) -> grabber_storage::StorageResult<()> {
            self.inner
                .upload_file(local_path, storage_key, content_type)
                .await?;
            self.clock.advance(self.takes);
            Ok(())
        }

        async fn signed_url(
            &self,
            storage_key: &str,
            expires_at_ms: i64,
        ) -> grabber_storage::StorageResult<String> {
            self.inner.signed_url(storage_key, expires_at_ms).await
        }

        async fn delete(&self, storage_key: &str) -> grabber_storage::StorageResult<()> {
            self.inner.delete(storage_key).await
        }

        async fn exists(&self, storage_key: &str) -> grabber_storage::StorageResult<bool> {
            self.inner.exists(storage_key).await
        }

        fn backend_type(&self) -> grabber_storage::StorageBackend {
            self.inner.backend_type()
        }
    }

    #[tokio::test]
    async fn test_unsupported_url_is_rejected_first() {
        let downloader = MockDownloader::new();
        let storage = MockStorage::new();
        let cache = UnavailableCache::new();
        let service = DownloadService::new(
            Arc::new(downloader.clone()),
            Arc::new(storage.clone()),
            CacheClient::new(Arc::new(cache.clone())),
            Arc::new(RecordingScheduler::new()),
            Arc::new(ManualClock::from_millis(START_MS)),
            LIFETIME,
        );

        let err = service
            .download("https://example.com/video.mp4", "18", "req-1")
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_PLATFORM");
        assert_eq!(cache.calls(), 0);
        assert_eq!(downloader.file_calls(), 0);
        assert!(storage.uploaded_keys().is_empty());
    }

    #[tokio::test]
    async fn test_short_link_download_end_to_end() {
        let h = harness();

        let grant = h
            .service
            .download("https://youtu.be/abc123", "22", "req-1")
            .await
            .unwrap();

        let url = SupportedUrl::parse("https://youtu.be/abc123").unwrap();
        assert_eq!(
            DownloadService::cache_key(&url, "22"),
            "download:https://youtu.be/abc123:22"
        );
        assert_eq!(grant.file_name, "Sample clip.mp4");
        assert_eq!(grant.mime_type, "video/mp4");
        assert_eq!(grant.expires_at_epoch_ms, START_MS + 30 * 60 * 1000);
        assert_eq!(h.downloader.file_calls(), 1);
        assert_eq!(h.storage.uploaded_keys().len(), 1);
        assert!(!scratch_dirs(&h.downloader)[0].exists());

        h.clock.advance(Duration::from_secs(60));
        let again = h
            .service
            .download("https://youtu.be/abc123", "22", "req-2")
            .await
            .unwrap();
        assert_eq!(again, grant);
        assert_eq!(h.downloader.file_calls(), 1);
    }
}
