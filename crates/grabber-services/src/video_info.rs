//! Metadata pipeline: cache-aside lookup of video information.

use std::sync::Arc;
use std::time::Duration;

use grabber_cache::CacheClient;
use grabber_core::constants::VIDEO_INFO_KEY_PREFIX;
use grabber_core::{AppError, Clock, SupportedUrl, VideoMetadata};
use grabber_downloader::{to_video_metadata, VideoDownloader};

use crate::errors::metadata_error;

#[derive(Clone)]
pub struct VideoInfoService {
    downloader: Arc<dyn VideoDownloader>,
    cache: CacheClient,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl VideoInfoService {
    pub fn new(
        downloader: Arc<dyn VideoDownloader>,
        cache: CacheClient,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            downloader,
            cache,
            clock,
            ttl,
        }
    }

    pub fn cache_key(url: &SupportedUrl) -> String {
        format!("{}{}", VIDEO_INFO_KEY_PREFIX, url.as_str())
    }

    /// Return metadata for `url`, from cache when present.
    ///
    /// Unsupported URLs are rejected before the cache is consulted.
    #[tracing::instrument(skip(self), fields(platform))]
    pub async fn get_info(&self, url: &str, request_id: &str) -> Result<VideoMetadata, AppError> {
        let url = SupportedUrl::parse(url)?;
        tracing::Span::current().record("platform", tracing::field::display(url.platform()));

        let key = Self::cache_key(&url);
        if let Some(cached) = self.cache.get_json::<VideoMetadata>(&key).await {
            tracing::info!(request_id = %request_id, cache_key = %key, "Cache hit for video info");
            return Ok(cached);
        }

        tracing::info!(
            request_id = %request_id,
            cache_key = %key,
            "Cache miss, fetching video info"
        );

        let provider = self
            .downloader
            .fetch_metadata(&url)
            .await
            .map_err(metadata_error)?;
        let metadata = to_video_metadata(provider, &url, self.clock.now_ms());

        self.cache.set_json(&key, &metadata, self.ttl).await;

        tracing::info!(
            request_id = %request_id,
            video_id = %metadata.id,
            formats = metadata.formats.len(),
            "Video info fetched"
        );

        Ok(metadata)
    }
}
