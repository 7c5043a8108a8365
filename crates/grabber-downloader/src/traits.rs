use async_trait::async_trait;
use grabber_core::{FetchedArtifact, SupportedUrl};

use crate::error::DownloaderResult;
use crate::provider::ProviderMetadata;

/// Video fetching engine.
///
/// Implementations may be slow and must enforce their own timeouts.
#[async_trait]
pub trait VideoDownloader: Send + Sync {
    /// Fetch metadata and the list of available formats.
    async fn fetch_metadata(&self, url: &SupportedUrl) -> DownloaderResult<ProviderMetadata>;

    /// Fetch the rendition identified by `format_id` to local disk.
    ///
    /// The returned artifact belongs to the caller, which must delete it.
    async fn fetch_file(&self, url: &SupportedUrl, format_id: &str)
        -> DownloaderResult<FetchedArtifact>;
}
