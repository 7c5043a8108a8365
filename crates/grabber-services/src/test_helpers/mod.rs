//! Test helpers for pipeline and HTTP tests
//!
//! Mock implementations of the downloader, storage, scheduler and cache ports
//! plus fixtures, so pipelines can be exercised without yt-dlp, a bucket or a
//! database.

pub mod fixtures;
pub mod mock_cache;
pub mod mock_downloader;
pub mod mock_scheduler;
pub mod mock_storage;

pub use fixtures::*;
pub use mock_cache::UnavailableCache;
pub use mock_downloader::MockDownloader;
pub use mock_scheduler::RecordingScheduler;
pub use mock_storage::MockStorage;
