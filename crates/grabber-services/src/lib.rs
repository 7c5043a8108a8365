//! Media Grabber Services
//!
//! The request pipelines and their background work:
//! - [`VideoInfoService`]: cache-aside metadata lookup
//! - [`DownloadService`]: fetch, upload, sign, cache and schedule deletion
//! - [`CleanupScheduler`]: deferred best-effort deletion of uploaded objects

pub mod cleanup;
pub mod download;
mod errors;
pub mod video_info;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use cleanup::{CleanupScheduler, TokioCleanupScheduler};
pub use download::DownloadService;
pub use video_info::VideoInfoService;
