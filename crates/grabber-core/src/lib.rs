//! Media Grabber Core Library
//!
//! This crate provides the domain models, platform resolution, error taxonomy and
//! configuration shared by every media-grabber component.

pub mod backend_types;
pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use backend_types::{CacheBackend, StorageBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    CacheConfig, Config, DownloadConfig, DownloaderConfig, RateLimitConfig, ServerConfig,
    StorageConfig,
};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    DownloadGrant, FetchedArtifact, Platform, RateLimitWindow, SupportedUrl, VideoFormatDescriptor,
    VideoMetadata,
};
