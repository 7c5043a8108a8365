//! Limits, lifetimes and key prefixes shared across crates.

/// Cache key prefix for video metadata entries.
pub const VIDEO_INFO_KEY_PREFIX: &str = "video-info:";
/// Cache key prefix for download grants.
pub const DOWNLOAD_KEY_PREFIX: &str = "download:";
/// Cache key prefix owned by the admission gate.
pub const RATE_LIMIT_KEY_PREFIX: &str = "rate-limit:";

/// Storage key prefix for uploaded artifacts.
pub const DOWNLOADS_STORAGE_PREFIX: &str = "downloads";

pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 10;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECONDS: u64 = 60;
pub const DEFAULT_VIDEO_INFO_TTL_SECONDS: u64 = 3600;
pub const DEFAULT_DOWNLOAD_LINK_LIFETIME_MINUTES: u64 = 30;
pub const DEFAULT_CACHE_SWEEP_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_DOWNLOADER_TIMEOUT_SECONDS: u64 = 300;

pub const URL_MAX_LENGTH: u64 = 2048;
pub const FORMAT_ID_MAX_LENGTH: u64 = 100;

/// Client key used when no address can be derived from the request.
pub const UNKNOWN_CLIENT_KEY: &str = "unknown";
