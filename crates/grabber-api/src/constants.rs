//! API constants

/// API base path prefix (version-independent)
pub const API_BASE: &str = "/api";

pub const API_VERSION: &str = "v1";

/// Versioned prefix for every pipeline route.
pub const API_PREFIX: &str = "/api/v1";

/// Service version reported by the health endpoint.
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const RATE_LIMIT_LIMIT_HEADER: &str = "X-RateLimit-Limit";
pub const RATE_LIMIT_REMAINING_HEADER: &str = "X-RateLimit-Remaining";

/// Request bodies are a URL and a format id; anything larger is rejected.
pub const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024;

pub const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 10_000;
