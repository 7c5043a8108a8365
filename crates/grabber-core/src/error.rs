//! Error types module
//!
//! Every failure that leaves a pipeline is one of the classified `AppError` variants.
//! Collaborator errors (cache, storage, downloader) are mapped into this closed set
//! at the pipeline boundary and never cross it in their own shape.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for rejections and upstream absence
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "DOWNLOAD_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimitExceeded { retry_after_secs: u64 },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub const DEFAULT_VIDEO_NOT_FOUND: &'static str = "Video not found or unavailable";
    pub const DEFAULT_DOWNLOAD: &'static str = "Failed to download video";
    pub const DEFAULT_RATE_LIMIT: &'static str = "Too many requests. Please try again later.";

    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::UnsupportedPlatform(_) => "UnsupportedPlatform",
            AppError::VideoNotFound(_) => "VideoNotFound",
            AppError::Download(_) => "Download",
            AppError::RateLimitExceeded { .. } => "RateLimitExceeded",
            AppError::Validation(_) => "Validation",
        }
    }

    /// Seconds the client should wait before retrying, when the error says so.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            AppError::RateLimitExceeded { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::UnsupportedPlatform(_) => (
            400,
            "UNSUPPORTED_PLATFORM",
            false,
            Some("Use a YouTube or Instagram video URL"),
            false,
            LogLevel::Debug,
        ),
        AppError::VideoNotFound(_) => (
            404,
            "VIDEO_NOT_FOUND",
            false,
            Some("Check that the video exists and is publicly available"),
            false,
            LogLevel::Warn,
        ),
        AppError::Download(_) => (
            500,
            "DOWNLOAD_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::RateLimitExceeded { .. } => (
            429,
            "RATE_LIMIT_EXCEEDED",
            true,
            Some("Wait for the rate limit window to reset and retry"),
            false,
            LogLevel::Warn,
        ),
        AppError::Validation(_) => (
            400,
            "VALIDATION_ERROR",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::UnsupportedPlatform(ref msg) => msg.clone(),
            AppError::VideoNotFound(ref msg) => msg.clone(),
            AppError::Download(ref msg) => msg.clone(),
            AppError::RateLimitExceeded { .. } => Self::DEFAULT_RATE_LIMIT.to_string(),
            AppError::Validation(ref msg) => msg.clone(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON parsing error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_unsupported_platform() {
        let err = AppError::UnsupportedPlatform("Unsupported platform".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "UNSUPPORTED_PLATFORM");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Unsupported platform");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_video_not_found() {
        let err = AppError::VideoNotFound(AppError::DEFAULT_VIDEO_NOT_FOUND.to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "VIDEO_NOT_FOUND");
        assert!(!err.is_recoverable());
        assert!(!err.is_sensitive());
    }

    #[test]
    fn test_error_metadata_download() {
        let err = AppError::Download("yt-dlp exited with status 1".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DOWNLOAD_ERROR");
        assert!(err.is_recoverable());
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_rate_limit() {
        let err = AppError::RateLimitExceeded {
            retry_after_secs: 42,
        };
        assert_eq!(err.http_status_code(), 429);
        assert_eq!(err.error_code(), "RATE_LIMIT_EXCEEDED");
        assert!(err.is_recoverable());
        assert_eq!(err.retry_after_secs(), Some(42));
        assert_eq!(err.client_message(), AppError::DEFAULT_RATE_LIMIT);
    }

    #[test]
    fn test_error_metadata_validation() {
        let err = AppError::Validation("Format ID is required".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.retry_after_secs(), None);
        assert_eq!(err.error_type(), "Validation");
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            AppError::UnsupportedPlatform(String::new()),
            AppError::VideoNotFound(String::new()),
            AppError::Download(String::new()),
            AppError::RateLimitExceeded {
                retry_after_secs: 1,
            },
            AppError::Validation(String::new()),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.error_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}
