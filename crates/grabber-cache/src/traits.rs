//! Cache abstraction trait

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Cache operation errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    BackendError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[cfg(feature = "cache-postgres")]
impl From<sqlx::Error> for CacheError {
    fn from(err: sqlx::Error) -> Self {
        CacheError::BackendError(err.to_string())
    }
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Outcome of one fixed-window hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHit {
    pub admitted: bool,
    /// Counter value after this hit. Unchanged on rejection.
    pub count: u32,
    pub window_start_ms: i64,
}

/// Cache abstraction trait
///
/// Keys are opaque strings. Every operation on a single key is atomic; there
/// is no multi-key transaction.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a value. Expired entries read as absent.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Write a value that expires after `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;

    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Record one hit against a fixed window as a single linearizable step.
    ///
    /// Absent or elapsed (age strictly greater than `window`) resets the window
    /// to `{count: 1, start: now_ms}` and admits. Otherwise a counter already at
    /// `limit` rejects without changing state, and anything below is incremented
    /// and admitted.
    async fn hit_fixed_window(
        &self,
        key: &str,
        now_ms: i64,
        window: Duration,
        limit: u32,
    ) -> CacheResult<WindowHit>;

    /// Drop expired entries and windows idle for longer than `idle`.
    /// Returns the number of records removed.
    async fn purge_expired(&self, idle: Duration) -> CacheResult<u64>;

    /// Backend name for logs
    fn backend_name(&self) -> &'static str;
}
