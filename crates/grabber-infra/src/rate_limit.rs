//! Admission control.
//!
//! A per-client fixed-window counter consulted before any expensive work. The
//! counter lives in the shared cache under `rate-limit:{client}` and is updated
//! through the cache's atomic window primitive, so every replica sharing the
//! cache enforces the same limit.

use std::sync::Arc;
use std::time::Duration;

use grabber_cache::CacheStore;
use grabber_core::constants::RATE_LIMIT_KEY_PREFIX;
use grabber_core::{AppError, Clock, RateLimitConfig, RateLimitWindow};

use crate::client_key::sanitize_client_key;

/// Admission outcome for an accepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
    /// Time until the current window ends.
    pub reset_after: Duration,
}

#[derive(Clone)]
pub struct AdmissionGate {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    limit: u32,
    window: Duration,
}

impl AdmissionGate {
    pub fn new(
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
        limit: u32,
        window: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            limit,
            window,
        }
    }

    pub fn from_config(
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
        config: &RateLimitConfig,
    ) -> Self {
        Self::new(store, clock, config.max_requests, config.window)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record one request for `client_key`.
    ///
    /// If the cache is unreachable the request is admitted and the failure logged.
    pub async fn check(&self, client_key: &str) -> Result<RateLimitStatus, AppError> {
        let key = format!("{}{}", RATE_LIMIT_KEY_PREFIX, sanitize_client_key(client_key));
        let now_ms = self.clock.now_ms();
        let window_ms = i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX);

        let hit = match self
            .store
            .hit_fixed_window(&key, now_ms, self.window, self.limit)
            .await
        {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    rate_limit_key = %key,
                    "Rate limit check failed, admitting request"
                );
                return Ok(RateLimitStatus {
                    limit: self.limit,
                    remaining: self.limit.saturating_sub(1),
                    reset_after: self.window,
                });
            }
        };

        let window = RateLimitWindow {
            count: hit.count,
            window_start_epoch_ms: hit.window_start_ms,
        };
        let remaining_ms = window.remaining_ms(now_ms, window_ms);
        let reset_after = Duration::from_millis(remaining_ms as u64);

        if !hit.admitted {
            let retry_after_secs = reset_after.as_millis().div_ceil(1000).max(1) as u64;
            tracing::warn!(
                rate_limit_key = %key,
                count = hit.count,
                limit = self.limit,
                retry_after_secs,
                "Rate limit exceeded"
            );
            return Err(AppError::RateLimitExceeded { retry_after_secs });
        }

        Ok(RateLimitStatus {
            limit: self.limit,
            remaining: self.limit.saturating_sub(hit.count),
            reset_after,
        })
    }
}
