use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::traits::CacheStore;

/// JSON view over a [`CacheStore`] used by the pipelines.
///
/// The cache is an optimisation: read failures and undecodable values are
/// reported as misses, write and delete failures are logged and dropped.
#[derive(Clone)]
pub struct CacheClient {
    store: Arc<dyn CacheStore>,
}

impl CacheClient {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, cache_key = %key, "Cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    cache_key = %key,
                    "Cached value could not be decoded, treating as miss"
                );
                None
            }
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, cache_key = %key, "Failed to encode cache value");
                return;
            }
        };

        if let Err(e) = self.store.set(key, raw, ttl).await {
            tracing::warn!(error = %e, cache_key = %key, "Cache write failed");
        }
    }

    pub async fn delete(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            tracing::warn!(error = %e, cache_key = %key, "Cache delete failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{CacheError, CacheResult, WindowHit};
    use crate::MemoryCache;
    use async_trait::async_trait;
    use grabber_core::ManualClock;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        title: String,
    }

    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
            Err(CacheError::BackendError("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> CacheResult<()> {
            Err(CacheError::BackendError("connection refused".to_string()))
        }

        async fn delete(&self, _key: &str) -> CacheResult<()> {
            Err(CacheError::BackendError("connection refused".to_string()))
        }

        async fn hit_fixed_window(
            &self,
            _key: &str,
            _now_ms: i64,
            _window: Duration,
            _limit: u32,
        ) -> CacheResult<WindowHit> {
            Err(CacheError::BackendError("connection refused".to_string()))
        }

        async fn purge_expired(&self, _idle: Duration) -> CacheResult<u64> {
            Ok(0)
        }

        fn backend_name(&self) -> &'static str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_json_round_trip() {
        let client = CacheClient::new(Arc::new(MemoryCache::new(Arc::new(
            ManualClock::default(),
        ))));
        let payload = Payload {
            title: "clip".to_string(),
        };
        client
            .set_json("video-info:x", &payload, Duration::from_secs(60))
            .await;
        assert_eq!(client.get_json::<Payload>("video-info:x").await, Some(payload));
    }

    #[tokio::test]
    async fn test_undecodable_value_is_a_miss() {
        let store = Arc::new(MemoryCache::new(Arc::new(ManualClock::default())));
        store
            .set("video-info:x", "not json".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        let client = CacheClient::new(store);
        assert_eq!(client.get_json::<Payload>("video-info:x").await, None);
    }

    #[tokio::test]
    async fn test_backend_failures_degrade_silently() {
        let client = CacheClient::new(Arc::new(BrokenStore));
        assert_eq!(client.get_json::<Payload>("k").await, None);
        client
            .set_json(
                "k",
                &Payload {
                    title: "t".to_string(),
                },
                Duration::from_secs(1),
            )
            .await;
        client.delete("k").await;
    }
}
