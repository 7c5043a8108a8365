//! Cache store that fails every call.

use async_trait::async_trait;
use grabber_cache::{CacheError, CacheResult, CacheStore, WindowHit};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Default)]
pub struct UnavailableCache {
    calls: Arc<AtomicUsize>,
}

impl UnavailableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> CacheResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::BackendError("cache unavailable".to_string()))
    }
}

#[async_trait]
impl CacheStore for UnavailableCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        self.fail()
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> CacheResult<()> {
        self.fail()
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        self.fail()
    }

    async fn hit_fixed_window(
        &self,
        _key: &str,
        _now_ms: i64,
        _window: Duration,
        _limit: u32,
    ) -> CacheResult<WindowHit> {
        self.fail()
    }

    async fn purge_expired(&self, _idle: Duration) -> CacheResult<u64> {
        self.fail()
    }

    fn backend_name(&self) -> &'static str {
        "unavailable"
    }
}
