use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use grabber_core::{Clock, RateLimitWindow};
use tokio::sync::Mutex;

use crate::traits::{CacheResult, CacheStore, WindowHit};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at_ms: i64,
}

#[derive(Default)]
struct Shard {
    entries: HashMap<String, CacheEntry>,
    windows: HashMap<String, RateLimitWindow>,
}

/// In-process cache.
///
/// Keys are hashed onto independently locked shards so unrelated keys never
/// contend. Expiry is checked on read and by [`CacheStore::purge_expired`].
#[derive(Clone)]
pub struct MemoryCache {
    shards: Vec<Arc<Mutex<Shard>>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_shards(clock, 16)
    }

    pub fn with_shards(clock: Arc<dyn Clock>, shard_count: usize) -> Self {
        let shard_count = shard_count.max(1);
        let shards = (0..shard_count)
            .map(|_| Arc::new(Mutex::new(Shard::default())))
            .collect();
        Self { shards, clock }
    }

    fn shard(&self, key: &str) -> &Arc<Mutex<Shard>> {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }

    /// Number of live entries, for diagnostics and tests.
    pub async fn len(&self) -> usize {
        let mut total = 0;
        for shard in &self.shards {
            total += shard.lock().await.entries.len();
        }
        total
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn ttl_ms(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now_ms = self.clock.now_ms();
        let mut shard = self.shard(key).lock().await;

        match shard.entries.get(key) {
            Some(entry) if entry.expires_at_ms > now_ms => Ok(Some(entry.value.clone())),
            Some(_) => {
                shard.entries.remove(key);
                tracing::debug!(cache_key = %key, "Evicted expired cache entry on read");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        let expires_at_ms = self.clock.now_ms().saturating_add(ttl_ms(ttl));
        let mut shard = self.shard(key).lock().await;
        shard.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at_ms,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut shard = self.shard(key).lock().await;
        shard.entries.remove(key);
        Ok(())
    }

    async fn hit_fixed_window(
        &self,
        key: &str,
        now_ms: i64,
        window: Duration,
        limit: u32,
    ) -> CacheResult<WindowHit> {
        let window_ms = ttl_ms(window);
        let mut shard = self.shard(key).lock().await;

        let hit = match shard.windows.get_mut(key) {
            Some(state) if !state.is_elapsed(now_ms, window_ms) => {
                if state.count >= limit {
                    WindowHit {
                        admitted: false,
                        count: state.count,
                        window_start_ms: state.window_start_epoch_ms,
                    }
                } else {
                    state.count += 1;
                    WindowHit {
                        admitted: true,
                        count: state.count,
                        window_start_ms: state.window_start_epoch_ms,
                    }
                }
            }
            _ => {
                let state = RateLimitWindow::start(now_ms);
                shard.windows.insert(key.to_string(), state);
                WindowHit {
                    admitted: true,
                    count: state.count,
                    window_start_ms: state.window_start_epoch_ms,
                }
            }
        };

        Ok(hit)
    }

    async fn purge_expired(&self, idle: Duration) -> CacheResult<u64> {
        let now_ms = self.clock.now_ms();
        let idle_ms = ttl_ms(idle);
        let mut removed = 0u64;

        for shard in &self.shards {
            let mut shard = shard.lock().await;
            let before = shard.entries.len() + shard.windows.len();
            shard.entries.retain(|_, entry| entry.expires_at_ms > now_ms);
            shard
                .windows
                .retain(|_, window| !window.is_elapsed(now_ms, idle_ms));
            removed += (before - shard.entries.len() - shard.windows.len()) as u64;
        }

        Ok(removed)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
