//! Deferred deletion of uploaded objects.
//!
//! Every issued download link is paired with a deletion scheduled for the
//! instant the link expires. Scheduled work lives in process memory and is
//! lost on restart; bucket lifecycle rules are expected to catch leftovers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use grabber_core::Clock;
use grabber_storage::Storage;

pub trait CleanupScheduler: Send + Sync {
    /// Arrange for `storage_key` to be deleted at `at_epoch_ms`.
    ///
    /// Returns an error only if the deletion could not be scheduled at all.
    fn schedule_deletion(&self, storage_key: &str, at_epoch_ms: i64) -> anyhow::Result<()>;

    /// Deletions scheduled but not yet attempted.
    fn pending(&self) -> usize;
}

/// Scheduler backed by detached tokio tasks that sleep until the deadline.
#[derive(Clone)]
pub struct TokioCleanupScheduler {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    pending: Arc<AtomicUsize>,
}

impl TokioCleanupScheduler {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl CleanupScheduler for TokioCleanupScheduler {
    fn schedule_deletion(&self, storage_key: &str, at_epoch_ms: i64) -> anyhow::Result<()> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| anyhow::anyhow!("No runtime to schedule deletion on: {}", e))?;

        let delay_ms = at_epoch_ms.saturating_sub(self.clock.now_ms()).max(0);
        let delay = Duration::from_millis(delay_ms as u64);
        let storage = self.storage.clone();
        let pending = self.pending.clone();
        let key = storage_key.to_string();

        pending.fetch_add(1, Ordering::SeqCst);
        handle.spawn(async move {
            tokio::time::sleep(delay).await;

            match storage.delete(&key).await {
                Ok(()) => {
                    tracing::info!(storage_key = %key, "Cleaned up expired download");
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        storage_key = %key,
                        "Failed to clean up expired download"
                    );
                }
            }

            pending.fetch_sub(1, Ordering::SeqCst);
        });

        tracing::debug!(storage_key = %storage_key, delay_ms, "Scheduled deletion");

        Ok(())
    }

    fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}
