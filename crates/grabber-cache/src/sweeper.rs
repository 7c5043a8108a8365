use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;

use crate::traits::CacheStore;

/// Start the background sweep that evicts expired entries and idle windows.
/// Returns a JoinHandle for graceful shutdown
pub fn start_sweeper(
    store: Arc<dyn CacheStore>,
    every: Duration,
    window_idle: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut sweep_interval = interval(every);

        loop {
            sweep_interval.tick().await;

            match store.purge_expired(window_idle).await {
                Ok(0) => {}
                Ok(removed) => {
                    tracing::debug!(
                        backend = store.backend_name(),
                        removed,
                        "Cache sweep removed expired records"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        backend = store.backend_name(),
                        "Cache sweep failed"
                    );
                }
            }
        }
    })
}
