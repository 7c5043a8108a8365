//! Scheduler that records requests instead of running them.

use crate::cleanup::CleanupScheduler;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct RecordingScheduler {
    scheduled: Arc<Mutex<Vec<(String, i64)>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let scheduler = Self::default();
        *scheduler.fail.lock().unwrap() = true;
        scheduler
    }

    /// (storage key, deadline in epoch ms) for every scheduled deletion.
    pub fn scheduled(&self) -> Vec<(String, i64)> {
        self.scheduled.lock().unwrap().clone()
    }
}

impl CleanupScheduler for RecordingScheduler {
    fn schedule_deletion(&self, storage_key: &str, at_epoch_ms: i64) -> anyhow::Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(anyhow::anyhow!("mock scheduler failure"));
        }
        self.scheduled
            .lock()
            .unwrap()
            .push((storage_key.to_string(), at_epoch_ms));
        Ok(())
    }

    fn pending(&self) -> usize {
        self.scheduled.lock().unwrap().len()
    }
}
