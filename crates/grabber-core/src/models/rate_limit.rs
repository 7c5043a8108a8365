use serde::{Deserialize, Serialize};

/// Per-client fixed-window counter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitWindow {
    pub count: u32,
    pub window_start_epoch_ms: i64,
}

impl RateLimitWindow {
    pub fn start(now_ms: i64) -> Self {
        Self {
            count: 1,
            window_start_epoch_ms: now_ms,
        }
    }

    /// A window resets once the elapsed time strictly exceeds its length.
    pub fn is_elapsed(&self, now_ms: i64, window_ms: i64) -> bool {
        now_ms - self.window_start_epoch_ms > window_ms
    }

    /// Milliseconds until the window ends, never negative.
    pub fn remaining_ms(&self, now_ms: i64, window_ms: i64) -> i64 {
        (self.window_start_epoch_ms + window_ms - now_ms).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_elapsed_boundary() {
        let window = RateLimitWindow::start(1_000);
        assert!(!window.is_elapsed(61_000, 60_000));
        assert!(window.is_elapsed(61_001, 60_000));
        assert_eq!(window.remaining_ms(31_000, 60_000), 30_000);
        assert_eq!(window.remaining_ms(90_000, 60_000), 0);
    }
}
