//! Process uptime clock.
//!
//! Captured once at startup and read-only afterwards. Elapsed time is measured
//! on the monotonic clock so it never goes backwards; the wall-clock start is
//! kept only for display.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy)]
pub struct ProcessClock {
    started: Instant,
    started_at_unix: u64,
}

impl ProcessClock {
    /// Capture the current time as the process start.
    pub fn start() -> Self {
        let started_at_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            started: Instant::now(),
            started_at_unix,
        }
    }

    /// Whole seconds since `start()`, floored.
    pub fn elapsed_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Wall-clock start time in unix seconds.
    pub fn started_at_unix(&self) -> u64 {
        self.started_at_unix
    }
}
