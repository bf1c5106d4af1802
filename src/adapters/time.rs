//! Wall-clock adapter.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::app::ports::ClockPort;

/// [`ClockPort`] backed by the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    /// Clamps to 0 if the clock is set before 1970.
    fn unix_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}
