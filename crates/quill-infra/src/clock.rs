//! Clock implementations.

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use quill_core::ports::Clock;

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wall time captured once, then advanced by the tokio monotonic clock.
///
/// Under a paused tokio runtime this follows simulated time, which makes
/// scheduler timing reproducible.
#[derive(Debug, Clone, Copy)]
pub struct AnchoredClock {
    wall: DateTime<Utc>,
    anchor: Instant,
}

impl AnchoredClock {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(wall: DateTime<Utc>) -> Self {
        Self {
            wall,
            anchor: Instant::now(),
        }
    }
}

impl Default for AnchoredClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for AnchoredClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = Instant::now().saturating_duration_since(self.anchor);
        match chrono::Duration::from_std(elapsed) {
            Ok(elapsed) => self.wall + elapsed,
            Err(_) => self.wall,
        }
    }
}
