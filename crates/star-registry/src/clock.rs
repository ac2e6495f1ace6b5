//! Wall-clock access in whole seconds.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time, in whole seconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> i64;
}

/// Reads the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> i64 {
        wall_secs()
    }
}

/// Wall time anchored once, then advanced by the tokio clock.
///
/// Under `tokio::time::pause` this moves only when tokio time moves, so
/// request timestamps and expiry timers stay in step.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    anchor_secs: i64,
    anchor: tokio::time::Instant,
}

impl TokioClock {
    /// Anchor at the current wall time.
    pub fn new() -> Self {
        Self::starting_at(wall_secs())
    }

    /// Anchor at a fixed epoch second.
    pub fn starting_at(secs: i64) -> Self {
        Self {
            anchor_secs: secs,
            anchor: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now_secs(&self) -> i64 {
        self.anchor_secs + self.anchor.elapsed().as_secs() as i64
    }
}

fn wall_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
