//! The night countdown.
//!
//! A single countdown paces the whole game. The host calls [`Countdown::tick`]
//! once per second; the countdown itself never reads the wall clock, which
//! keeps it deterministic under test.

use std::time::Duration;

use serde::Serialize;
use tracing::warn;

/// Default night length in seconds (one hour).
pub const DEFAULT_NIGHT_SECONDS: u32 = 3600;

/// Delay between a completion and the automatic restart.
pub const REARM_GRACE: Duration = Duration::from_millis(100);

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The countdown is stopped; nothing changed.
    Idle,
    /// One second elapsed.
    Ticked {
        /// Seconds left after this tick.
        remaining: u32,
    },
    /// The countdown reached zero, reset itself to its total and is waiting
    /// to be re-armed.
    Completed,
}

/// A real-time countdown with start, stop, reset and retargeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    total: u32,
    remaining: u32,
    running: bool,
    rearm_pending: bool,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(DEFAULT_NIGHT_SECONDS)
    }
}

impl Countdown {
    /// Creates a stopped countdown with `remaining == total`.
    #[must_use]
    pub fn new(total: u32) -> Self {
        Self {
            total,
            remaining: total,
            running: false,
            rearm_pending: false,
        }
    }

    /// Configured length in seconds.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Seconds left.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Seconds elapsed since the countdown was last (re)started from full.
    #[must_use]
    pub fn elapsed(&self) -> u32 {
        self.total.saturating_sub(self.remaining)
    }

    /// Whether the countdown is ticking.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether a completion is waiting for [`Countdown::rearm`].
    #[must_use]
    pub fn is_rearm_pending(&self) -> bool {
        self.rearm_pending
    }

    /// Starts ticking. Returns `false` if it was already running.
    pub fn start(&mut self) -> bool {
        self.rearm_pending = false;
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    /// Halts ticking and cancels any pending re-arm.
    pub fn stop(&mut self) {
        self.running = false;
        self.rearm_pending = false;
    }

    /// Stops and refills the countdown to `total` without completing.
    pub fn reset(&mut self, total: u32) {
        self.stop();
        self.total = total;
        self.remaining = total;
    }

    /// Changes the configured length, keeping the time already elapsed.
    ///
    /// Remaining time is clamped at zero when the new total is shorter than
    /// what has already elapsed.
    pub fn set_total(&mut self, total: u32) {
        let elapsed = self.elapsed();
        self.remaining = total.checked_sub(elapsed).unwrap_or_else(|| {
            warn!(total, elapsed, "new total is shorter than elapsed time; clamping to zero");
            0
        });
        self.total = total;
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return TickOutcome::Ticked {
                remaining: self.remaining,
            };
        }

        self.running = false;
        self.remaining = self.total;
        self.rearm_pending = true;
        TickOutcome::Completed
    }

    /// Restarts a completed countdown. Returns `false` when no completion was
    /// pending (the moderator stopped or reset it in the meantime).
    pub fn rearm(&mut self) -> bool {
        if !self.rearm_pending {
            return false;
        }
        self.start()
    }
}
