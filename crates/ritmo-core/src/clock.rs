//! Countdown clock.
//!
//! The clock is a state machine driven by caller ticks, one logical second
//! per tick -- it owns no thread and is not drift-corrected. A single
//! `running` flag guards arming: `start` is idempotent, and `pause`/`reset`
//! disarm before any state that assumes "not running" is touched. Expiry
//! disarms the clock itself, so a completion is reported exactly once.

use serde::{Deserialize, Serialize};

/// Outcome of a single [`Clock::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Clock is not armed; nothing happened.
    Idle,
    /// One second elapsed; countdown continues.
    Running { remaining_secs: u64 },
    /// Countdown reached zero on this tick. The clock has disarmed itself.
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    total_secs: u64,
    remaining_secs: u64,
    running: bool,
}

impl Clock {
    pub fn new(total_secs: u64) -> Self {
        Self {
            total_secs,
            remaining_secs: total_secs,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    /// 0.0 .. 1.0 elapsed/total ratio for progress presentation.
    pub fn progress(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs as f64 / self.total_secs as f64)
    }

    /// Remaining time as `m:ss`.
    pub fn format_remaining(&self) -> String {
        let minutes = self.remaining_secs / 60;
        let secs = self.remaining_secs % 60;
        format!("{minutes}:{secs:02}")
    }

    /// Arm the countdown. Returns `false` (no-op) if already running or
    /// there is nothing left to count down.
    pub fn start(&mut self) -> bool {
        if self.running || self.remaining_secs == 0 {
            return false;
        }
        self.running = true;
        true
    }

    /// Disarm, preserving remaining time. Returns `false` if not running.
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    /// Disarm and reload the countdown with a fresh duration.
    pub fn reset(&mut self, total_secs: u64) {
        self.running = false;
        self.total_secs = total_secs;
        self.remaining_secs = total_secs;
    }

    /// Advance one logical second.
    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.running = false;
            Tick::Expired
        } else {
            Tick::Running {
                remaining_secs: self.remaining_secs,
            }
        }
    }
}
