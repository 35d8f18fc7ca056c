//! Countdown state machine.
//!
//! The countdown itself is clock-free: the driver calls [`Countdown::tick`]
//! once per elapsed second. See `pomodoro` for the tokio driver.

use serde::Serialize;

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The countdown is not running; nothing changed.
    Idle,
    /// One second elapsed; this many remain.
    Running(u32),
    /// The countdown just reached zero and stopped.
    Completed,
}

/// A one-second-resolution countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Countdown {
    remaining: u32,
    active: bool,
    default_seconds: u32,
}

impl Countdown {
    /// An inactive countdown holding `default_seconds`.
    pub fn new(default_seconds: u32) -> Self {
        Self {
            remaining: default_seconds,
            active: false,
            default_seconds,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn default_seconds(&self) -> u32 {
        self.default_seconds
    }

    /// Start counting down. Idempotent while active; does nothing when no
    /// time remains. Returns whether the countdown is now running.
    pub fn start(&mut self) -> bool {
        if self.remaining > 0 {
            self.active = true;
        }
        self.active
    }

    /// Stop counting without changing the remaining time.
    pub fn pause(&mut self) {
        self.active = false;
    }

    /// Deactivate and set the remaining time to `seconds`, or to the
    /// default when `None`.
    pub fn reset(&mut self, seconds: Option<u32>) {
        self.active = false;
        self.remaining = seconds.unwrap_or(self.default_seconds);
    }

    /// Change the default used by `reset(None)`.
    pub fn set_default(&mut self, seconds: u32) {
        self.default_seconds = seconds;
    }

    /// Advance by one second.
    ///
    /// Reaching zero deactivates the countdown and yields `Completed`
    /// exactly once; later ticks are `Idle` until restarted.
    pub fn tick(&mut self) -> Tick {
        if !self.active {
            return Tick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.active = false;
            Tick::Completed
        } else {
            Tick::Running(self.remaining)
        }
    }
}

/// Format seconds as a `MM:SS` clock.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
