//! Debouncing of the raw per-tick presence signal.
//!
//! The external detector is noisy: a single absent frame is not a
//! distraction. A distraction fires only after [`DISTRACTION_THRESHOLD`]
//! consecutive absent ticks, exactly once per absence streak. The streak
//! resets the moment the user is seen again, so re-entering absence starts
//! counting from zero.

use serde::{Deserialize, Serialize};

/// Consecutive absent ticks before an absence counts as a distraction.
pub const DISTRACTION_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceMonitor {
    away_streak: u32,
    last_present: bool,
    last_focused: bool,
}

impl PresenceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a present tick. Returns nothing; presence always clears the
    /// absence streak.
    pub fn observe_present(&mut self, focused: bool) {
        self.away_streak = 0;
        self.last_present = true;
        self.last_focused = focused;
    }

    /// Record an absent tick. Returns `true` exactly on the tick that
    /// crosses the distraction threshold.
    pub fn observe_absent(&mut self) -> bool {
        self.away_streak += 1;
        self.last_present = false;
        self.last_focused = false;
        self.away_streak == DISTRACTION_THRESHOLD
    }

    /// Clear all tracked state (used at work-session start).
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn away_streak(&self) -> u32 {
        self.away_streak
    }

    pub fn last_present(&self) -> bool {
        self.last_present
    }

    /// Whether the last observed tick carried the stronger "focused"
    /// evidence. Surfaced for external indicators only; it never changes
    /// the numeric accumulators.
    pub fn last_focused(&self) -> bool {
        self.last_focused
    }
}
