//! Time windows for collision detection.

use chrono::{DateTime, Utc};

/// Closed interval `[start, end]` an event occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Build a window, swapping the bounds if they arrive reversed.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if end < start {
            TimeWindow {
                start: end,
                end: start,
            }
        } else {
            TimeWindow { start, end }
        }
    }

    /// Two windows overlap when each one starts no later than the other ends.
    /// Touching endpoints count as a collision.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}
