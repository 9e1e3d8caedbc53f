//! Half-open UTC time intervals.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Half-open interval `[start, end)` in UTC.
///
/// All interval comparisons in the scheduling core use half-open semantics:
/// an interval ending at T does not overlap one starting at T.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// True when the interval contains no instant.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// True when the two intervals share at least one instant.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `other` lies entirely within this interval.
    pub fn contains(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Interval widened by `before`/`after` on each side.
    pub fn widened(&self, before: Duration, after: Duration) -> TimeRange {
        TimeRange { start: self.start - before, end: self.end + after }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}
