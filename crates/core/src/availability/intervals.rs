//! Interval arithmetic over half-open UTC ranges.
//!
//! Pure functions; recomputation is deterministic given the same inputs.

use chrono::Duration;
use slotwise_domain::TimeRange;

/// Sort by start and merge overlapping or adjacent intervals.
///
/// Empty inputs are dropped. O(n log n) in the number of intervals.
pub fn merge(mut intervals: Vec<TimeRange>) -> Vec<TimeRange> {
    intervals.retain(|i| !i.is_empty());
    intervals.sort_by_key(|i| i.start);

    let mut merged: Vec<TimeRange> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            // Adjacent intervals coalesce: [a,b) + [b,c) = [a,c)
            Some(last) if interval.start <= last.end => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Subtract a sorted, merged busy list from one open interval.
///
/// Returns the free sub-intervals in ascending order.
pub fn subtract(open: TimeRange, busy: &[TimeRange]) -> Vec<TimeRange> {
    let mut free = Vec::new();
    let mut cursor = open.start;

    for interval in busy {
        if interval.end <= cursor {
            continue;
        }
        if interval.start >= open.end {
            break;
        }
        if interval.start > cursor {
            free.push(TimeRange::new(cursor, interval.start.min(open.end)));
        }
        cursor = cursor.max(interval.end);
        if cursor >= open.end {
            return free;
        }
    }

    if cursor < open.end {
        free.push(TimeRange::new(cursor, open.end));
    }
    free
}

/// Slice a free interval into consecutive slots of exactly `duration`,
/// starting at the interval's start. A trailing remainder shorter than
/// `duration` is discarded.
pub fn slice(free: TimeRange, duration: Duration) -> Vec<TimeRange> {
    let mut slots = Vec::new();
    if duration <= Duration::zero() {
        return slots;
    }

    let mut cursor = free.start;
    while cursor + duration <= free.end {
        slots.push(TimeRange::new(cursor, cursor + duration));
        cursor += duration;
    }
    slots
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, min, 0).unwrap()
    }

    fn range(h1: u32, m1: u32, h2: u32, m2: u32) -> TimeRange {
        TimeRange::new(at(h1, m1), at(h2, m2))
    }

    #[test]
    fn merge_coalesces_overlapping_and_adjacent() {
        let merged = merge(vec![
            range(10, 0, 11, 0),
            range(9, 0, 10, 0),
            range(10, 30, 12, 0),
            range(14, 0, 15, 0),
        ]);
        assert_eq!(merged, vec![range(9, 0, 12, 0), range(14, 0, 15, 0)]);
    }

    #[test]
    fn merge_drops_empty_intervals() {
        let merged = merge(vec![range(10, 0, 10, 0), range(9, 0, 9, 30)]);
        assert_eq!(merged, vec![range(9, 0, 9, 30)]);
    }

    #[test]
    fn subtract_splits_around_busy() {
        let free = subtract(range(9, 0, 17, 0), &[range(10, 0, 11, 0), range(13, 0, 14, 30)]);
        assert_eq!(free, vec![range(9, 0, 10, 0), range(11, 0, 13, 0), range(14, 30, 17, 0)]);
    }

    #[test]
    fn subtract_handles_busy_covering_edges() {
        let free = subtract(range(9, 0, 12, 0), &[range(8, 0, 9, 30), range(11, 30, 13, 0)]);
        assert_eq!(free, vec![range(9, 30, 11, 30)]);
    }

    #[test]
    fn subtract_with_no_busy_returns_open() {
        assert_eq!(subtract(range(9, 0, 12, 0), &[]), vec![range(9, 0, 12, 0)]);
    }

    #[test]
    fn subtract_fully_covered_returns_nothing() {
        assert!(subtract(range(9, 0, 12, 0), &[range(8, 0, 13, 0)]).is_empty());
    }

    #[test]
    fn slice_produces_back_to_back_slots() {
        let slots = slice(range(9, 0, 12, 0), Duration::minutes(30));
        assert_eq!(slots.len(), 6);
        assert_eq!(slots[0], range(9, 0, 9, 30));
        assert_eq!(slots[5], range(11, 30, 12, 0));
    }

    #[test]
    fn slice_discards_partial_remainder() {
        let slots = slice(range(9, 0, 10, 50), Duration::minutes(30));
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[2], range(10, 0, 10, 30));
    }

    #[test]
    fn slice_shorter_than_duration_is_empty() {
        assert!(slice(range(9, 0, 9, 20), Duration::minutes(30)).is_empty());
    }
}
