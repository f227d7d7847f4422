use std::fmt::{Display, Formatter};

use thiserror::Error;
use time::{Duration, PrimitiveDateTime};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeRangeError {
    #[error("Time range start {0} must be before end {1}")]
    OrderWrong(PrimitiveDateTime, PrimitiveDateTime),
}

/// Half-open time interval `[start, end)` in the canonical local time zone.
///
/// Two ranges which merely touch (`a.end == b.start`) do not overlap, so
/// back-to-back bookings on the same court are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeRange {
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
}

impl TimeRange {
    pub fn new(start: PrimitiveDateTime, end: PrimitiveDateTime) -> Result<Self, TimeRangeError> {
        if start >= end {
            return Err(TimeRangeError::OrderWrong(start, end));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> PrimitiveDateTime {
        self.start
    }

    pub fn end(&self) -> PrimitiveDateTime {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn contains_instant(&self, instant: PrimitiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }

    /// The common sub-interval of two ranges, if any.
    pub fn intersect(&self, other: &TimeRange) -> Option<TimeRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Subtracts all `blockers` from `window` and returns the remaining free
    /// sub-intervals in ascending order.
    ///
    /// Blockers outside the window are ignored, overlapping blockers are
    /// merged, and adjacency does not split the window (half-open semantics).
    pub fn subtract_all(window: &TimeRange, blockers: &[TimeRange]) -> Vec<TimeRange> {
        let mut clamped: Vec<TimeRange> = blockers
            .iter()
            .filter_map(|blocker| window.intersect(blocker))
            .collect();
        clamped.sort_by_key(|range| range.start);

        let mut free = Vec::with_capacity(clamped.len() + 1);
        let mut cursor = window.start;
        for blocker in &clamped {
            if cursor < blocker.start {
                free.push(Self {
                    start: cursor,
                    end: blocker.start,
                });
            }
            cursor = cursor.max(blocker.end);
        }
        if cursor < window.end {
            free.push(Self {
                start: cursor,
                end: window.end,
            });
        }
        free
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} - {})", self.start, self.end)
    }
}
