//! Closed date ranges with stepped enumeration.

use std::iter::FusedIterator;

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{self, Unit};
use crate::error::{AlmanacError, Result};
use crate::instant::Instant;

/// Anything that can bound a [`DateRange`].
///
/// Single points bound both ends with themselves; a range contributes its
/// start as a lower bound and its end as an upper bound.
pub trait Boundary {
    fn lower_bound(&self) -> Result<DateTime<FixedOffset>>;

    fn upper_bound(&self) -> Result<DateTime<FixedOffset>> {
        self.lower_bound()
    }
}

impl Boundary for DateTime<FixedOffset> {
    fn lower_bound(&self) -> Result<DateTime<FixedOffset>> {
        Ok(*self)
    }
}

impl Boundary for DateTime<Utc> {
    fn lower_bound(&self) -> Result<DateTime<FixedOffset>> {
        Ok(self.with_timezone(&Utc.fix()))
    }
}

impl Boundary for Instant {
    fn lower_bound(&self) -> Result<DateTime<FixedOffset>> {
        self.to_datetime()
            .map(|dt| dt.with_timezone(&Utc.fix()))
            .ok_or_else(|| AlmanacError::InvalidInput("range bound is an invalid instant".to_string()))
    }
}

impl Boundary for DateRange {
    fn lower_bound(&self) -> Result<DateTime<FixedOffset>> {
        Ok(self.start)
    }

    fn upper_bound(&self) -> Result<DateTime<FixedOffset>> {
        Ok(self.end)
    }
}

impl<B: Boundary + ?Sized> Boundary for &B {
    fn lower_bound(&self) -> Result<DateTime<FixedOffset>> {
        (**self).lower_bound()
    }

    fn upper_bound(&self) -> Result<DateTime<FixedOffset>> {
        (**self).upper_bound()
    }
}

// ── DateRange ───────────────────────────────────────────────────────────────

/// A closed interval `[start, end]` with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns [`AlmanacError::InvalidArgument`] if `start` is after `end`,
    /// or [`AlmanacError::InvalidInput`] if a bound is an invalid instant.
    ///
    /// ```
    /// use almanac::DateRange;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let a = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    /// let b = Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();
    /// assert!(DateRange::new(a, b).is_ok());
    /// assert!(DateRange::new(b, a).is_err());
    /// ```
    pub fn new(start: impl Boundary, end: impl Boundary) -> Result<Self> {
        let start = start.lower_bound()?;
        let end = end.upper_bound()?;
        if start > end {
            return Err(AlmanacError::InvalidArgument(format!(
                "range start {} is after end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(DateRange { start, end })
    }

    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    /// Whether `dt` lies in the range, bounds included.
    pub fn contains<Tz: TimeZone>(&self, dt: &DateTime<Tz>) -> bool {
        let dt = dt.fixed_offset();
        self.start <= dt && dt <= self.end
    }

    /// The overlap of two ranges. Ranges that only touch intersect in the
    /// single shared instant.
    pub fn intersect(&self, other: &DateRange) -> Option<DateRange> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(DateRange { start, end })
    }

    /// Lazily enumerate `start, start + step, start + 2*step, ...` up to and
    /// including `end`.
    ///
    /// Each element is computed from `start` directly, so month and year
    /// steps clamp per element without accumulating drift
    /// (Jan 31, Feb 29, Mar 31, Apr 30).
    ///
    /// # Errors
    ///
    /// Returns [`AlmanacError::InvalidArgument`] if `step.amount` is below 1.
    pub fn steps(&self, step: Step) -> Result<Steps> {
        if step.amount < 1 {
            return Err(AlmanacError::InvalidArgument(format!(
                "step amount must be at least 1, got {}",
                step.amount
            )));
        }
        Ok(Steps {
            range: *self,
            step,
            index: 0,
            done: false,
        })
    }

    /// Collect [`DateRange::steps`] into a vector.
    pub fn to_vec(&self, step: Step) -> Result<Vec<DateTime<FixedOffset>>> {
        Ok(self.steps(step)?.collect())
    }
}

// ── Steps ───────────────────────────────────────────────────────────────────

/// Enumeration stride for [`DateRange::steps`]; one day by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub unit: Unit,
    pub amount: i64,
}

impl Step {
    pub fn new(amount: i64, unit: Unit) -> Self {
        Step { unit, amount }
    }
}

impl Default for Step {
    fn default() -> Self {
        Step::new(1, Unit::Day)
    }
}

#[derive(Debug, Clone)]
pub struct Steps {
    range: DateRange,
    step: Step,
    index: i64,
    done: bool,
}

impl Iterator for Steps {
    type Item = DateTime<FixedOffset>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = self
            .index
            .checked_mul(self.step.amount)
            .and_then(|n| calendar::add_whole(&self.range.start, n, self.step.unit).ok())
            .filter(|dt| *dt <= self.range.end);
        match next {
            Some(dt) => {
                self.index += 1;
                Some(dt)
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

impl FusedIterator for Steps {}
