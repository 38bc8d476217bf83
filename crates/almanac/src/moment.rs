//! The [`Moment`] facade: one immutable value composing every component.
//!
//! A `Moment` is always a real point in time expressed in a local frame.
//! Construction is the only place the invalid instant is rejected; after
//! that, every operation either returns a new `Moment` or a plain value.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, TimeZone};
use serde::{Serialize, Serializer};

use crate::astro;
use crate::business::BusinessCalendar;
use crate::calendar::{self, Unit};
use crate::duration::DurationValue;
use crate::error::{AlmanacError, Result};
use crate::format;
use crate::humanize::{self, HumanizeOptions};
use crate::instant::{to_rfc3339_millis, Context, Instant};
use crate::normalize::{normalize, Input};
use crate::range::{Boundary, DateRange};
use crate::recurrence::{self, Occurrences, RecurrenceRule};

/// Cap used by [`Schedule::all`] when the caller has no better bound.
pub const DEFAULT_SCHEDULE_CAP: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Moment(DateTime<FixedOffset>);

// ── Construction ────────────────────────────────────────────────────────────

impl Moment {
    /// Normalize `input` and express it in the context's local frame.
    ///
    /// # Errors
    ///
    /// Returns [`AlmanacError::InvalidInput`] when the input does not
    /// normalize to a valid instant.
    ///
    /// ```
    /// use almanac::{Context, Moment};
    /// use chrono::{TimeZone, Utc};
    ///
    /// let ctx = Context::utc(Utc.with_ymd_and_hms(2026, 2, 18, 14, 30, 0).unwrap());
    /// let m = Moment::new("2024-03-05", &ctx).unwrap();
    /// assert_eq!(m.format("dddd, MMMM D"), "Tuesday, March 5");
    /// assert!(Moment::new("whenever", &ctx).is_err());
    /// ```
    pub fn new(input: impl Into<Input>, ctx: &Context) -> Result<Self> {
        let input = input.into();
        ctx.localize(normalize(input.clone(), ctx))
            .map(Moment)
            .map_err(|_| AlmanacError::InvalidInput(format!("not a date: {input:?}")))
    }

    pub fn now(ctx: &Context) -> Self {
        Moment(ctx.local_now())
    }

    pub fn from_datetime<Tz: TimeZone>(dt: DateTime<Tz>) -> Self {
        Moment(dt.fixed_offset())
    }

    /// Local midnight of an ISO week date in the context frame.
    ///
    /// # Errors
    ///
    /// See [`calendar::from_iso_week`].
    pub fn from_iso_week(year: i32, week: u32, weekday: u32, ctx: &Context) -> Result<Self> {
        calendar::from_iso_week(year, week, weekday, ctx.offset).map(Moment)
    }

    pub fn is_leap_year(year: i32) -> bool {
        calendar::is_leap_year(year)
    }

    /// # Errors
    ///
    /// See [`calendar::days_in_month`].
    pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
        calendar::days_in_month(year, month)
    }
}

// ── Accessors ───────────────────────────────────────────────────────────────

impl Moment {
    pub fn instant(&self) -> Instant {
        Instant::from_datetime(&self.0)
    }

    pub fn to_datetime(&self) -> DateTime<FixedOffset> {
        self.0
    }

    pub fn offset(&self) -> FixedOffset {
        self.0.timezone()
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// UTC text with millisecond precision, e.g. `2024-03-05T08:00:00.000Z`.
    pub fn to_rfc3339(&self) -> String {
        to_rfc3339_millis(&self.0)
    }

    /// Always true; invalid inputs never become a `Moment`.
    pub fn is_valid(&self) -> bool {
        true
    }
}

// ── Arithmetic ──────────────────────────────────────────────────────────────

impl Moment {
    /// # Errors
    ///
    /// See [`calendar::add`].
    pub fn add(&self, amount: f64, unit: Unit) -> Result<Self> {
        calendar::add(&self.0, amount, unit).map(Moment)
    }

    /// # Errors
    ///
    /// See [`calendar::add`].
    pub fn subtract(&self, amount: f64, unit: Unit) -> Result<Self> {
        calendar::subtract(&self.0, amount, unit).map(Moment)
    }

    pub fn add_days(&self, n: f64) -> Result<Self> {
        self.add(n, Unit::Day)
    }

    pub fn add_months(&self, n: f64) -> Result<Self> {
        self.add(n, Unit::Month)
    }

    pub fn add_years(&self, n: f64) -> Result<Self> {
        self.add(n, Unit::Year)
    }

    /// Apply each non-zero component, coarsest first: years, months, days,
    /// hours, minutes, seconds, milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`AlmanacError::InvalidArgument`] if the result leaves the
    /// supported range.
    pub fn add_duration(&self, duration: &DurationValue) -> Result<Self> {
        let steps = [
            (duration.years, Unit::Year),
            (duration.months, Unit::Month),
            (duration.days, Unit::Day),
            (duration.hours, Unit::Hour),
            (duration.minutes, Unit::Minute),
            (duration.seconds, Unit::Second),
            (duration.milliseconds, Unit::Millisecond),
        ];
        steps
            .into_iter()
            .filter(|(n, _)| *n != 0)
            .try_fold(self.0, |dt, (n, unit)| calendar::add_whole(&dt, n, unit))
            .map(Moment)
    }

    /// # Errors
    ///
    /// See [`calendar::start_of`].
    pub fn start_of(&self, unit: Unit) -> Result<Self> {
        calendar::start_of(&self.0, unit).map(Moment)
    }

    /// # Errors
    ///
    /// See [`calendar::end_of`].
    pub fn end_of(&self, unit: Unit) -> Result<Self> {
        calendar::end_of(&self.0, unit).map(Moment)
    }

    pub fn iso_week(&self) -> u32 {
        calendar::iso_week(&self.0)
    }

    pub fn iso_week_year(&self) -> i32 {
        calendar::iso_week_year(&self.0)
    }
}

// ── Comparison ──────────────────────────────────────────────────────────────

impl Moment {
    /// `self - other` in whole `unit`s, truncated toward zero.
    ///
    /// Months and years count calendar boundaries crossed (local year and
    /// month fields of both values, in this moment's frame), so
    /// Feb 29 23:00 to Mar 1 00:00 is one month but zero days.
    pub fn diff(&self, other: &Moment, unit: Unit) -> i64 {
        let ms = self.timestamp_millis() - other.timestamp_millis();
        let other_local = other.0.with_timezone(&self.offset());
        let years = i64::from(self.0.year()) - i64::from(other_local.year());
        match unit {
            Unit::Month => years * 12 + i64::from(self.0.month()) - i64::from(other_local.month()),
            Unit::Year => years,
            _ => unit.fixed_millis().map_or(ms, |len| ms / len),
        }
    }

    /// Total order against another instant.
    ///
    /// # Errors
    ///
    /// Returns [`AlmanacError::InvalidInput`] if `other` is the invalid
    /// instant.
    pub fn compare(&self, other: impl Into<Instant>) -> Result<Ordering> {
        let other = other
            .into()
            .millis()
            .ok_or_else(|| AlmanacError::InvalidInput("cannot compare with an invalid instant".to_string()))?;
        Ok(self.timestamp_millis().cmp(&other))
    }

    /// Relative phrase for `self` as seen from `other`.
    ///
    /// # Errors
    ///
    /// See [`humanize::humanize`].
    pub fn humanize_diff(&self, other: &Moment, opts: &HumanizeOptions<'_>) -> Result<String> {
        humanize::humanize(self.diff(other, Unit::Millisecond), opts)
    }
}

// ── Formatting and astronomy ────────────────────────────────────────────────

impl Moment {
    /// Token formatting in this moment's frame; see [`format::format`].
    pub fn format(&self, pattern: &str) -> String {
        format::format(&self.0, pattern)
    }

    pub fn moon_phase(&self) -> f64 {
        astro::moon_phase(&self.0)
    }

    /// # Errors
    ///
    /// See [`astro::sunrise`].
    pub fn sunrise(&self, latitude: f64, longitude: f64) -> Result<Self> {
        astro::sunrise(&self.0, latitude, longitude).map(Moment)
    }

    /// # Errors
    ///
    /// See [`astro::sunset`].
    pub fn sunset(&self, latitude: f64, longitude: f64) -> Result<Self> {
        astro::sunset(&self.0, latitude, longitude).map(Moment)
    }
}

// ── Composition ─────────────────────────────────────────────────────────────

impl Moment {
    pub fn schedule(&self, rule: &RecurrenceRule) -> Schedule {
        Schedule {
            start: self.0,
            rule: rule.clone(),
        }
    }

    /// # Errors
    ///
    /// See [`BusinessCalendar::add_business_days`].
    pub fn add_business_days(&self, n: f64, calendar: &BusinessCalendar) -> Result<Self> {
        calendar.add_business_days(&self.0, n).map(Moment)
    }

    pub fn is_business_day(&self, calendar: &BusinessCalendar) -> bool {
        calendar.is_workday(&self.0)
    }

    /// # Errors
    ///
    /// See [`DateRange::new`].
    pub fn range_to(&self, end: impl Boundary) -> Result<DateRange> {
        DateRange::new(*self, end)
    }
}

/// A recurrence rule anchored at a start moment. Each call re-expands from
/// the start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    start: DateTime<FixedOffset>,
    rule: RecurrenceRule,
}

impl Schedule {
    /// Every occurrence up to `cap`; see [`DEFAULT_SCHEDULE_CAP`].
    pub fn all(&self, cap: usize) -> Occurrences {
        recurrence::generate(&self.start, &self.rule, cap)
    }

    /// The first `n` occurrences.
    pub fn next(&self, n: usize) -> Occurrences {
        recurrence::generate(&self.start, &self.rule, n)
    }

    pub fn rule(&self) -> &RecurrenceRule {
        &self.rule
    }
}

// ── Trait impls ─────────────────────────────────────────────────────────────

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for Moment {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl From<Moment> for Instant {
    fn from(moment: Moment) -> Self {
        moment.instant()
    }
}

impl From<Moment> for Input {
    fn from(moment: Moment) -> Self {
        Input::Instant(moment.instant())
    }
}

impl Boundary for Moment {
    fn lower_bound(&self) -> Result<DateTime<FixedOffset>> {
        Ok(self.0)
    }
}
