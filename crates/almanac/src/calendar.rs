//! Calendar-aware arithmetic on local datetimes.
//!
//! All functions operate on `DateTime<FixedOffset>`: the calendar fields
//! (year, month, day, weekday) are those of the local frame the value
//! carries. Sub-month units are exact field increments; month and year
//! units clamp the day-of-month to the length of the target month instead
//! of overflowing into the next one.
//!
//! Two week conventions coexist on purpose: [`start_of`]/[`end_of`] with
//! [`Unit::Week`] use Sunday-based weeks, while [`iso_week`] and
//! [`from_iso_week`] follow ISO 8601 (Monday-based, week 1 contains the
//! year's first Thursday).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeDelta, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{AlmanacError, Result};

/// Largest magnitude accepted as an arithmetic amount. Anything beyond this
/// cannot land inside the representable range for any unit.
const MAX_AMOUNT: f64 = 9.0e15;

// ── Unit ────────────────────────────────────────────────────────────────────

/// A calendar unit for arithmetic, differences and boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Unit {
    /// The exact length of the unit in milliseconds, for units that have one.
    pub fn fixed_millis(self) -> Option<i64> {
        match self {
            Unit::Millisecond => Some(1),
            Unit::Second => Some(1_000),
            Unit::Minute => Some(60_000),
            Unit::Hour => Some(3_600_000),
            Unit::Day => Some(86_400_000),
            Unit::Week => Some(604_800_000),
            Unit::Month | Unit::Year => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Millisecond => "millisecond",
            Unit::Second => "second",
            Unit::Minute => "minute",
            Unit::Hour => "hour",
            Unit::Day => "day",
            Unit::Week => "week",
            Unit::Month => "month",
            Unit::Year => "year",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = AlmanacError;

    /// Accepts singular or plural unit names, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ms" | "millisecond" | "milliseconds" => Ok(Unit::Millisecond),
            "second" | "seconds" => Ok(Unit::Second),
            "minute" | "minutes" => Ok(Unit::Minute),
            "hour" | "hours" => Ok(Unit::Hour),
            "day" | "days" => Ok(Unit::Day),
            "week" | "weeks" => Ok(Unit::Week),
            "month" | "months" => Ok(Unit::Month),
            "year" | "years" => Ok(Unit::Year),
            _ => Err(AlmanacError::InvalidArgument(format!(
                "unsupported unit: '{}'",
                s.trim()
            ))),
        }
    }
}

// ── Static helpers ──────────────────────────────────────────────────────────

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`.
///
/// # Errors
///
/// Returns [`AlmanacError::InvalidArgument`] if `month` is outside 1-12.
pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    if !(1..=12).contains(&month) {
        return Err(AlmanacError::InvalidArgument(format!(
            "month must be 1-12, got {month}"
        )));
    }
    Ok(month_len(year, month))
}

/// Month length for a month already known to be in 1-12.
pub(crate) fn month_len(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

// ── add / subtract ──────────────────────────────────────────────────────────

/// Add `amount` of `unit` to `dt`.
///
/// Fractional amounts are truncated toward zero. For [`Unit::Month`] the
/// original day-of-month is kept when the target month has it and clamped
/// to the target month's last day otherwise (Jan 31 + 1 month = Feb 28/29).
/// For [`Unit::Year`] the month is kept and the day clamped the same way
/// (Feb 29 + 1 year = Feb 28).
///
/// # Errors
///
/// Returns [`AlmanacError::InvalidArgument`] if `amount` is not finite or
/// the result falls outside the representable range.
pub fn add(dt: &DateTime<FixedOffset>, amount: f64, unit: Unit) -> Result<DateTime<FixedOffset>> {
    let n = whole_amount(amount)?;
    add_whole(dt, n, unit)
}

/// `subtract(dt, n, unit)` is `add(dt, -n, unit)`.
pub fn subtract(
    dt: &DateTime<FixedOffset>,
    amount: f64,
    unit: Unit,
) -> Result<DateTime<FixedOffset>> {
    add(dt, -amount, unit)
}

/// Integer variant of [`add`] used internally where the amount is already whole.
pub(crate) fn add_whole(
    dt: &DateTime<FixedOffset>,
    n: i64,
    unit: Unit,
) -> Result<DateTime<FixedOffset>> {
    let shifted = match unit {
        Unit::Month => shift_months(dt, n),
        Unit::Year => shift_years(dt, n),
        _ => unit
            .fixed_millis()
            .and_then(|ms| n.checked_mul(ms))
            .and_then(TimeDelta::try_milliseconds)
            .and_then(|delta| dt.checked_add_signed(delta)),
    };
    shifted.ok_or_else(|| {
        AlmanacError::InvalidArgument(format!("adding {n} {unit}(s) leaves the supported range"))
    })
}

fn whole_amount(amount: f64) -> Result<i64> {
    if !amount.is_finite() {
        return Err(AlmanacError::InvalidArgument(format!(
            "amount must be finite, got {amount}"
        )));
    }
    let whole = amount.trunc();
    if whole.abs() > MAX_AMOUNT {
        return Err(AlmanacError::InvalidArgument(format!(
            "amount out of range: {amount}"
        )));
    }
    Ok(whole as i64)
}

fn shift_months(dt: &DateTime<FixedOffset>, months: i64) -> Option<DateTime<FixedOffset>> {
    let local = dt.naive_local();
    let original_day = local.day();
    // Work from the first of the month so month-length overflow never skips a month.
    let total = i64::from(local.year()) * 12 + i64::from(local.month0()) + months;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
    let day = original_day.min(month_len(year, month));
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    dt.timezone().from_local_datetime(&date.and_time(local.time())).single()
}

fn shift_years(dt: &DateTime<FixedOffset>, years: i64) -> Option<DateTime<FixedOffset>> {
    let local = dt.naive_local();
    let (month, original_day) = (local.month(), local.day());
    let year = i32::try_from(i64::from(local.year()).checked_add(years)?).ok()?;
    // Clamp with the original month's length in the new year (Feb 29 → Feb 28).
    let day = original_day.min(month_len(year, month));
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    dt.timezone().from_local_datetime(&date.and_time(local.time())).single()
}

// ── ISO weeks ───────────────────────────────────────────────────────────────

/// The Thursday of the ISO week containing `date`.
fn iso_thursday(date: NaiveDate) -> NaiveDate {
    let iso_dow = i64::from(date.weekday().number_from_monday());
    date.checked_add_signed(TimeDelta::days(4 - iso_dow))
        .unwrap_or(date)
}

/// ISO 8601 week number (1-53) of the local date of `dt`.
///
/// An ISO week belongs to the year that contains its Thursday, so the first
/// days of January can report week 52 or 53 of the previous ISO year.
pub fn iso_week(dt: &DateTime<FixedOffset>) -> u32 {
    let thursday = iso_thursday(dt.date_naive());
    let days_since_jan1 = i64::from(thursday.ordinal0());
    // ceil((days + 1) / 7)
    ((days_since_jan1 + 7) / 7) as u32
}

/// The ISO week-numbering year of the local date of `dt`.
pub fn iso_week_year(dt: &DateTime<FixedOffset>) -> i32 {
    iso_thursday(dt.date_naive()).year()
}

/// Local midnight of the given ISO week date.
///
/// `weekday` runs 1 (Monday) to 7 (Sunday).
///
/// # Errors
///
/// Returns [`AlmanacError::InvalidArgument`] if `week` is outside 1-53,
/// `weekday` is outside 1-7, or the date is not representable.
pub fn from_iso_week(
    year: i32,
    week: u32,
    weekday: u32,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>> {
    if !(1..=53).contains(&week) {
        return Err(AlmanacError::InvalidArgument(format!(
            "ISO week must be 1-53, got {week}"
        )));
    }
    if !(1..=7).contains(&weekday) {
        return Err(AlmanacError::InvalidArgument(format!(
            "ISO weekday must be 1-7, got {weekday}"
        )));
    }
    let out_of_range =
        || AlmanacError::InvalidArgument(format!("ISO week date {year}-W{week:02}-{weekday} is out of range"));

    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(out_of_range)?;
    let jan1_dow = i64::from(jan1.weekday().number_from_monday());
    let mut delta = i64::from(week - 1) * 7 + (i64::from(weekday) - jan1_dow);
    // Jan 1 on Fri/Sat/Sun belongs to the previous ISO year: week 1 starts the following Monday.
    if jan1_dow > 4 {
        delta += 7;
    }
    let date = jan1
        .checked_add_signed(TimeDelta::days(delta))
        .ok_or_else(out_of_range)?;
    at_local(offset, date, NaiveTime::MIN)
}

// ── startOf / endOf ─────────────────────────────────────────────────────────

/// Truncate `dt` to the start of the enclosing `unit`.
///
/// Weeks start on Sunday here (unlike ISO weeks).
///
/// # Errors
///
/// Returns [`AlmanacError::InvalidArgument`] for units other than year,
/// month, week, day and hour.
pub fn start_of(dt: &DateTime<FixedOffset>, unit: Unit) -> Result<DateTime<FixedOffset>> {
    let offset = dt.timezone();
    let date = dt.date_naive();
    match unit {
        Unit::Year => at_local(offset, ymd(date.year(), 1, 1)?, NaiveTime::MIN),
        Unit::Month => at_local(offset, ymd(date.year(), date.month(), 1)?, NaiveTime::MIN),
        Unit::Week => {
            let back = i64::from(date.weekday().num_days_from_sunday());
            at_local(offset, shift_days(date, -back)?, NaiveTime::MIN)
        }
        Unit::Day => at_local(offset, date, NaiveTime::MIN),
        Unit::Hour => at_local(offset, date, hms_milli(dt.hour(), 0, 0, 0)?),
        _ => Err(boundary_unit_error(unit)),
    }
}

/// Extend `dt` to the last millisecond of the enclosing `unit`.
///
/// Weeks end on Saturday here (unlike ISO weeks).
///
/// # Errors
///
/// Returns [`AlmanacError::InvalidArgument`] for units other than year,
/// month, week, day and hour.
pub fn end_of(dt: &DateTime<FixedOffset>, unit: Unit) -> Result<DateTime<FixedOffset>> {
    let offset = dt.timezone();
    let date = dt.date_naive();
    let last_ms = hms_milli(23, 59, 59, 999)?;
    match unit {
        Unit::Year => at_local(offset, ymd(date.year(), 12, 31)?, last_ms),
        Unit::Month => {
            let last = month_len(date.year(), date.month());
            at_local(offset, ymd(date.year(), date.month(), last)?, last_ms)
        }
        Unit::Week => {
            let ahead = 6 - i64::from(date.weekday().num_days_from_sunday());
            at_local(offset, shift_days(date, ahead)?, last_ms)
        }
        Unit::Day => at_local(offset, date, last_ms),
        Unit::Hour => at_local(offset, date, hms_milli(dt.hour(), 59, 59, 999)?),
        _ => Err(boundary_unit_error(unit)),
    }
}

/// Local midnight of the day containing `dt`.
pub(crate) fn local_midnight(dt: &DateTime<FixedOffset>) -> Result<DateTime<FixedOffset>> {
    at_local(dt.timezone(), dt.date_naive(), NaiveTime::MIN)
}

/// Combine a local date and time in the given frame.
pub(crate) fn at_local(
    offset: FixedOffset,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<DateTime<FixedOffset>> {
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or_else(|| AlmanacError::InvalidArgument(format!("{date} {time} is out of range")))
}

fn boundary_unit_error(unit: Unit) -> AlmanacError {
    AlmanacError::InvalidArgument(format!(
        "unit '{unit}' has no boundary; use year, month, week, day or hour"
    ))
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| AlmanacError::InvalidArgument(format!("{year}-{month}-{day} is out of range")))
}

fn hms_milli(hour: u32, minute: u32, second: u32, milli: u32) -> Result<NaiveTime> {
    NaiveTime::from_hms_milli_opt(hour, minute, second, milli).ok_or_else(|| {
        AlmanacError::InvalidArgument(format!("{hour}:{minute}:{second}.{milli} is not a time"))
    })
}

fn shift_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    date.checked_add_signed(TimeDelta::days(days))
        .ok_or_else(|| AlmanacError::InvalidArgument(format!("{date} shifted by {days} days is out of range")))
}

// ── Tests ───────────────────────────────────────────────────────────────────
