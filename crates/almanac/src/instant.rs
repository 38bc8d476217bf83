//! The canonical instant representation and the evaluation context.
//!
//! An [`Instant`] is a point in time with millisecond resolution, stored as
//! UTC. Failed parses produce the explicit invalid instant, which travels
//! through normalization untouched and is only rejected at the boundaries
//! that need a real point in time ([`Context::localize`], `Moment::new`).
//!
//! A [`Context`] carries the two pieces of ambient state every calendar
//! computation needs: the "now" anchor and the local frame (a fixed UTC
//! offset). Nothing in this crate reads the system clock implicitly; the
//! caller builds a context, keeping results reproducible.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Serialize, Serializer};

use crate::error::{AlmanacError, Result};

// ── Instant ─────────────────────────────────────────────────────────────────

/// A millisecond-resolution UTC instant, or the explicit invalid sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instant(Option<DateTime<Utc>>);

impl Instant {
    /// The invalid instant produced by failed parses.
    pub const fn invalid() -> Self {
        Instant(None)
    }

    /// Build an instant from epoch milliseconds. Values outside the
    /// representable range yield the invalid instant.
    pub fn from_millis(millis: i64) -> Self {
        Instant(DateTime::from_timestamp_millis(millis))
    }

    /// Build an instant from any zoned datetime, truncating to milliseconds.
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self::from_millis(dt.timestamp_millis())
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    /// Epoch milliseconds, or `None` for the invalid instant.
    pub fn millis(&self) -> Option<i64> {
        self.0.map(|dt| dt.timestamp_millis())
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        self.0
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(dt) => write!(f, "{}", to_rfc3339_millis(&dt)),
            None => f.write_str("Invalid Date"),
        }
    }
}

impl Serialize for Instant {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Some(dt) => serializer.serialize_str(&to_rfc3339_millis(&dt)),
            None => serializer.serialize_none(),
        }
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Instant {
    fn from(dt: DateTime<Tz>) -> Self {
        Instant::from_datetime(&dt)
    }
}

/// Render a datetime as `YYYY-MM-DDTHH:mm:ss.SSSZ` in UTC.
pub fn to_rfc3339_millis<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    dt.with_timezone(&Utc)
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

// ── Context ─────────────────────────────────────────────────────────────────

/// The "now" anchor and local frame for a computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    /// The instant treated as "now" by relative phrases and empty input.
    pub now: DateTime<Utc>,
    /// The local frame: calendar fields, local midnight and day boundaries
    /// are all computed at this fixed offset from UTC.
    pub offset: FixedOffset,
}

impl Context {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Context { now, offset }
    }

    /// A context anchored at `now` with a UTC local frame.
    pub fn utc(now: DateTime<Utc>) -> Self {
        Context::new(now, Utc.fix())
    }

    /// A context anchored at the system clock with a UTC local frame.
    pub fn system() -> Self {
        Context::utc(Utc::now())
    }

    pub fn with_offset(self, offset: FixedOffset) -> Self {
        Context { offset, ..self }
    }

    /// "Now" expressed in the local frame.
    pub fn local_now(&self) -> DateTime<FixedOffset> {
        self.now.with_timezone(&self.offset)
    }

    /// Express a valid instant in the local frame.
    ///
    /// # Errors
    ///
    /// Returns [`AlmanacError::InvalidInput`] for the invalid instant.
    pub fn localize(&self, instant: Instant) -> Result<DateTime<FixedOffset>> {
        instant
            .to_datetime()
            .map(|dt| dt.with_timezone(&self.offset))
            .ok_or_else(|| AlmanacError::InvalidInput("invalid instant".to_string()))
    }

    /// Interpret a naive wall-clock value in the local frame.
    pub fn from_local(&self, naive: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        self.offset.from_local_datetime(naive).single()
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::system()
    }
}

/// Parse a UTC offset of the form `Z`, `±HH:MM` or `±HHMM`.
///
/// # Errors
///
/// Returns [`AlmanacError::Format`] when the text is not an offset or the
/// offset is out of range.
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }
    let bad = || AlmanacError::Format(format!("invalid UTC offset: '{s}'"));

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(bad()),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    let hours: i32 = digits[..2].parse().map_err(|_| bad())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| bad())?;
    fixed_offset(sign, hours, minutes).ok_or_else(bad)
}

/// Build a fixed offset from a sign and hour/minute magnitudes.
pub(crate) fn fixed_offset(sign: i32, hours: i32, minutes: i32) -> Option<FixedOffset> {
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_from_millis_round_trips() {
        let i = Instant::from_millis(1_709_596_800_123);
        assert!(i.is_valid());
        assert_eq!(i.millis(), Some(1_709_596_800_123));
        assert_eq!(i.to_string(), "2024-03-05T00:00:00.123Z");
    }

    #[test]
    fn test_invalid_instant_is_queryable() {
        let i = Instant::invalid();
        assert!(!i.is_valid());
        assert_eq!(i.millis(), None);
        assert_eq!(i.to_string(), "Invalid Date");
    }

    #[test]
    fn test_instant_out_of_range_is_invalid() {
        assert!(!Instant::from_millis(i64::MAX).is_valid());
    }

    #[test]
    fn test_instant_truncates_sub_millisecond_precision() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap()
            + chrono::Duration::microseconds(1_999);
        assert_eq!(Instant::from_datetime(&dt).millis(), Some(1_709_596_800_001));
    }

    #[test]
    fn test_instant_serializes_as_text_or_null() {
        let valid = serde_json::to_string(&Instant::from_millis(0)).unwrap();
        assert_eq!(valid, "\"1970-01-01T00:00:00.000Z\"");
        let invalid = serde_json::to_string(&Instant::invalid()).unwrap();
        assert_eq!(invalid, "null");
    }

    #[test]
    fn test_localize_applies_offset() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 22, 0, 0).unwrap();
        let ctx = Context::new(now, FixedOffset::east_opt(5 * 3600).unwrap());
        let local = ctx.localize(Instant::from(now)).unwrap();
        assert_eq!(local.format("%Y-%m-%d %H:%M").to_string(), "2024-03-06 03:00");
    }

    #[test]
    fn test_localize_rejects_invalid() {
        let ctx = Context::utc(Utc::now());
        let err = ctx.localize(Instant::invalid()).unwrap_err();
        assert!(matches!(err, AlmanacError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_utc_offset_forms() {
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_utc_offset("+05:30").unwrap().local_minus_utc(), 19_800);
        assert_eq!(parse_utc_offset("-0800").unwrap().local_minus_utc(), -28_800);
        assert!(parse_utc_offset("+24:00").is_err());
        assert!(parse_utc_offset("0530").is_err());
    }
}
