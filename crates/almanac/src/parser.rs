//! Flexible date parsing.
//!
//! Parsing is two-tiered. The strict tier ([`parse_rfc3339`]) accepts the
//! fixed-width profile `YYYY-MM-DD[( |T)HH:mm:ss[.fraction][Z|±HH:MM]]`.
//! When the strict tier does not match, [`parse_flexible`] walks a fixed
//! fallback chain:
//!
//! 1. keywords: `now`, `today`, `tomorrow`, `yesterday`
//! 2. `in N <unit>` for day, month, year, hour, minute, second
//! 3. `next <weekday>` (always strictly in the future)
//! 4. `<first|second|third|fourth|last> <weekday> of <next|this|last> month`
//! 5. generic date/time text (RFC 2822, month names, `YYYY/MM/DD`, ...)
//! 6. two-separator numeric dates: `M/D/Y` (month first) or `D-M-Y` (day first)
//!
//! A failure in one tier is silent; only exhausting the chain produces the
//! invalid [`Instant`]. Relative tiers resolve against the [`Context`]
//! anchor, and "midnight" always means local midnight in the context frame.

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone,
    Utc, Weekday,
};

use crate::calendar::{self, Unit};
use crate::error::{AlmanacError, Result};
use crate::instant::{fixed_offset, Context, Instant};

/// Generic tier formats that begin with a four-digit year.
const YEAR_FIRST_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const YEAR_FIRST_DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%Y.%m.%d"];

/// Generic tier formats with month names.
const NAMED_DATETIME_FORMATS: &[&str] = &[
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
];

const NAMED_DATE_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%a %b %d %Y",
    "%A, %B %d, %Y",
];

type Resolved = Option<DateTime<FixedOffset>>;

// ── Strict tier ─────────────────────────────────────────────────────────────

/// Strictly parse `YYYY-MM-DD[( |T)HH:mm:ss[.fraction][Z|±HH:MM]]`.
///
/// Date-only text resolves to midnight UTC. Fractional seconds are rounded
/// to the nearest millisecond. A missing zone or `Z` means UTC; an explicit
/// offset is subtracted to obtain the UTC instant.
///
/// Returns `Ok(None)` when the text does not have this shape at all, which
/// signals "try another grammar" rather than failure.
///
/// # Errors
///
/// Returns [`AlmanacError::Format`] when the shape matches but a field is
/// out of range (month 13, day 31 in April, hour 24, offset hour 24).
///
/// # Examples
///
/// ```
/// use almanac::parser::parse_rfc3339;
///
/// let instant = parse_rfc3339("2024-03-05T10:00:00+02:00").unwrap().unwrap();
/// assert_eq!(instant.to_string(), "2024-03-05T08:00:00.000Z");
/// assert!(parse_rfc3339("March 5, 2024").unwrap().is_none());
/// ```
pub fn parse_rfc3339(s: &str) -> Result<Option<Instant>> {
    let Some(fields) = scan_rfc3339(s.as_bytes()) else {
        return Ok(None);
    };
    let bad = |what: &str| AlmanacError::Format(format!("{what} out of range in '{s}'"));

    if !(1..=12).contains(&fields.month) {
        return Err(bad("month"));
    }
    if fields.day == 0 || fields.day > calendar::month_len(fields.year, fields.month) {
        return Err(bad("day"));
    }
    let date = NaiveDate::from_ymd_opt(fields.year, fields.month, fields.day)
        .ok_or_else(|| bad("date"))?;
    let time = NaiveTime::from_hms_opt(fields.hour, fields.minute, fields.second)
        .ok_or_else(|| bad("time"))?;
    let offset = match fields.offset {
        Some((sign, hours, minutes)) => {
            fixed_offset(sign, hours, minutes).ok_or_else(|| bad("offset"))?
        }
        None => FixedOffset::east_opt(0).ok_or_else(|| bad("offset"))?,
    };

    let utc = Utc.from_utc_datetime(&date.and_time(time))
        + TimeDelta::milliseconds(i64::from(fields.millis))
        - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    Ok(Some(Instant::from(utc)))
}

/// Raw fields of a strict-tier match, before range validation.
#[derive(Debug, Default)]
struct StrictFields {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    /// Rounded fraction; may be 1000 when `.9995` rounds up.
    millis: u32,
    /// (sign, hours, minutes)
    offset: Option<(i32, i32, i32)>,
}

fn scan_rfc3339(b: &[u8]) -> Option<StrictFields> {
    if b.len() < 10 || b[4] != b'-' || b[7] != b'-' {
        return None;
    }
    let mut fields = StrictFields {
        year: digits(&b[0..4])? as i32,
        month: digits(&b[5..7])?,
        day: digits(&b[8..10])?,
        ..Default::default()
    };
    if b.len() == 10 {
        return Some(fields);
    }

    let sep = b[10];
    if !(sep == b'T' || sep.is_ascii_whitespace()) || b.len() < 19 || b[13] != b':' || b[16] != b':'
    {
        return None;
    }
    fields.hour = digits(&b[11..13])?;
    fields.minute = digits(&b[14..16])?;
    fields.second = digits(&b[17..19])?;

    let mut rest = &b[19..];
    if let Some(after_dot) = rest.strip_prefix(b".") {
        let len = after_dot.iter().take_while(|c| c.is_ascii_digit()).count();
        if len == 0 {
            return None;
        }
        fields.millis = round_fraction_to_millis(&after_dot[..len]);
        rest = &after_dot[len..];
    }

    match rest {
        [] | [b'Z'] => {}
        [sign @ (b'+' | b'-'), h1, h2, b':', m1, m2] => {
            let sign = if *sign == b'+' { 1 } else { -1 };
            let hours = digits(&[*h1, *h2])? as i32;
            let minutes = digits(&[*m1, *m2])? as i32;
            fields.offset = Some((sign, hours, minutes));
        }
        _ => return None,
    }
    Some(fields)
}

/// Round a run of fraction digits to whole milliseconds, half up.
fn round_fraction_to_millis(frac: &[u8]) -> u32 {
    let digit = |i: usize| frac.get(i).map_or(0, |c| u32::from(c - b'0'));
    let millis = digit(0) * 100 + digit(1) * 10 + digit(2);
    if digit(3) >= 5 {
        millis + 1
    } else {
        millis
    }
}

fn digits(b: &[u8]) -> Option<u32> {
    if b.is_empty() || !b.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(b).ok()?.parse().ok()
}

// ── Fallback chain ──────────────────────────────────────────────────────────

/// Parse date text through the strict tier and then the fallback chain.
///
/// Never fails loudly: unrecognized text yields [`Instant::invalid`].
///
/// # Examples
///
/// ```
/// use almanac::{parser::parse_flexible, Context};
/// use chrono::{TimeZone, Utc};
///
/// let ctx = Context::utc(Utc.with_ymd_and_hms(2026, 2, 18, 14, 30, 0).unwrap());
/// assert_eq!(parse_flexible("tomorrow", &ctx).to_string(), "2026-02-19T00:00:00.000Z");
/// assert_eq!(parse_flexible("5-3-2024", &ctx).to_string(), "2024-03-05T00:00:00.000Z");
/// assert!(!parse_flexible("someday", &ctx).is_valid());
/// ```
pub fn parse_flexible(text: &str, ctx: &Context) -> Instant {
    let s = text.trim();
    match parse_rfc3339(s) {
        Ok(Some(instant)) => {
            tracing::trace!(input = s, "strict tier matched");
            return instant;
        }
        Ok(None) => {}
        Err(err) => {
            tracing::debug!(input = s, error = %err, "strict tier rejected malformed fields");
            return Instant::invalid();
        }
    }

    let lower = s.to_lowercase();
    let now = ctx.local_now();
    let tiers: [(&str, &dyn Fn() -> Resolved); 6] = [
        ("keyword", &|| try_keyword(&lower, &now)),
        ("in-offset", &|| try_in_offset(&lower, &now)),
        ("next-weekday", &|| try_next_weekday(&lower, &now)),
        ("ordinal-weekday", &|| try_ordinal_weekday(&lower, &now)),
        ("generic", &|| try_generic(s, ctx)),
        ("numeric-date", &|| try_numeric_date(s, ctx)),
    ];
    for (tier, attempt) in tiers {
        if let Some(dt) = attempt() {
            tracing::debug!(input = s, tier, "fallback tier matched");
            return Instant::from(dt);
        }
    }

    tracing::debug!(input = s, "no tier matched");
    Instant::invalid()
}

/// "now", "today", "tomorrow", "yesterday".
fn try_keyword(s: &str, now: &DateTime<FixedOffset>) -> Resolved {
    let days = match s {
        "now" => return Some(*now),
        "today" => 0,
        "tomorrow" => 1,
        "yesterday" => -1,
        _ => return None,
    };
    let day = calendar::add_whole(now, days, Unit::Day).ok()?;
    calendar::local_midnight(&day).ok()
}

/// "in N <unit>", e.g. "in 3 days", "in 1 month".
fn try_in_offset(s: &str, now: &DateTime<FixedOffset>) -> Resolved {
    let parts: Vec<&str> = s.split_whitespace().collect();
    let ["in", amount, unit] = parts.as_slice() else {
        return None;
    };
    if !amount.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: i64 = amount.parse().ok()?;
    let unit = match *unit {
        "day" | "days" => Unit::Day,
        "month" | "months" => Unit::Month,
        "year" | "years" => Unit::Year,
        "hour" | "hours" => Unit::Hour,
        "minute" | "minutes" => Unit::Minute,
        "second" | "seconds" => Unit::Second,
        _ => return None,
    };
    calendar::add_whole(now, n, unit).ok()
}

/// "next <weekday>": the nearest strictly-future occurrence, at local midnight.
fn try_next_weekday(s: &str, now: &DateTime<FixedOffset>) -> Resolved {
    let parts: Vec<&str> = s.split_whitespace().collect();
    let ["next", name] = parts.as_slice() else {
        return None;
    };
    let target = parse_weekday(name)?;
    let today = now.weekday().num_days_from_sunday();
    let days_ahead = match (target.num_days_from_sunday() + 7 - today) % 7 {
        0 => 7,
        n => n,
    };
    let day = calendar::add_whole(now, i64::from(days_ahead), Unit::Day).ok()?;
    calendar::local_midnight(&day).ok()
}

/// "<ordinal> <weekday> of <next|this|last> month".
fn try_ordinal_weekday(s: &str, now: &DateTime<FixedOffset>) -> Resolved {
    let parts: Vec<&str> = s.split_whitespace().collect();
    let [ordinal, name, "of", which, "month"] = parts.as_slice() else {
        return None;
    };
    let ordinal = parse_ordinal(ordinal)?;
    let weekday = parse_weekday(name)?;
    let shift = match *which {
        "next" => 1,
        "this" => 0,
        "last" => -1,
        _ => return None,
    };
    let base = calendar::add_whole(now, shift, Unit::Month).ok()?;
    let date = find_nth_weekday_in_month(base.year(), base.month(), weekday, ordinal)?;
    calendar::at_local(now.timezone(), date, NaiveTime::MIN).ok()
}

/// Find the Nth weekday of a month; `ordinal < 0` counts back from the end.
fn find_nth_weekday_in_month(
    year: i32,
    month: u32,
    weekday: Weekday,
    ordinal: i32,
) -> Option<NaiveDate> {
    if ordinal > 0 {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let ahead = (weekday.num_days_from_sunday() + 7 - first.weekday().num_days_from_sunday()) % 7;
        let target = first + TimeDelta::days(i64::from(ahead) + 7 * i64::from(ordinal - 1));
        (target.month() == month).then_some(target)
    } else {
        let last = NaiveDate::from_ymd_opt(year, month, calendar::month_len(year, month))?;
        let back = (last.weekday().num_days_from_sunday() + 7 - weekday.num_days_from_sunday()) % 7;
        let target = last - TimeDelta::days(i64::from(back) + 7 * i64::from(-ordinal - 1));
        (target.month() == month).then_some(target)
    }
}

/// Catch-all for common written forms. Zone-less text is local time.
fn try_generic(s: &str, ctx: &Context) -> Resolved {
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    // Year-first patterns would otherwise swallow short numeric dates like
    // "5/3/24" as the year 5; those belong to the numeric tier.
    let year_first = s.len() > 4 && s.as_bytes()[..4].iter().all(u8::is_ascii_digit);
    let (datetime_formats, date_formats) = if year_first {
        (YEAR_FIRST_DATETIME_FORMATS, YEAR_FIRST_DATE_FORMATS)
    } else {
        (NAMED_DATETIME_FORMATS, NAMED_DATE_FORMATS)
    };

    datetime_formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            date_formats
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .and_then(|naive| ctx.from_local(&naive))
}

/// Two-separator numeric dates. A `/` anywhere means month-first (US); otherwise
/// `-` means day-first. Years below 100 land in the 2000s.
fn try_numeric_date(s: &str, ctx: &Context) -> Resolved {
    let parts: Vec<&str> = s.split(['-', '/']).collect();
    let [a, b, c] = parts.as_slice() else {
        return None;
    };
    let well_formed = |part: &str, min: usize, max: usize| {
        (min..=max).contains(&part.len()) && part.bytes().all(|x| x.is_ascii_digit())
    };
    if !(well_formed(a, 1, 2) && well_formed(b, 1, 2) && well_formed(c, 2, 4)) {
        return None;
    }
    let (a, b): (u32, u32) = (a.parse().ok()?, b.parse().ok()?);
    let year: i32 = c.parse().ok()?;
    let year = if year < 100 { 2000 + year } else { year };
    let (month, day) = if s.contains('/') { (a, b) } else { (b, a) };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    ctx.from_local(&date.and_time(NaiveTime::MIN))
}

// ── Parsing helpers ─────────────────────────────────────────────────────────

/// Parse a lower-case full weekday name.
fn parse_weekday(s: &str) -> Option<Weekday> {
    match s {
        "sunday" => Some(Weekday::Sun),
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        _ => None,
    }
}

/// Parse an ordinal: "first"→1 … "fourth"→4, "last"→-1.
fn parse_ordinal(s: &str) -> Option<i32> {
    match s {
        "first" => Some(1),
        "second" => Some(2),
        "third" => Some(3),
        "fourth" => Some(4),
        "last" => Some(-1),
        _ => None,
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> Context {
        // Wednesday, February 18, 2026, 14:30:00 UTC
        Context::utc(Utc.with_ymd_and_hms(2026, 2, 18, 14, 30, 0).unwrap())
    }

    fn parse(s: &str) -> String {
        parse_flexible(s, &anchor()).to_string()
    }

    fn strict(s: &str) -> String {
        parse_rfc3339(s).unwrap().unwrap().to_string()
    }

    // ── strict tier ─────────────────────────────────────────────────────

    #[test]
    fn test_strict_date_only_is_utc_midnight() {
        assert_eq!(strict("2024-03-05"), "2024-03-05T00:00:00.000Z");
    }

    #[test]
    fn test_strict_with_t_or_space_separator() {
        assert_eq!(strict("2024-03-05T10:20:30"), "2024-03-05T10:20:30.000Z");
        assert_eq!(strict("2024-03-05 10:20:30Z"), "2024-03-05T10:20:30.000Z");
    }

    #[test]
    fn test_strict_offset_shifts_to_utc() {
        assert_eq!(strict("2024-03-05T10:00:00+05:30"), "2024-03-05T04:30:00.000Z");
        assert_eq!(strict("2024-03-05T22:00:00-03:00"), "2024-03-06T01:00:00.000Z");
    }

    #[test]
    fn test_strict_fraction_rounds_to_millis() {
        assert_eq!(strict("2024-03-05T10:00:00.1"), "2024-03-05T10:00:00.100Z");
        assert_eq!(strict("2024-03-05T10:00:00.1234"), "2024-03-05T10:00:00.123Z");
        assert_eq!(strict("2024-03-05T10:00:00.1235"), "2024-03-05T10:00:00.124Z");
        assert_eq!(strict("2024-03-05T10:00:00.9996Z"), "2024-03-05T10:00:01.000Z");
    }

    #[test]
    fn test_strict_shape_mismatch_is_none() {
        for s in [
            "2024-3-05",
            "2024-03-05T10:00",
            "2024-03-05Z",
            "2024-03-05T10:00:00+0530",
            "2024-03-05T10:00:00.",
            "March 5",
            "",
        ] {
            assert!(parse_rfc3339(s).unwrap().is_none(), "{s} should not match");
        }
    }

    #[test]
    fn test_strict_out_of_range_fields_are_format_errors() {
        for s in [
            "2024-13-01",
            "2024-04-31",
            "2023-02-29",
            "2024-03-05T24:00:00",
            "2024-03-05T10:60:00",
            "2024-03-05T10:00:00+24:00",
        ] {
            let err = parse_rfc3339(s).unwrap_err();
            assert!(matches!(err, AlmanacError::Format(_)), "{s}: got {err}");
        }
    }

    #[test]
    fn test_flexible_malformed_strict_is_invalid() {
        assert!(!parse_flexible("2024-02-30", &anchor()).is_valid());
    }

    // ── keywords ────────────────────────────────────────────────────────

    #[test]
    fn test_keywords() {
        assert_eq!(parse("now"), "2026-02-18T14:30:00.000Z");
        assert_eq!(parse("Today"), "2026-02-18T00:00:00.000Z");
        assert_eq!(parse("TOMORROW"), "2026-02-19T00:00:00.000Z");
        assert_eq!(parse("  yesterday "), "2026-02-17T00:00:00.000Z");
    }

    #[test]
    fn test_keywords_use_local_midnight() {
        let ctx = anchor().with_offset(FixedOffset::east_opt(5 * 3600 + 1800).unwrap());
        // 14:30Z is 20:00 local on Feb 18; local midnight is 18:30Z on Feb 17
        assert_eq!(parse_flexible("today", &ctx).to_string(), "2026-02-17T18:30:00.000Z");
    }

    // ── in N unit ───────────────────────────────────────────────────────

    #[test]
    fn test_in_offsets() {
        assert_eq!(parse("in 3 days"), "2026-02-21T14:30:00.000Z");
        assert_eq!(parse("in 1 month"), "2026-03-18T14:30:00.000Z");
        assert_eq!(parse("in 2 years"), "2028-02-18T14:30:00.000Z");
        assert_eq!(parse("in  90   minutes"), "2026-02-18T16:00:00.000Z");
        assert_eq!(parse("in 1 hour"), "2026-02-18T15:30:00.000Z");
        assert_eq!(parse("in 30 seconds"), "2026-02-18T14:30:30.000Z");
    }

    #[test]
    fn test_in_offset_rejects_weeks_and_signs() {
        assert_eq!(parse("in 2 weeks"), "Invalid Date");
        assert_eq!(parse("in -2 days"), "Invalid Date");
    }

    // ── next weekday ────────────────────────────────────────────────────

    #[test]
    fn test_next_weekday() {
        assert_eq!(parse("next friday"), "2026-02-20T00:00:00.000Z");
        assert_eq!(parse("next Monday"), "2026-02-23T00:00:00.000Z");
    }

    #[test]
    fn test_next_same_weekday_is_a_full_week_ahead() {
        assert_eq!(parse("next wednesday"), "2026-02-25T00:00:00.000Z");
    }

    // ── ordinal weekday ─────────────────────────────────────────────────

    #[test]
    fn test_ordinal_weekday_of_next_month() {
        // March 1 2026 is a Sunday
        assert_eq!(parse("first monday of next month"), "2026-03-02T00:00:00.000Z");
        assert_eq!(parse("first sunday of next month"), "2026-03-01T00:00:00.000Z");
    }

    #[test]
    fn test_ordinal_weekday_of_this_and_last_month() {
        assert_eq!(parse("fourth wednesday of this month"), "2026-02-25T00:00:00.000Z");
        // January 2026: the 1st is a Thursday
        assert_eq!(parse("second tuesday of last month"), "2026-01-13T00:00:00.000Z");
    }

    #[test]
    fn test_last_weekday_scans_back_from_month_end() {
        // February 28 2026 is a Saturday
        assert_eq!(parse("last friday of this month"), "2026-02-27T00:00:00.000Z");
        assert_eq!(parse("last saturday of this month"), "2026-02-28T00:00:00.000Z");
    }

    #[test]
    fn test_ordinal_month_shift_clamps_instead_of_overflowing() {
        // Jan 31 + 1 month lands in February, not early March
        let ctx = Context::utc(Utc.with_ymd_and_hms(2026, 1, 31, 9, 0, 0).unwrap());
        let got = parse_flexible("first monday of next month", &ctx);
        assert_eq!(got.to_string(), "2026-02-02T00:00:00.000Z");
    }

    #[test]
    fn test_fifth_ordinal_is_not_supported() {
        assert_eq!(parse("fifth monday of next month"), "Invalid Date");
    }

    // ── generic tier ────────────────────────────────────────────────────

    #[test]
    fn test_generic_month_names_are_local() {
        assert_eq!(parse("March 5, 2024"), "2024-03-05T00:00:00.000Z");
        assert_eq!(parse("5 March 2024"), "2024-03-05T00:00:00.000Z");
        assert_eq!(parse("Mar 5 2024"), "2024-03-05T00:00:00.000Z");
        let ctx = anchor().with_offset(FixedOffset::west_opt(5 * 3600).unwrap());
        assert_eq!(
            parse_flexible("March 5, 2024 10:15", &ctx).to_string(),
            "2024-03-05T15:15:00.000Z"
        );
    }

    #[test]
    fn test_generic_rfc2822_and_year_first() {
        assert_eq!(parse("Tue, 5 Mar 2024 10:00:00 +0100"), "2024-03-05T09:00:00.000Z");
        assert_eq!(parse("2024/03/05"), "2024-03-05T00:00:00.000Z");
        assert_eq!(parse("2024-03-05T10:15"), "2024-03-05T10:15:00.000Z");
    }

    // ── numeric tier ────────────────────────────────────────────────────

    #[test]
    fn test_numeric_slash_is_month_first() {
        assert_eq!(parse("5/3/2024"), "2024-05-03T00:00:00.000Z");
        assert_eq!(parse("12/25/24"), "2024-12-25T00:00:00.000Z");
    }

    #[test]
    fn test_numeric_dash_is_day_first() {
        assert_eq!(parse("5-3-2024"), "2024-03-05T00:00:00.000Z");
        assert_eq!(parse("25-12-24"), "2024-12-25T00:00:00.000Z");
    }

    #[test]
    fn test_numeric_mixed_separators_count_as_slash() {
        assert_eq!(parse("5/3-2024"), "2024-05-03T00:00:00.000Z");
    }

    #[test]
    fn test_numeric_nonexistent_date_is_invalid() {
        assert_eq!(parse("31-04-2024"), "Invalid Date");
        assert_eq!(parse("13/13/2024"), "Invalid Date");
    }

    #[test]
    fn test_numeric_year_widths() {
        assert_eq!(parse("1-1-999"), "0999-01-01T00:00:00.000Z");
        assert_eq!(parse("1-1-5"), "Invalid Date");
        assert_eq!(parse("1-1-20245"), "Invalid Date");
    }

    // ── failure ─────────────────────────────────────────────────────────

    #[test]
    fn test_unrecognized_is_invalid_not_error() {
        assert!(!parse_flexible("the day after never", &anchor()).is_valid());
        assert!(!parse_flexible("", &anchor()).is_valid());
    }

    #[test]
    fn test_find_nth_weekday_bounds() {
        assert_eq!(
            find_nth_weekday_in_month(2026, 2, Weekday::Mon, 4),
            NaiveDate::from_ymd_opt(2026, 2, 23)
        );
        assert_eq!(find_nth_weekday_in_month(2026, 2, Weekday::Mon, 5), None);
        assert_eq!(
            find_nth_weekday_in_month(2026, 12, Weekday::Thu, -1),
            NaiveDate::from_ymd_opt(2026, 12, 31)
        );
    }
}
