//! Humanized relative differences ("in 3 days", "2 hours ago").
//!
//! Locale-aware phrasing is not built in. Callers that need it inject a
//! [`RelativeTimeFormatter`]; asking for a locale without one is an
//! [`AlmanacError::Unsupported`] error rather than a silent fallback.

use crate::calendar::Unit;
use crate::error::{AlmanacError, Result};

const SECOND: i64 = 1_000;
const MINUTE: i64 = 60 * SECOND;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Coarsest first. Years and months are nominal (365 and 30 days).
const SCALE: [(Unit, i64); 6] = [
    (Unit::Year, 365 * DAY),
    (Unit::Month, 30 * DAY),
    (Unit::Day, DAY),
    (Unit::Hour, HOUR),
    (Unit::Minute, MINUTE),
    (Unit::Second, SECOND),
];

/// Locale-aware relative-time rendering.
///
/// `value` is positive for the future and negative for the past.
pub trait RelativeTimeFormatter {
    fn format(&self, value: i64, unit: Unit) -> String;
}

impl<F: Fn(i64, Unit) -> String> RelativeTimeFormatter for F {
    fn format(&self, value: i64, unit: Unit) -> String {
        self(value, unit)
    }
}

#[derive(Clone, Copy, Default)]
pub struct HumanizeOptions<'a> {
    /// Requested locale; requires `formatter`.
    pub locale: Option<&'a str>,
    pub formatter: Option<&'a dyn RelativeTimeFormatter>,
}

impl<'a> HumanizeOptions<'a> {
    pub fn with_formatter(formatter: &'a dyn RelativeTimeFormatter) -> Self {
        HumanizeOptions {
            locale: None,
            formatter: Some(formatter),
        }
    }
}

/// Describe a signed difference in milliseconds (`self - other`).
///
/// The unit is the coarsest whose length the magnitude reaches, with
/// seconds as the floor. The value is rounded half up.
///
/// # Errors
///
/// Returns [`AlmanacError::Unsupported`] when a locale is requested
/// without a formatter.
///
/// ```
/// use almanac::humanize::{humanize, HumanizeOptions};
///
/// let two_days = 2 * 86_400_000;
/// assert_eq!(humanize(two_days, &HumanizeOptions::default()).unwrap(), "in 2 days");
/// assert_eq!(humanize(-150_000, &HumanizeOptions::default()).unwrap(), "2 minutes ago");
/// ```
pub fn humanize(diff_ms: i64, opts: &HumanizeOptions<'_>) -> Result<String> {
    let magnitude = diff_ms.unsigned_abs();
    let (unit, unit_ms) = SCALE
        .iter()
        .copied()
        .find(|(_, ms)| magnitude >= *ms as u64)
        .unwrap_or((Unit::Second, SECOND));
    let value = round_half_up(diff_ms as f64 / unit_ms as f64);

    if let Some(formatter) = opts.formatter {
        return Ok(formatter.format(value, unit));
    }
    if let Some(locale) = opts.locale {
        return Err(AlmanacError::Unsupported(format!(
            "no relative-time formatter available for locale '{locale}'"
        )));
    }
    Ok(fixed_phrase(value, unit))
}

fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

fn fixed_phrase(value: i64, unit: Unit) -> String {
    if value == 0 {
        return "now".to_string();
    }
    let n = value.unsigned_abs();
    let plural = if n > 1 { "s" } else { "" };
    if value > 0 {
        format!("in {n} {unit}{plural}")
    } else {
        format!("{n} {unit}{plural} ago")
    }
}
