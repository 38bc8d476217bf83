//! Designated-duration text codec (`PnYnMnDTnHnMnS`).
//!
//! Every component is optional, but the leading `P` is required and time
//! components must follow a `T` marker. `"P"` and `"PT"` both parse to the
//! zero duration, and the zero duration serializes as `"P"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AlmanacError, Result};

/// A structured span of calendar and clock components.
///
/// Components are independent and applied additively; they are not
/// normalized against each other (`PT90M` stays 90 minutes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationValue {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub milliseconds: i64,
}

impl DurationValue {
    pub fn is_zero(&self) -> bool {
        *self == DurationValue::default()
    }

    /// Parse duration text.
    ///
    /// # Errors
    ///
    /// Returns [`AlmanacError::Format`] if the text does not match the
    /// grammar: missing `P`, components out of order, time components
    /// without `T`, a number without designator, or trailing characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use almanac::DurationValue;
    ///
    /// let d = DurationValue::from_text("P1Y2M10DT2H30M").unwrap();
    /// assert_eq!((d.years, d.months, d.days), (1, 2, 10));
    /// assert_eq!((d.hours, d.minutes, d.seconds), (2, 30, 0));
    /// assert_eq!(d.to_text(), "P1Y2M10DT2H30M");
    /// ```
    pub fn from_text(text: &str) -> Result<Self> {
        let rest = text.strip_prefix('P').ok_or_else(|| {
            AlmanacError::Format(format!("duration must start with 'P': '{text}'"))
        })?;

        let mut date = [0i64; 3];
        let rest = take_components(rest, text, &['Y', 'M', 'D'], &mut date)?;

        let mut time = [0i64; 3];
        let rest = match rest.strip_prefix('T') {
            Some(after_t) => take_components(after_t, text, &['H', 'M', 'S'], &mut time)?,
            None => rest,
        };

        if !rest.is_empty() {
            return Err(AlmanacError::Format(format!(
                "unexpected '{rest}' in duration '{text}'"
            )));
        }

        Ok(DurationValue {
            years: date[0],
            months: date[1],
            days: date[2],
            hours: time[0],
            minutes: time[1],
            seconds: time[2],
            milliseconds: 0,
        })
    }

    /// Serialize non-zero components in the fixed order Y, M, D, T, H, M, S.
    ///
    /// Milliseconds have no designator in this grammar and are not emitted.
    pub fn to_text(&self) -> String {
        let mut out = String::from("P");
        for (value, designator) in [(self.years, 'Y'), (self.months, 'M'), (self.days, 'D')] {
            if value != 0 {
                out.push_str(&format!("{value}{designator}"));
            }
        }
        if self.hours != 0 || self.minutes != 0 || self.seconds != 0 {
            out.push('T');
            for (value, designator) in [(self.hours, 'H'), (self.minutes, 'M'), (self.seconds, 'S')]
            {
                if value != 0 {
                    out.push_str(&format!("{value}{designator}"));
                }
            }
        }
        out
    }
}

impl fmt::Display for DurationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromStr for DurationValue {
    type Err = AlmanacError;

    fn from_str(s: &str) -> Result<Self> {
        DurationValue::from_text(s)
    }
}

/// Consume `<digits><designator>` pairs whose designators appear in
/// `designators` order, each at most once. Stops at the first character
/// that does not start a number and returns the unconsumed remainder.
fn take_components<'a>(
    mut s: &'a str,
    full: &str,
    designators: &[char],
    out: &mut [i64],
) -> Result<&'a str> {
    let mut next_slot = 0;
    loop {
        let digits_len = s.bytes().take_while(u8::is_ascii_digit).count();
        if digits_len == 0 {
            return Ok(s);
        }
        let value: i64 = s[..digits_len].parse().map_err(|_| {
            AlmanacError::Format(format!("number too large in duration '{full}'"))
        })?;
        let designator = s[digits_len..].chars().next().ok_or_else(|| {
            AlmanacError::Format(format!("number without designator at end of '{full}'"))
        })?;
        let slot = designators[next_slot..]
            .iter()
            .position(|d| *d == designator)
            .map(|p| p + next_slot)
            .ok_or_else(|| {
                AlmanacError::Format(format!(
                    "unexpected designator '{designator}' in duration '{full}'"
                ))
            })?;
        out[slot] = value;
        next_slot = slot + 1;
        s = &s[digits_len + designator.len_utf8()..];
    }
}
