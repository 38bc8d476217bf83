//! Token-substitution formatting.
//!
//! | Token  | Output                  | Token | Output                 |
//! |--------|-------------------------|-------|------------------------|
//! | `YYYY` | full year (`2024`)      | `HH`  | 24-hour, padded        |
//! | `YY`   | last two year digits    | `H`   | 24-hour                |
//! | `MMMM` | month name (`March`)    | `hh`  | 12-hour, padded        |
//! | `MMM`  | short month (`Mar`)     | `h`   | 12-hour                |
//! | `MM`   | month, padded           | `mm`  | minute, padded         |
//! | `M`    | month                   | `m`   | minute                 |
//! | `DD`   | day of month, padded    | `ss`  | second, padded         |
//! | `D`    | day of month            | `s`   | second                 |
//! | `dddd` | weekday (`Tuesday`)     | `SSS` | millisecond, padded    |
//! | `ddd`  | short weekday (`Tue`)   | `A`   | `AM`/`PM`              |
//! |        |                         | `a`   | `am`/`pm`              |
//!
//! Matching is greedy from left to right and tries longer tokens first, so
//! `MMMM` is never read as four `M`s. Every other character is copied
//! through unchanged; there is no escape syntax.

use chrono::{DateTime, Datelike, FixedOffset, Timelike};

/// Pattern used when the caller does not supply one.
pub const DEFAULT_PATTERN: &str = "YYYY-MM-DD";

/// Tokens in match priority order.
const TOKENS: &[&str] = &[
    "YYYY", "YY", "MMMM", "MMM", "MM", "M", "DD", "D", "dddd", "ddd", "HH", "H", "hh", "h", "mm",
    "m", "ss", "s", "SSS", "A", "a",
];

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Indexed from Sunday.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const WEEKDAY_ABBREVIATIONS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Render `dt` in its own frame using `pattern`.
///
/// ```
/// use almanac::format::format;
/// use chrono::{FixedOffset, TimeZone};
///
/// let dt = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 3, 5, 15, 4, 0).unwrap();
/// assert_eq!(format(&dt, "dddd, MMMM D"), "Tuesday, March 5");
/// assert_eq!(format(&dt, "h:mm A"), "3:04 PM");
/// ```
pub fn format(dt: &DateTime<FixedOffset>, pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut rest = pattern;
    while let Some(c) = rest.chars().next() {
        match TOKENS.iter().find(|token| rest.starts_with(**token)) {
            Some(token) => {
                render_token(dt, token, &mut out);
                rest = &rest[token.len()..];
            }
            None => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    out
}

fn render_token(dt: &DateTime<FixedOffset>, token: &str, out: &mut String) {
    let hour12 = match dt.hour() % 12 {
        0 => 12,
        h => h,
    };
    let month0 = dt.month0() as usize;
    let weekday = dt.weekday().num_days_from_sunday() as usize;
    let piece = match token {
        "YYYY" => dt.year().to_string(),
        "YY" => {
            let year = dt.year().to_string();
            year[year.len().saturating_sub(2)..].to_string()
        }
        "MMMM" => MONTH_NAMES[month0].to_string(),
        "MMM" => MONTH_ABBREVIATIONS[month0].to_string(),
        "MM" => format!("{:02}", dt.month()),
        "M" => dt.month().to_string(),
        "DD" => format!("{:02}", dt.day()),
        "D" => dt.day().to_string(),
        "dddd" => WEEKDAY_NAMES[weekday].to_string(),
        "ddd" => WEEKDAY_ABBREVIATIONS[weekday].to_string(),
        "HH" => format!("{:02}", dt.hour()),
        "H" => dt.hour().to_string(),
        "hh" => format!("{hour12:02}"),
        "h" => hour12.to_string(),
        "mm" => format!("{:02}", dt.minute()),
        "m" => dt.minute().to_string(),
        "ss" => format!("{:02}", dt.second()),
        "s" => dt.second().to_string(),
        "SSS" => format!("{:03}", dt.timestamp_subsec_millis().min(999)),
        "A" => (if dt.hour() < 12 { "AM" } else { "PM" }).to_string(),
        "a" => (if dt.hour() < 12 { "am" } else { "pm" }).to_string(),
        other => other.to_string(),
    };
    out.push_str(&piece);
}
