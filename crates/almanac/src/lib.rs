//! # almanac
//!
//! Deterministic calendrical computation.
//!
//! Every operation is a pure function of its inputs and an explicit
//! [`Context`] (the "now" anchor plus a fixed UTC offset used as the local
//! frame). Nothing reads the system clock or the host time zone implicitly.
//!
//! ## Modules
//!
//! - [`normalize`] — coerce timestamps, epoch millis, text and JSON into an [`Instant`]
//! - [`parser`] — strict RFC 3339 profile plus relative and locale-shaped fallbacks
//! - [`duration`] — `PnYnMnDTnHnMnS` text codec
//! - [`calendar`] — clamping month/year arithmetic, ISO weeks, unit boundaries
//! - [`recurrence`] — `FREQ`/`INTERVAL`/`COUNT`/`BYDAY`/`BYMONTHDAY` rules and bounded expansion
//! - [`business`] — holidays, workweeks and business-day offsets
//! - [`range`] — closed date ranges with stepped enumeration
//! - [`format`] — token-substitution formatting
//! - [`humanize`] — relative phrases with an injectable locale formatter
//! - [`astro`] — crude moon-phase and sunrise/sunset approximations
//! - [`moment`] — the [`Moment`] facade composing all of the above
//! - [`error`] — Error types
//!
//! ## Example
//!
//! ```
//! use almanac::{Context, Moment, Unit};
//! use chrono::{TimeZone, Utc};
//!
//! let ctx = Context::utc(Utc.with_ymd_and_hms(2026, 2, 18, 14, 30, 0).unwrap());
//! let due = Moment::new("next friday", &ctx)?.add(1.0, Unit::Month)?;
//! assert_eq!(due.format("ddd, MMM D YYYY"), "Fri, Mar 20 2026");
//! # Ok::<(), almanac::AlmanacError>(())
//! ```

pub mod astro;
pub mod business;
pub mod calendar;
pub mod duration;
pub mod error;
pub mod format;
pub mod humanize;
pub mod instant;
pub mod moment;
pub mod normalize;
pub mod parser;
pub mod range;
pub mod recurrence;

pub use business::{BusinessCalendar, BusinessCalendarConfig};
pub use calendar::{days_in_month, is_leap_year, Unit};
pub use duration::DurationValue;
pub use error::{AlmanacError, Result};
pub use humanize::{HumanizeOptions, RelativeTimeFormatter};
pub use instant::{parse_utc_offset, Context, Instant};
pub use moment::{Moment, Schedule, DEFAULT_SCHEDULE_CAP};
pub use normalize::{normalize, Input};
pub use parser::{parse_flexible, parse_rfc3339};
pub use range::{Boundary, DateRange, Step, Steps};
pub use recurrence::{generate, parse_rule, Frequency, Occurrences, RecurrenceRule, DEFAULT_CAP};
