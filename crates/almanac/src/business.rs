//! Business-day calendar: a holiday set plus a configurable workweek.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::{AlmanacError, Result};
use crate::instant::Context;
use crate::parser::parse_flexible;

/// Largest business-day offset accepted; far beyond any representable date.
const MAX_BUSINESS_DAYS: f64 = 100_000_000.0;

/// Caller-supplied calendar settings, loadable from JSON.
///
/// Weekday indices run 0 (Sunday) to 6 (Saturday).
///
/// ```
/// use almanac::BusinessCalendarConfig;
///
/// let config: BusinessCalendarConfig =
///     serde_json::from_str(r#"{ "holidays": ["2024-12-25"] }"#).unwrap();
/// assert_eq!(config.workweek, vec![1, 2, 3, 4, 5]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessCalendarConfig {
    /// Holiday dates as any text the flexible parser accepts. Each is stored
    /// as the calendar day its instant falls on in the calendar's frame. A
    /// date-only string such as `2024-12-25` reads as UTC midnight, so at a
    /// negative offset it lands on the previous local day; write the offset
    /// (`2024-12-25T00:00:00-05:00`) to pin a local date.
    pub holidays: Vec<String>,
    pub workweek: Vec<u8>,
}

impl Default for BusinessCalendarConfig {
    fn default() -> Self {
        BusinessCalendarConfig {
            holidays: Vec::new(),
            workweek: vec![1, 2, 3, 4, 5],
        }
    }
}

/// A resolved business calendar.
///
/// Holidays are stored as calendar days in the frame of the [`Context`] the
/// calendar was built with, and every query is answered in that frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessCalendar {
    holidays: HashSet<NaiveDate>,
    workweek: [bool; 7],
    offset: FixedOffset,
}

impl BusinessCalendar {
    /// Resolve `config` against `ctx`. Holidays are parsed once, here.
    ///
    /// # Errors
    ///
    /// Returns [`AlmanacError::InvalidInput`] for a holiday the parser cannot
    /// read, and [`AlmanacError::InvalidArgument`] for a workweek index
    /// above 6.
    pub fn new(config: &BusinessCalendarConfig, ctx: &Context) -> Result<Self> {
        let mut workweek = [false; 7];
        for &day in &config.workweek {
            let slot = workweek.get_mut(usize::from(day)).ok_or_else(|| {
                tracing::warn!(day, "workweek index out of range");
                AlmanacError::InvalidArgument(format!(
                    "workweek days run 0 (Sunday) to 6 (Saturday), got {day}"
                ))
            })?;
            *slot = true;
        }

        let holidays = config
            .holidays
            .iter()
            .map(|text| {
                let instant = parse_flexible(text, ctx);
                ctx.localize(instant).map(|dt| dt.date_naive()).map_err(|_| {
                    tracing::warn!(holiday = %text, "unparseable holiday");
                    AlmanacError::InvalidInput(format!("holiday '{text}' is not a date"))
                })
            })
            .collect::<Result<HashSet<_>>>()?;

        Ok(BusinessCalendar {
            holidays,
            workweek,
            offset: ctx.offset,
        })
    }

    fn local_date(&self, dt: &DateTime<FixedOffset>) -> NaiveDate {
        dt.with_timezone(&self.offset).date_naive()
    }

    /// Whether the calendar day of `dt` is a holiday. Time of day is ignored.
    pub fn is_holiday(&self, dt: &DateTime<FixedOffset>) -> bool {
        self.holidays.contains(&self.local_date(dt))
    }

    /// Whether `dt` falls on a workweek day that is not a holiday.
    pub fn is_workday(&self, dt: &DateTime<FixedOffset>) -> bool {
        let weekday = self.local_date(dt).weekday().num_days_from_sunday() as usize;
        self.workweek[weekday] && !self.is_holiday(dt)
    }

    /// Walk one day at a time from `dt` until `|floor(n)|` workdays have been
    /// passed, forwards for non-negative `n` and backwards otherwise. The
    /// time of day is kept. `n` in `[0, 1)` returns `dt` unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AlmanacError::InvalidArgument`] if `n` is not finite, is
    /// out of range, or is non-zero while the workweek is empty.
    pub fn add_business_days(
        &self,
        dt: &DateTime<FixedOffset>,
        n: f64,
    ) -> Result<DateTime<FixedOffset>> {
        if !n.is_finite() {
            return Err(AlmanacError::InvalidArgument(format!(
                "business-day offset must be finite, got {n}"
            )));
        }
        let whole = n.floor();
        if whole.abs() > MAX_BUSINESS_DAYS {
            return Err(AlmanacError::InvalidArgument(format!(
                "business-day offset out of range: {n}"
            )));
        }
        let mut remaining = whole.abs() as u64;
        if remaining > 0 && !self.workweek.contains(&true) {
            return Err(AlmanacError::InvalidArgument(
                "cannot count business days with an empty workweek".to_string(),
            ));
        }

        let step = TimeDelta::days(if n >= 0.0 { 1 } else { -1 });
        let mut cur = *dt;
        while remaining > 0 {
            cur = cur.checked_add_signed(step).ok_or_else(|| {
                AlmanacError::InvalidArgument(format!(
                    "adding {whole} business days leaves the supported range"
                ))
            })?;
            if self.is_workday(&cur) {
                remaining -= 1;
            }
        }
        Ok(cur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ctx() -> Context {
        Context::utc(Utc.with_ymd_and_hms(2026, 2, 18, 14, 30, 0).unwrap())
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
    }

    fn calendar(holidays: &[&str], workweek: &[u8]) -> BusinessCalendar {
        let config = BusinessCalendarConfig {
            holidays: holidays.iter().map(|h| h.to_string()).collect(),
            workweek: workweek.to_vec(),
        };
        BusinessCalendar::new(&config, &ctx()).unwrap()
    }

    fn standard() -> BusinessCalendar {
        BusinessCalendar::new(&BusinessCalendarConfig::default(), &ctx()).unwrap()
    }

    #[test]
    fn test_default_workweek_is_monday_to_friday() {
        let cal = standard();
        // 2024-03-04 is a Monday
        assert!(cal.is_workday(&utc(2024, 3, 4, 9)));
        assert!(cal.is_workday(&utc(2024, 3, 8, 9)));
        assert!(!cal.is_workday(&utc(2024, 3, 9, 9)));
        assert!(!cal.is_workday(&utc(2024, 3, 10, 9)));
    }

    #[test]
    fn test_holiday_matches_whole_day() {
        let cal = calendar(&["2024-12-25"], &[1, 2, 3, 4, 5]);
        assert!(cal.is_holiday(&utc(2024, 12, 25, 0)));
        assert!(cal.is_holiday(&utc(2024, 12, 25, 23)));
        assert!(!cal.is_holiday(&utc(2024, 12, 24, 12)));
        assert!(!cal.is_workday(&utc(2024, 12, 25, 9)));
    }

    #[test]
    fn test_holidays_accept_flexible_text() {
        let cal = calendar(&["December 25, 2024", "12/26/2024"], &[1, 2, 3, 4, 5]);
        assert!(cal.is_holiday(&utc(2024, 12, 25, 9)));
        assert!(cal.is_holiday(&utc(2024, 12, 26, 9)));
    }

    #[test]
    fn test_add_business_days_skips_weekend() {
        let cal = standard();
        let friday = utc(2024, 3, 8, 17);
        assert_eq!(cal.add_business_days(&friday, 1.0).unwrap(), utc(2024, 3, 11, 17));
        assert_eq!(cal.add_business_days(&friday, 6.0).unwrap(), utc(2024, 3, 18, 17));
    }

    #[test]
    fn test_add_business_days_skips_holidays() {
        let cal = calendar(&["2024-12-25", "2024-12-26"], &[1, 2, 3, 4, 5]);
        // Tue 2024-12-24 + 1 skips Wed and Thu holidays
        assert_eq!(cal.add_business_days(&utc(2024, 12, 24, 9), 1.0).unwrap(), utc(2024, 12, 27, 9));
    }

    #[test]
    fn test_add_business_days_backwards() {
        let cal = standard();
        let monday = utc(2024, 3, 11, 9);
        assert_eq!(cal.add_business_days(&monday, -1.0).unwrap(), utc(2024, 3, 8, 9));
    }

    #[test]
    fn test_add_business_days_floors_fractions() {
        let cal = standard();
        let monday = utc(2024, 3, 11, 9);
        assert_eq!(cal.add_business_days(&monday, 1.7).unwrap(), utc(2024, 3, 12, 9));
        assert_eq!(cal.add_business_days(&monday, 0.4).unwrap(), monday);
        // floor(-0.5) = -1
        assert_eq!(cal.add_business_days(&monday, -0.5).unwrap(), utc(2024, 3, 8, 9));
    }

    #[test]
    fn test_add_zero_business_days_is_identity_even_on_weekend() {
        let cal = standard();
        let saturday = utc(2024, 3, 9, 11);
        assert_eq!(cal.add_business_days(&saturday, 0.0).unwrap(), saturday);
    }

    #[test]
    fn test_custom_workweek() {
        // Sunday to Thursday
        let cal = calendar(&[], &[0, 1, 2, 3, 4]);
        let thursday = utc(2024, 3, 7, 9);
        assert!(!cal.is_workday(&utc(2024, 3, 8, 9)));
        assert_eq!(cal.add_business_days(&thursday, 1.0).unwrap(), utc(2024, 3, 10, 9));
    }

    #[test]
    fn test_invalid_configuration() {
        let bad_holiday = BusinessCalendarConfig {
            holidays: vec!["someday".to_string()],
            ..Default::default()
        };
        let err = BusinessCalendar::new(&bad_holiday, &ctx()).unwrap_err();
        assert!(matches!(err, AlmanacError::InvalidInput(_)), "got: {err}");

        let bad_day = BusinessCalendarConfig {
            workweek: vec![1, 7],
            ..Default::default()
        };
        let err = BusinessCalendar::new(&bad_day, &ctx()).unwrap_err();
        assert!(matches!(err, AlmanacError::InvalidArgument(_)), "got: {err}");
    }

    #[test]
    fn test_invalid_offsets() {
        let cal = standard();
        let dt = utc(2024, 3, 11, 9);
        assert!(cal.add_business_days(&dt, f64::NAN).is_err());
        assert!(cal.add_business_days(&dt, f64::INFINITY).is_err());
        assert!(cal.add_business_days(&dt, 1.0e12).is_err());

        let idle = calendar(&[], &[]);
        assert!(idle.add_business_days(&dt, 1.0).is_err());
        assert_eq!(idle.add_business_days(&dt, 0.0).unwrap(), dt);
    }

    #[test]
    fn test_queries_use_calendar_frame() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let cal = BusinessCalendar::new(&BusinessCalendarConfig::default(), &ctx().with_offset(tokyo))
            .unwrap();
        // Friday 20:00 UTC is already Saturday in Tokyo
        assert!(!cal.is_workday(&utc(2024, 3, 8, 20)));
        assert!(cal.is_workday(&utc(2024, 3, 8, 10)));
    }

    #[test]
    fn test_date_only_holiday_is_utc_midnight_in_calendar_frame() {
        let minus5 = FixedOffset::west_opt(5 * 3600).unwrap();
        let config = BusinessCalendarConfig {
            holidays: vec!["2024-12-25".into(), "2025-01-01T00:00:00-05:00".into()],
            ..Default::default()
        };
        let cal = BusinessCalendar::new(&config, &ctx().with_offset(minus5)).unwrap();
        assert!(cal.is_holiday(&minus5.with_ymd_and_hms(2024, 12, 24, 12, 0, 0).unwrap()));
        assert!(!cal.is_holiday(&minus5.with_ymd_and_hms(2024, 12, 25, 12, 0, 0).unwrap()));
        assert!(cal.is_holiday(&minus5.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()));
    }

    #[test]
    fn test_config_from_json_defaults() {
        let config: BusinessCalendarConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BusinessCalendarConfig::default());
        let config: BusinessCalendarConfig =
            serde_json::from_str(r#"{ "workweek": [0, 6] }"#).unwrap();
        assert!(config.holidays.is_empty());
        assert_eq!(config.workweek, vec![0, 6]);
    }
}
