//! Property tests for the calendrical invariants.

use almanac::calendar::{add, iso_week, iso_week_year};
use almanac::{
    generate, parse_rfc3339, parse_rule, BusinessCalendar, BusinessCalendarConfig, Context,
    DateRange, Instant, Moment, Unit,
};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, TimeDelta, TimeZone, Utc};
use proptest::prelude::*;

mod generators {
    use super::*;

    /// Epoch milliseconds between 1900 and 2200.
    pub fn arb_millis() -> impl Strategy<Value = i64> {
        -2_208_988_800_000_i64..7_258_118_400_000_i64
    }

    /// Offsets on a 15-minute grid between -12:00 and +14:00.
    pub fn arb_offset() -> impl Strategy<Value = FixedOffset> {
        (-48_i32..=56).prop_map(|quarters| FixedOffset::east_opt(quarters * 900).unwrap())
    }

    pub fn arb_datetime() -> impl Strategy<Value = DateTime<FixedOffset>> {
        (arb_millis(), arb_offset()).prop_map(|(ms, offset)| {
            DateTime::from_timestamp_millis(ms)
                .unwrap()
                .with_timezone(&offset)
        })
    }

    pub fn arb_fixed_unit() -> impl Strategy<Value = Unit> {
        prop_oneof![
            Just(Unit::Millisecond),
            Just(Unit::Second),
            Just(Unit::Minute),
            Just(Unit::Hour),
            Just(Unit::Day),
            Just(Unit::Week),
        ]
    }

    pub fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (1900_i32..2200, 1_u32..=366).prop_filter_map("day exists in year", |(year, ordinal)| {
            NaiveDate::from_yo_opt(year, ordinal)
        })
    }
}

use generators::*;

fn ctx() -> Context {
    Context::utc(Utc.with_ymd_and_hms(2026, 2, 18, 14, 30, 0).unwrap())
}

proptest! {
    #[test]
    fn prop_fixed_unit_add_is_invertible(dt in arb_datetime(), n in -10_000_i64..10_000, unit in arb_fixed_unit()) {
        let there = add(&dt, n as f64, unit).unwrap();
        let back = add(&there, -(n as f64), unit).unwrap();
        prop_assert_eq!(back, dt);
    }

    #[test]
    fn prop_month_add_is_invertible_without_clamping(
        year in 1900_i32..2200,
        month in 1_u32..=12,
        day in 1_u32..=28,
        n in -240_i64..240,
    ) {
        let dt = Utc.fix().with_ymd_and_hms(year, month, day, 9, 30, 0).unwrap();
        let there = add(&dt, n as f64, Unit::Month).unwrap();
        prop_assert_eq!(there.day(), day);
        prop_assert_eq!(add(&there, -(n as f64), Unit::Month).unwrap(), dt);
    }

    #[test]
    fn prop_month_add_clamps_to_last_day(year in 1900_i32..2200, month in 1_u32..=12, n in 1_i64..24) {
        let last = almanac::days_in_month(year, month).unwrap();
        let dt = Utc.fix().with_ymd_and_hms(year, month, last, 0, 0, 0).unwrap();
        let there = add(&dt, n as f64, Unit::Month).unwrap();
        let target_len = almanac::days_in_month(there.year(), there.month()).unwrap();
        prop_assert_eq!(there.day(), last.min(target_len));
    }

    #[test]
    fn prop_rfc3339_round_trips(ms in arb_millis()) {
        let instant = Instant::from_millis(ms);
        let parsed = parse_rfc3339(&instant.to_string()).unwrap();
        prop_assert_eq!(parsed, Some(instant));
    }

    #[test]
    fn prop_iso_week_matches_chrono(date in arb_date()) {
        let dt = Utc.fix().from_local_datetime(&date.and_hms_opt(12, 0, 0).unwrap()).unwrap();
        let expected = date.iso_week();
        prop_assert_eq!(iso_week(&dt), expected.week());
        prop_assert_eq!(iso_week_year(&dt), expected.year());
    }

    #[test]
    fn prop_from_iso_week_inverts_iso_week(date in arb_date()) {
        let week = date.iso_week();
        let weekday = date.weekday().number_from_monday();
        let rebuilt = Moment::from_iso_week(week.year(), week.week(), weekday, &ctx()).unwrap();
        prop_assert_eq!(rebuilt.to_datetime().date_naive(), date);
    }

    #[test]
    fn prop_range_contains_iff_between(a in arb_millis(), b in arb_millis(), d in arb_millis()) {
        let (s, e) = (a.min(b), a.max(b));
        let range = DateRange::new(Instant::from_millis(s), Instant::from_millis(e)).unwrap();
        let probe = DateTime::from_timestamp_millis(d).unwrap();
        prop_assert_eq!(range.contains(&probe), s <= d && d <= e);
        prop_assert!(range.contains(&range.start()));
        prop_assert!(range.contains(&range.end()));
    }

    #[test]
    fn prop_intersect_is_commutative(bounds in proptest::array::uniform4(arb_millis())) {
        let [a, b, c, d] = bounds;
        let r1 = DateRange::new(Instant::from_millis(a.min(b)), Instant::from_millis(a.max(b))).unwrap();
        let r2 = DateRange::new(Instant::from_millis(c.min(d)), Instant::from_millis(c.max(d))).unwrap();
        let forward = r1.intersect(&r2);
        prop_assert_eq!(forward, r2.intersect(&r1));
        let overlaps = a.min(b).max(c.min(d)) <= a.max(b).min(c.max(d));
        prop_assert_eq!(forward.is_some(), overlaps);
    }

    #[test]
    fn prop_moon_phase_is_bounded_and_date_only(dt in arb_datetime(), hour in 0_u32..24) {
        let phase = Moment::from_datetime(dt).moon_phase();
        prop_assert!((0.0..=1.0).contains(&phase));
        let same_day = dt
            .offset()
            .from_local_datetime(&dt.date_naive().and_hms_opt(hour, 0, 0).unwrap())
            .unwrap();
        prop_assert_eq!(Moment::from_datetime(same_day).moon_phase(), phase);
    }

    #[test]
    fn prop_zero_business_days_is_identity(dt in arb_datetime(), workweek in proptest::collection::vec(0_u8..7, 0..7)) {
        let config = BusinessCalendarConfig { holidays: vec![], workweek };
        let cal = BusinessCalendar::new(&config, &ctx()).unwrap();
        prop_assert_eq!(cal.add_business_days(&dt, 0.0).unwrap(), dt);
    }

    #[test]
    fn prop_daily_rule_steps_exactly_one_day(dt in arb_datetime(), count in 1_u32..50) {
        let rule = parse_rule(&format!("FREQ=DAILY;INTERVAL=1;COUNT={count}")).unwrap();
        let out: Vec<_> = generate(&dt, &rule, 1000).collect();
        prop_assert_eq!(out.len(), count as usize);
        prop_assert!(!out.contains(&dt));
        prop_assert_eq!(out[0] - dt, TimeDelta::days(1));
        for pair in out.windows(2) {
            prop_assert_eq!(pair[1] - pair[0], TimeDelta::days(1));
        }
    }
}
