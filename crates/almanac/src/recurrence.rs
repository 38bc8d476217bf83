//! Recurrence rules: `FREQ`, `INTERVAL`, `COUNT`, `BYDAY`, `BYMONTHDAY`.
//!
//! A rule is expanded from a start datetime into a lazy, bounded sequence.
//! The start itself is never an occurrence: step `k` (from 1) advances the
//! start by `k * interval` frequency units, and each step yields either one
//! occurrence or, for `WEEKLY;BYDAY` and `MONTHLY;BYMONTHDAY`, one per listed
//! day inside the reached week or month.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar::{self, Unit};
use crate::error::{AlmanacError, Result};

/// Hard upper bound on generated occurrences when the caller has no
/// tighter cap.
pub const DEFAULT_CAP: usize = 1000;

/// Consecutive steps that may produce nothing (e.g. `BYMONTHDAY=31` on an
/// interval that only lands on 30-day months) before expansion gives up.
const MAX_EMPTY_STEPS: usize = 4800;

// ── Rule model ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }

    fn unit(self) -> Unit {
        match self {
            Frequency::Daily => Unit::Day,
            Frequency::Weekly => Unit::Week,
            Frequency::Monthly => Unit::Month,
            Frequency::Yearly => Unit::Year,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = AlmanacError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            other => Err(AlmanacError::Format(format!("unsupported FREQ '{other}'"))),
        }
    }
}

/// A parsed recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Steps between occurrences. Parsed rules always carry at least 1, and
    /// expansion treats 0 as 1.
    pub interval: u32,
    /// `None` and `Some(0)` both mean "bounded only by the cap".
    pub count: Option<u32>,
    /// Only used by `WEEKLY`. Duplicates are removed, first occurrence wins.
    /// Days are emitted in calendar order within each week, so list order
    /// does not change which days `COUNT` keeps.
    pub by_weekday: Vec<Weekday>,
    /// Only used by `MONTHLY`. Duplicates are removed, first occurrence wins.
    pub by_month_day: Vec<i32>,
    /// Unrecognized keys (lower-cased) and their raw values.
    pub extensions: BTreeMap<String, String>,
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        RecurrenceRule {
            frequency: Frequency::Daily,
            interval: 1,
            count: None,
            by_weekday: Vec::new(),
            by_month_day: Vec::new(),
            extensions: BTreeMap::new(),
        }
    }
}

impl RecurrenceRule {
    /// Canonical rule text: recognized keys in a fixed order, `INTERVAL`
    /// only when it is above 1, then extensions with upper-cased keys.
    pub fn to_text(&self) -> String {
        let mut parts = vec![format!("FREQ={}", self.frequency)];
        if self.interval > 1 {
            parts.push(format!("INTERVAL={}", self.interval));
        }
        if let Some(count) = self.count {
            parts.push(format!("COUNT={count}"));
        }
        if !self.by_weekday.is_empty() {
            let codes: Vec<&str> = self.by_weekday.iter().map(|wd| weekday_code(*wd)).collect();
            parts.push(format!("BYDAY={}", codes.join(",")));
        }
        if !self.by_month_day.is_empty() {
            let days: Vec<String> = self.by_month_day.iter().map(i32::to_string).collect();
            parts.push(format!("BYMONTHDAY={}", days.join(",")));
        }
        for (key, value) in &self.extensions {
            parts.push(format!("{}={value}", key.to_ascii_uppercase()));
        }
        parts.join(";")
    }

    /// The number of occurrences expansion will produce at most.
    pub fn limit(&self, cap: usize) -> usize {
        match self.count.filter(|c| *c > 0) {
            Some(count) => cap.min(usize::try_from(count).unwrap_or(usize::MAX)),
            None => cap,
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl FromStr for RecurrenceRule {
    type Err = AlmanacError;

    fn from_str(s: &str) -> Result<Self> {
        parse_rule(s)
    }
}

// ── Parsing ─────────────────────────────────────────────────────────────────

/// Parse semicolon-separated `KEY=VALUE` rule text.
///
/// Keys are case-insensitive. A missing `FREQ` means `DAILY`; an `INTERVAL`
/// that is not a positive integer becomes 1. Unrecognized keys are kept in
/// [`RecurrenceRule::extensions`].
///
/// # Errors
///
/// Returns [`AlmanacError::Format`] for a segment without `=`, an unknown
/// `FREQ`, a `COUNT` that is not a non-negative integer, an unknown `BYDAY`
/// code or a `BYMONTHDAY` entry that is not an integer.
///
/// # Examples
///
/// ```
/// use almanac::recurrence::{parse_rule, Frequency};
///
/// let rule = parse_rule("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,FR;X-NAME=standup").unwrap();
/// assert_eq!(rule.frequency, Frequency::Weekly);
/// assert_eq!(rule.interval, 2);
/// assert_eq!(rule.extensions["x-name"], "standup");
/// ```
pub fn parse_rule(text: &str) -> Result<RecurrenceRule> {
    let mut rule = RecurrenceRule::default();

    for segment in text.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let (key, value) = segment.split_once('=').ok_or_else(|| {
            AlmanacError::Format(format!("rule segment '{segment}' is not KEY=VALUE"))
        })?;
        let (key, value) = (key.trim().to_ascii_uppercase(), value.trim());

        match key.as_str() {
            "FREQ" => rule.frequency = value.parse()?,
            "INTERVAL" => rule.interval = parse_interval(value),
            "COUNT" => {
                let count = value.parse::<u32>().map_err(|_| {
                    AlmanacError::Format(format!("COUNT must be a non-negative integer, got '{value}'"))
                })?;
                rule.count = Some(count);
            }
            "BYDAY" => {
                rule.by_weekday = dedup(
                    value
                        .split(',')
                        .map(|code| parse_weekday_code(code.trim()))
                        .collect::<Result<Vec<_>>>()?,
                );
            }
            "BYMONTHDAY" => {
                rule.by_month_day = dedup(
                    value
                        .split(',')
                        .map(|day| {
                            day.trim().parse::<i32>().map_err(|_| {
                                AlmanacError::Format(format!("BYMONTHDAY entry '{day}' is not an integer"))
                            })
                        })
                        .collect::<Result<Vec<_>>>()?,
                );
            }
            _ => {
                rule.extensions.insert(key.to_ascii_lowercase(), value.to_string());
            }
        }
    }

    Ok(rule)
}

fn parse_interval(value: &str) -> u32 {
    match value.parse::<i64>() {
        Ok(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => {
            tracing::debug!(value, "INTERVAL clamped to 1");
            1
        }
    }
}

fn parse_weekday_code(code: &str) -> Result<Weekday> {
    match code.to_ascii_uppercase().as_str() {
        "MO" => Ok(Weekday::Mon),
        "TU" => Ok(Weekday::Tue),
        "WE" => Ok(Weekday::Wed),
        "TH" => Ok(Weekday::Thu),
        "FR" => Ok(Weekday::Fri),
        "SA" => Ok(Weekday::Sat),
        "SU" => Ok(Weekday::Sun),
        _ => Err(AlmanacError::Format(format!("unknown BYDAY code '{code}'"))),
    }
}

fn weekday_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

fn dedup<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

// ── Expansion ───────────────────────────────────────────────────────────────

/// Expand `rule` from `start`, producing at most `min(count, cap)`
/// occurrences.
///
/// Within one week or month the occurrences are chronological, whatever
/// order `BYDAY`/`BYMONTHDAY` listed them in. `BYDAY` occurrences keep the
/// start's time of day; `BYMONTHDAY` occurrences fall at local midnight, and
/// days the month does not have are skipped.
pub fn generate(start: &DateTime<FixedOffset>, rule: &RecurrenceRule, cap: usize) -> Occurrences {
    let limit = rule.limit(cap);
    tracing::debug!(
        rule = %rule,
        limit,
        "expanding recurrence"
    );
    Occurrences {
        start: *start,
        rule: rule.clone(),
        limit,
        emitted: 0,
        step: 0,
        pending: VecDeque::new(),
        done: limit == 0,
    }
}

/// Lazy occurrence sequence returned by [`generate`].
#[derive(Debug, Clone)]
pub struct Occurrences {
    start: DateTime<FixedOffset>,
    rule: RecurrenceRule,
    limit: usize,
    emitted: usize,
    step: i64,
    pending: VecDeque<DateTime<FixedOffset>>,
    done: bool,
}

impl Occurrences {
    /// Compute the occurrences of the next step, skipping steps that
    /// produce nothing. Returns `false` once expansion cannot continue.
    fn refill(&mut self) -> bool {
        for _ in 0..MAX_EMPTY_STEPS {
            self.step += 1;
            let Some(batch) = self.expand_step(self.step) else {
                tracing::debug!(step = self.step, "recurrence left the supported range");
                return false;
            };
            if !batch.is_empty() {
                self.pending.extend(batch);
                return true;
            }
        }
        tracing::debug!(rule = %self.rule, "recurrence produced nothing for too many steps");
        false
    }

    fn expand_step(&self, step: i64) -> Option<Vec<DateTime<FixedOffset>>> {
        let amount = step.checked_mul(i64::from(self.rule.interval.max(1)))?;
        let freq = self.rule.frequency;

        if freq == Frequency::Monthly && !self.rule.by_month_day.is_empty() {
            return self.month_days(amount);
        }

        let cur = calendar::add_whole(&self.start, amount, freq.unit()).ok()?;
        if freq == Frequency::Weekly && !self.rule.by_weekday.is_empty() {
            return self.week_days(&cur);
        }
        Some(vec![cur])
    }

    /// The listed weekdays of the Sunday-based week containing `cur`.
    fn week_days(&self, cur: &DateTime<FixedOffset>) -> Option<Vec<DateTime<FixedOffset>>> {
        let back = TimeDelta::days(i64::from(cur.weekday().num_days_from_sunday()));
        let sunday = cur.checked_sub_signed(back)?;
        let mut days = self
            .rule
            .by_weekday
            .iter()
            .map(|wd| {
                sunday.checked_add_signed(TimeDelta::days(i64::from(wd.num_days_from_sunday())))
            })
            .collect::<Option<Vec<_>>>()?;
        days.sort();
        Some(days)
    }

    /// The listed days of the month `months` after the start month, at
    /// local midnight.
    fn month_days(&self, months: i64) -> Option<Vec<DateTime<FixedOffset>>> {
        let index = i64::from(self.start.year()) * 12 + i64::from(self.start.month0());
        let target = index.checked_add(months)?;
        let year = i32::try_from(target.div_euclid(12)).ok()?;
        let month = u32::try_from(target.rem_euclid(12)).ok()? + 1;
        let len = calendar::month_len(year, month);

        let mut days: Vec<u32> = self
            .rule
            .by_month_day
            .iter()
            .filter_map(|d| u32::try_from(*d).ok())
            .filter(|d| (1..=len).contains(d))
            .collect();
        days.sort_unstable();

        days.into_iter()
            .map(|day| {
                let date = NaiveDate::from_ymd_opt(year, month, day)?;
                calendar::at_local(self.start.timezone(), date, NaiveTime::MIN).ok()
            })
            .collect()
    }
}

impl Iterator for Occurrences {
    type Item = DateTime<FixedOffset>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.emitted >= self.limit {
            return None;
        }
        if self.pending.is_empty() && !self.refill() {
            self.done = true;
            return None;
        }
        let next = self.pending.pop_front()?;
        self.emitted += 1;
        Some(next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, Some(self.limit - self.emitted))
        }
    }
}

impl FusedIterator for Occurrences {}

// ── Tests ───────────────────────────────────────────────────────────────────
