//! `almanac` command-line front end.
//!
//! Every subcommand is a stateless function of its arguments that prints a
//! single JSON document to stdout. Errors go to stderr with a non-zero exit.

use std::path::PathBuf;

use almanac::format::DEFAULT_PATTERN;
use almanac::{
    parse_flexible, parse_rfc3339, parse_rule, parse_utc_offset, BusinessCalendar,
    BusinessCalendarConfig, Context, DateRange, DurationValue, HumanizeOptions, Moment, Step,
    Unit, DEFAULT_CAP,
};
use anyhow::{anyhow, Context as _, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "almanac", version, about = "Calendrical engine: parse, shift, recur and describe dates")]
struct Cli {
    /// Instant treated as "now" (RFC 3339). Defaults to the system clock.
    #[arg(long, global = true)]
    now: Option<String>,

    /// Local frame as a fixed UTC offset (`Z`, `+05:30`, `-0800`).
    #[arg(long, global = true, default_value = "Z")]
    offset: String,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse free-form date text
    Parse {
        text: String,
    },

    /// Render a date with a token pattern
    Format {
        date: String,
        #[arg(default_value = DEFAULT_PATTERN)]
        pattern: String,
    },

    /// Shift a date by an amount of a unit
    Add {
        date: String,
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        unit: Unit,
    },

    /// Whole units between two dates (a - b)
    Diff {
        a: String,
        b: String,
        #[arg(default_value = "millisecond")]
        unit: Unit,
    },

    /// Describe a date relative to another (default: now)
    Humanize {
        date: String,
        #[arg(long)]
        other: Option<String>,
        /// Requested locale; no built-in locale formatter exists
        #[arg(long)]
        locale: Option<String>,
    },

    /// Parse an ISO 8601 duration and print its canonical form
    Duration {
        text: String,
    },

    /// ISO week number and week-numbering year of a date
    IsoWeek {
        date: String,
    },

    /// Expand a recurrence rule from a start date
    Rrule {
        start: String,
        rule: String,
        /// Upper bound on emitted occurrences
        #[arg(long, default_value_t = DEFAULT_CAP)]
        cap: usize,
    },

    /// Add business days to a date
    Business {
        date: String,
        #[arg(allow_negative_numbers = true)]
        n: f64,
        /// Holiday date (repeatable)
        #[arg(long = "holiday")]
        holidays: Vec<String>,
        /// Working weekdays, 0 = Sunday (e.g. 1,2,3,4,5)
        #[arg(long, value_delimiter = ',')]
        workweek: Option<Vec<u8>>,
        /// JSON file with `holidays` and `workweek`
        #[arg(long)]
        calendar: Option<PathBuf>,
    },

    /// Enumerate a date range
    Range {
        start: String,
        end: String,
        #[arg(long, default_value = "day")]
        step_unit: Unit,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        step: i64,
    },

    /// Approximate moon phase of a date
    Moon {
        date: String,
    },

    /// Approximate sunrise and sunset on a date
    Sun {
        date: String,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = context(cli.now.as_deref(), &cli.offset)?;
    let output = run(cli.command, &ctx)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn context(now: Option<&str>, offset: &str) -> Result<Context> {
    let offset = parse_utc_offset(offset).context("invalid --offset")?;
    let now = match now {
        Some(text) => parse_rfc3339(text)
            .context("invalid --now")?
            .and_then(|instant| instant.to_datetime())
            .ok_or_else(|| anyhow!("invalid --now: expected RFC 3339, got '{text}'"))?,
        None => Utc::now(),
    };
    tracing::debug!(%now, %offset, "context");
    Ok(Context::new(now, offset))
}

fn moment(text: &str, ctx: &Context) -> Result<Moment> {
    Moment::new(text, ctx).with_context(|| format!("cannot read date '{text}'"))
}

fn run(command: Command, ctx: &Context) -> Result<Value> {
    match command {
        Command::Parse { text } => {
            let instant = parse_flexible(&text, ctx);
            Ok(json!({ "input": text, "instant": instant, "valid": instant.is_valid() }))
        }

        Command::Format { date, pattern } => {
            let m = moment(&date, ctx)?;
            Ok(json!({ "date": m, "pattern": pattern, "formatted": m.format(&pattern) }))
        }

        Command::Add { date, amount, unit } => {
            let m = moment(&date, ctx)?;
            let result = m
                .add(amount, unit)
                .with_context(|| format!("cannot add {amount} {unit} to {m}"))?;
            Ok(json!({ "date": m, "amount": amount, "unit": unit, "result": result }))
        }

        Command::Diff { a, b, unit } => {
            let (a, b) = (moment(&a, ctx)?, moment(&b, ctx)?);
            Ok(json!({ "a": a, "b": b, "unit": unit, "diff": a.diff(&b, unit) }))
        }

        Command::Humanize { date, other, locale } => {
            let m = moment(&date, ctx)?;
            let other = match other {
                Some(text) => moment(&text, ctx)?,
                None => Moment::now(ctx),
            };
            let opts = HumanizeOptions {
                locale: locale.as_deref(),
                formatter: None,
            };
            let text = m.humanize_diff(&other, &opts)?;
            Ok(json!({ "date": m, "other": other, "text": text }))
        }

        Command::Duration { text } => {
            let duration: DurationValue = text
                .parse()
                .with_context(|| format!("cannot read duration '{text}'"))?;
            Ok(json!({ "duration": duration, "canonical": duration.to_text() }))
        }

        Command::IsoWeek { date } => {
            let m = moment(&date, ctx)?;
            Ok(json!({ "date": m, "week": m.iso_week(), "year": m.iso_week_year() }))
        }

        Command::Rrule { start, rule, cap } => {
            let start = moment(&start, ctx)?;
            let rule = parse_rule(&rule).with_context(|| format!("cannot read rule '{rule}'"))?;
            let occurrences: Vec<Moment> = start
                .schedule(&rule)
                .all(cap)
                .map(Moment::from_datetime)
                .collect();
            Ok(json!({
                "start": start,
                "rule": rule,
                "canonical": rule.to_text(),
                "occurrences": occurrences,
            }))
        }

        Command::Business {
            date,
            n,
            holidays,
            workweek,
            calendar,
        } => {
            let mut config = match calendar {
                Some(path) => {
                    let raw = std::fs::read_to_string(&path)
                        .with_context(|| format!("cannot read {}", path.display()))?;
                    serde_json::from_str::<BusinessCalendarConfig>(&raw)
                        .with_context(|| format!("invalid calendar file {}", path.display()))?
                }
                None => BusinessCalendarConfig::default(),
            };
            config.holidays.extend(holidays);
            if let Some(workweek) = workweek {
                config.workweek = workweek;
            }
            let cal = BusinessCalendar::new(&config, ctx)?;
            let m = moment(&date, ctx)?;
            let result = m.add_business_days(n, &cal)?;
            Ok(json!({
                "date": m,
                "n": n,
                "result": result,
                "is_business_day": result.is_business_day(&cal),
            }))
        }

        Command::Range {
            start,
            end,
            step_unit,
            step,
        } => {
            let range = DateRange::new(moment(&start, ctx)?, moment(&end, ctx)?)?;
            let steps: Vec<Moment> = range
                .steps(Step::new(step, step_unit))?
                .map(Moment::from_datetime)
                .collect();
            Ok(json!({ "range": range, "steps": steps }))
        }

        Command::Moon { date } => {
            let m = moment(&date, ctx)?;
            Ok(json!({ "date": m, "phase": m.moon_phase() }))
        }

        Command::Sun { date, lat, lon } => {
            let m = moment(&date, ctx)?;
            Ok(json!({
                "date": m,
                "sunrise": m.sunrise(lat, lon)?,
                "sunset": m.sunset(lat, lon)?,
            }))
        }
    }
}
