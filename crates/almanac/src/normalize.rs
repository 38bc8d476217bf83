//! Coercion of heterogeneous inputs into an [`Instant`].

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::instant::{Context, Instant};
use crate::parser::parse_flexible;

/// Any value the engine accepts where a point in time is expected.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// No value: the context's "now".
    Now,
    /// An instant that has already been normalized (possibly invalid).
    Instant(Instant),
    /// A native timestamp.
    DateTime(DateTime<Utc>),
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    /// Text for the flexible parser.
    Text(String),
    /// A record exposing an inner value.
    Wrapped(Box<Input>),
    /// An untyped value coerced on a best-effort basis.
    Json(Value),
}

/// Normalize any [`Input`] into an [`Instant`].
///
/// Never fails: inputs that cannot be interpreted produce
/// [`Instant::invalid`], which callers check with [`Instant::is_valid`].
pub fn normalize(input: impl Into<Input>, ctx: &Context) -> Instant {
    normalize_input(input.into(), ctx)
}

fn normalize_input(input: Input, ctx: &Context) -> Instant {
    match input {
        Input::Now => Instant::from(ctx.now),
        Input::Instant(instant) => instant,
        Input::DateTime(dt) => Instant::from(dt),
        Input::Millis(ms) => Instant::from_millis(ms),
        Input::Text(text) => parse_flexible(&text, ctx),
        Input::Wrapped(inner) => normalize_input(*inner, ctx),
        Input::Json(value) => coerce_json(value, ctx),
    }
}

fn coerce_json(value: Value, ctx: &Context) -> Instant {
    match value {
        Value::Null => Instant::from(ctx.now),
        Value::Number(n) => match n.as_i64() {
            Some(ms) => Instant::from_millis(ms),
            None => n.as_f64().map_or_else(Instant::invalid, millis_from_f64),
        },
        Value::String(text) => parse_flexible(&text, ctx),
        Value::Object(mut map) => match map.remove("value") {
            Some(inner) if is_present(&inner) => coerce_json(inner, ctx),
            _ => {
                tracing::debug!("object without a usable 'value' member");
                Instant::invalid()
            }
        },
        Value::Bool(_) | Value::Array(_) => Instant::invalid(),
    }
}

/// A wrapped `value` only counts when it carries something.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => true,
    }
}

fn millis_from_f64(ms: f64) -> Instant {
    // Saturating cast: anything that saturates is out of range anyway.
    if ms.is_finite() {
        Instant::from_millis(ms.trunc() as i64)
    } else {
        Instant::invalid()
    }
}

impl From<()> for Input {
    fn from(_: ()) -> Self {
        Input::Now
    }
}

impl From<Instant> for Input {
    fn from(instant: Instant) -> Self {
        Input::Instant(instant)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Input {
    fn from(dt: DateTime<Tz>) -> Self {
        Input::DateTime(dt.with_timezone(&Utc))
    }
}

impl From<i64> for Input {
    fn from(ms: i64) -> Self {
        Input::Millis(ms)
    }
}

impl From<f64> for Input {
    fn from(ms: f64) -> Self {
        Input::Instant(millis_from_f64(ms))
    }
}

impl From<&str> for Input {
    fn from(text: &str) -> Self {
        Input::Text(text.to_string())
    }
}

impl From<String> for Input {
    fn from(text: String) -> Self {
        Input::Text(text)
    }
}

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        Input::Json(value)
    }
}

impl<T: Into<Input>> From<Option<T>> for Input {
    fn from(value: Option<T>) -> Self {
        value.map_or(Input::Now, Into::into)
    }
}
