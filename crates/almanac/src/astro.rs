//! Crude astronomical approximations.
//!
//! These are closed-form estimates kept for reproducibility, not accuracy:
//! the moon phase depends only on the calendar date, and sunrise/sunset
//! depend only on latitude.

use chrono::{DateTime, Datelike, FixedOffset, TimeDelta, TimeZone};

use crate::error::{AlmanacError, Result};

/// Position in the synodic cycle as a fraction in `[0, 1]`, where values
/// near 0 are one end of the cycle and 1 the other. Only the local date of
/// `dt` is used.
pub fn moon_phase(dt: &DateTime<FixedOffset>) -> f64 {
    let year = dt.year();
    let month = dt.month() as i32;
    let day = dt.day() as i32;

    let mut r = year % 100 % 19;
    if r > 9 {
        r -= 19;
    }
    let mut t = (r * 11) % 30 + month + day;
    if month < 3 {
        t += 2;
    }
    t %= 30;
    if t < 0 {
        t += 30;
    }
    f64::from((t - 15).abs()) / 15.0
}

/// Local noon minus the latitude offset. `longitude` is accepted but unused.
///
/// # Errors
///
/// Returns [`AlmanacError::InvalidArgument`] if either coordinate is not a
/// finite number.
pub fn sunrise(dt: &DateTime<FixedOffset>, latitude: f64, longitude: f64) -> Result<DateTime<FixedOffset>> {
    let offset = solar_offset(latitude, longitude)?;
    shift_from_noon(dt, -offset)
}

/// Local noon plus the latitude offset. `longitude` is accepted but unused.
///
/// # Errors
///
/// Returns [`AlmanacError::InvalidArgument`] if either coordinate is not a
/// finite number.
pub fn sunset(dt: &DateTime<FixedOffset>, latitude: f64, longitude: f64) -> Result<DateTime<FixedOffset>> {
    let offset = solar_offset(latitude, longitude)?;
    shift_from_noon(dt, offset)
}

/// Hours between solar noon and sunrise: `round(6 - |latitude| / 15)`,
/// rounding halves up.
fn solar_offset(latitude: f64, longitude: f64) -> Result<i64> {
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(AlmanacError::InvalidArgument(format!(
            "latitude and longitude must be finite numbers, got ({latitude}, {longitude})"
        )));
    }
    Ok((6.0 - latitude.abs() / 15.0 + 0.5).floor() as i64)
}

fn shift_from_noon(dt: &DateTime<FixedOffset>, hours: i64) -> Result<DateTime<FixedOffset>> {
    dt.date_naive()
        .and_hms_opt(12, 0, 0)
        .and_then(|noon| dt.timezone().from_local_datetime(&noon).single())
        .zip(TimeDelta::try_hours(hours))
        .and_then(|(noon, delta)| noon.checked_add_signed(delta))
        .ok_or_else(|| AlmanacError::InvalidArgument(format!("solar offset of {hours}h is out of range")))
}
