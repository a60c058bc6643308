//! Drift-free computation of per-series check times.
//!
//! A series is checked once per configured hour per day. The next wake time
//! is always hour-aligned and strictly in the future, and asking again with
//! a later `now` never yields an earlier time.

use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, Timelike};

/// Next hour-aligned check time strictly after `now`.
///
/// Picks the smallest configured hour strictly greater than `now`'s hour,
/// wrapping to the smallest configured hour of the next day. If `now` falls
/// inside a configured hour, that hour counts as already checked today and
/// the result wraps a full 24 hours.
pub fn next_check_time(check_hours: &[u8], now: DateTime<Local>) -> DateTime<Local> {
    let current = now.hour();
    let next_hour = check_hours
        .iter()
        .copied()
        .filter(|&h| u32::from(h) > current)
        .min()
        .or_else(|| check_hours.iter().copied().min())
        .map_or(current, u32::from);

    let delta = if next_hour > current {
        next_hour - current
    } else {
        24 - (current - next_hour)
    };

    truncate_to_hour(now + TimeDelta::hours(i64::from(delta)))
}

/// Time to sleep until the next check for `check_hours`.
pub fn wait_duration(check_hours: &[u8], now: DateTime<Local>) -> Duration {
    (next_check_time(check_hours, now) - now)
        .to_std()
        .unwrap_or_default()
}

fn truncate_to_hour(t: DateTime<Local>) -> DateTime<Local> {
    t.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}
