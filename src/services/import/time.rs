//! Timestamp and duration normalisation for report values.

use chrono::{DateTime, TimeDelta, Utc};

/// Parse a report timestamp such as `2025-07-25T01:27:10.160Z`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Where a resolved instant came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    Report,
    /// The report had no timestamp; the import clock was used.
    Missing,
    /// The report had a timestamp that could not be parsed; the import clock was used.
    Unparseable,
}

/// Resolve an optional report timestamp, substituting `now` when it is absent
/// or unusable.
pub fn resolve_instant(raw: Option<&str>, now: DateTime<Utc>) -> (DateTime<Utc>, TimeSource) {
    match raw {
        None => (now, TimeSource::Missing),
        Some(s) => match parse_timestamp(s) {
            Some(instant) => (instant, TimeSource::Report),
            None => (now, TimeSource::Unparseable),
        },
    }
}

/// Whole milliseconds from a report duration. Absent, negative and non-finite
/// values become zero.
pub fn duration_ms(raw: Option<f64>) -> i64 {
    match raw {
        Some(ms) if ms.is_finite() && ms > 0.0 => ms.trunc() as i64,
        _ => 0,
    }
}

/// `start + duration_ms`; equal to `start` when the duration is zero. `None`
/// when the sum falls outside the representable range.
pub fn finish_time(start: DateTime<Utc>, duration_ms: i64) -> Option<DateTime<Utc>> {
    if duration_ms <= 0 {
        return Some(start);
    }
    start.checked_add_signed(TimeDelta::try_milliseconds(duration_ms)?)
}
