use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::model::{Ms, Span};

/// Naive formats accepted for wall-clock timestamps, tried in order.
/// The first matches what an HTML `datetime-local` input produces.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

pub fn now_ms() -> Ms {
    chrono::Utc::now().timestamp_millis()
}

/// Convert a wall-clock time in `tz` to Unix milliseconds.
///
/// Ambiguous times (DST fold) resolve to the earliest instant. Times inside a
/// DST gap are shifted forward by an hour; if that still fails the wall
/// clock is read as UTC.
pub fn local_to_ms<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> Ms {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return dt.timestamp_millis();
    }
    let shifted = naive + Duration::hours(1);
    match tz.from_local_datetime(&shifted).earliest() {
        Some(dt) => dt.timestamp_millis(),
        None => naive.and_utc().timestamp_millis(),
    }
}

/// Local `00:00:00.000` through `23:59:59.999` of `date` in `tz`.
pub fn day_span<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Span {
    let midnight = date.and_time(NaiveTime::MIN);
    let last_ms = midnight + Duration::days(1) - Duration::milliseconds(1);
    Span::new(local_to_ms(midnight, tz), local_to_ms(last_ms, tz))
}

/// Parse a timestamp as sent by the room service or typed into a filter.
///
/// RFC 3339 strings carry their own offset; naive strings are read as wall
/// clock in `tz`. Returns `None` for blank or unrecognised input.
pub fn parse_instant<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<Ms> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| local_to_ms(naive, tz))
}
