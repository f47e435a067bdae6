//! Time and timestamp utilities

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Parse an event timestamp as emitted by the collector.
///
/// Accepts RFC 3339 (`2026-01-04T10:15:00Z`), naive ISO-8601 (`2026-01-04T10:15:00.123456`,
/// read as UTC), a space-separated SQL datetime, and Unix epoch seconds with an optional
/// fractional part (`1767520000.5`).
pub fn parse_event_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    let secs: f64 = raw.parse().ok()?;
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.trunc() as i64;
    let nanos = ((secs - secs.trunc()) * 1e9).round() as u32;
    Utc.timestamp_opt(whole, nanos.min(999_999_999)).single()
}
