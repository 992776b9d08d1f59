use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Text layout of `created_at` in the store. Fixed width, so lexicographic
/// order is chronological order.
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Which end of a date range a user-supplied bound belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEnd {
    From,
    To,
}

/// Render a timestamp in the storage layout.
pub fn to_storage(ts: &DateTime<Utc>) -> String {
    ts.format(STORAGE_FORMAT).to_string()
}

/// Parse a stored `created_at` value.
///
/// Accepts the storage layout plus whole-second values written by
/// other tools against the same table.
pub fn from_storage(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse a range bound supplied by a caller.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and
/// `YYYY-MM-DD`. A bare date used as the upper bound covers the whole
/// day. Anything else is `None`.
pub fn parse_bound(raw: &str, end: RangeEnd) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for layout in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, layout) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let time = match end {
        RangeEnd::From => NaiveTime::MIN,
        RangeEnd::To => NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)?,
    };
    Some(Utc.from_utc_datetime(&date.and_time(time)))
}
