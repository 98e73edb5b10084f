//! Timestamp handling for both pipelines.
//!
//! Extraction normalizes the bracketed log timestamp (`Mon Jan 02 15:04:05
//! 2024`) into `YYYY-MM-DD HH:MM:SS`, passing the raw text through when it
//! does not parse. Merge turns table values back into comparable instants.
use chrono::{DateTime, NaiveDate, NaiveDateTime, Weekday};

/// Output form for normalized timestamps. `%.f` is empty when the fraction is zero.
pub const NORMALIZED_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Log timestamp layout after the leading weekday token.
const LOG_FORMAT_NO_WEEKDAY: &str = "%b %d %H:%M:%S %Y";

const TABLE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse the log-native layout. The weekday must name a day but is not
/// checked against the date.
pub fn parse_log_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let (weekday, rest) = raw.trim().split_once(char::is_whitespace)?;
    weekday.parse::<Weekday>().ok()?;
    NaiveDateTime::parse_from_str(rest.trim_start(), LOG_FORMAT_NO_WEEKDAY).ok()
}

/// Normalize a bracketed log timestamp, falling back to the raw text.
pub fn normalize_log_timestamp(raw: &str) -> String {
    match parse_log_timestamp(raw) {
        Some(dt) => format_instant(&dt),
        None => raw.to_string(),
    }
}

pub fn format_instant(dt: &NaiveDateTime) -> String {
    dt.format(NORMALIZED_FORMAT).to_string()
}

/// Best-effort conversion of a table timestamp into an instant.
///
/// Offsets are folded into UTC; date-only values map to midnight.
pub fn parse_instant(value: &str) -> Option<NaiveDateTime> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in TABLE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    parse_log_timestamp(s)
}
