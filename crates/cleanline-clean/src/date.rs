//! Lenient date parsing for text columns

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

const DATE_ONLY: &str = "%Y-%m-%d";
const DATE_TIME: &str = "%Y-%m-%d %H:%M:%S";
const DATE_TIME_FRACTION: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Parse a date or timestamp; `None` for empty or unrecognised text.
///
/// Offsets in RFC 3339 input are normalised to UTC.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Render a date column.
///
/// The whole column is written as plain dates when no value carries a time
/// of day, otherwise every value gets `HH:MM:SS`, plus the fractional part
/// for values that have one. Nulls become empty cells.
pub fn format_column(values: &[Option<NaiveDateTime>]) -> Vec<String> {
    let date_only = values.iter().flatten().all(|v| v.time() == NaiveTime::MIN);
    let fractional = values.iter().flatten().any(|v| v.nanosecond() != 0);
    let fmt = match (date_only, fractional) {
        (true, _) => DATE_ONLY,
        (false, false) => DATE_TIME,
        (false, true) => DATE_TIME_FRACTION,
    };
    values
        .iter()
        .map(|v| v.map(|v| v.format(fmt).to_string()).unwrap_or_default())
        .collect()
}
