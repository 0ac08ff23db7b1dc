//! Date/time canonicalization for repository date strings.
//!
//! Source records join the date and time portions with a colon rather
//! than a space or `T` (e.g. `2019-06-07:14:30:00`). The first colon
//! after the calendar date is rewritten to a space before parsing, so
//! plain dates, date+time, and fractional-second forms all pass
//! through one parse path.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{Result, TransformError};

/// Accepted formats after the colon-joiner fixup.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Rewrite the first colon, which joins date and time, to a space.
/// Time-of-day colons are left alone; date-only input has none.
fn fix_joiner(raw: &str) -> String {
    raw.trim().replacen(':', " ", 1)
}

fn parse_error(attribute: &str, raw: &str) -> TransformError {
    TransformError::DateParse {
        attribute: attribute.to_owned(),
        value: raw.to_owned(),
    }
}

/// Parse a repository date-or-datetime string into a naive instant.
///
/// Date-only input parses to midnight.
pub fn parse_flexible(attribute: &str, raw: &str) -> Result<NaiveDateTime> {
    let fixed = fix_joiner(raw);
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&fixed, format) {
            return Ok(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&fixed, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }
    Err(parse_error(attribute, raw))
}

/// Parse to a timezone-aware instant pinned to UTC.
pub fn to_utc(attribute: &str, raw: &str) -> Result<DateTime<Utc>> {
    parse_flexible(attribute, raw).map(|dt| dt.and_utc())
}

/// Parse and serialize to a full ISO-8601 string with a UTC offset.
pub fn to_iso_utc(attribute: &str, raw: &str) -> Result<String> {
    to_utc(attribute, raw).map(|dt| dt.to_rfc3339())
}

/// Parse and serialize, keeping only the calendar-date portion.
pub fn to_iso_date(attribute: &str, raw: &str) -> Result<String> {
    let dt = parse_flexible(attribute, raw)?;
    Ok(dt.format("%Y-%m-%d").to_string())
}
