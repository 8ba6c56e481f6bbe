//! Timestamp parsing for the two time signals the watcher compares.
//!
//! Both functions return epoch milliseconds. Zone-less values are read as UTC;
//! the watcher only compares timestamps from the same source against each
//! other, so the choice of zone does not affect ordering.

use chrono::{DateTime, NaiveDateTime};

const LAST_MODIFIED_FORMAT: &str = "%d %b %Y %H:%M:%S";
const LAST_UPDATED_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Parse a `Last-Modified` header value such as `Wed, 21 Oct 2015 07:28:00 GMT`.
///
/// The value is split on commas and the second component is used, with the
/// literal `GMT` removed and surrounding whitespace trimmed.
pub fn parse_last_modified(raw: &str) -> Option<i64> {
    let date = raw.split(',').nth(1)?.replace("GMT", "");
    let parsed = NaiveDateTime::parse_from_str(date.trim(), LAST_MODIFIED_FORMAT).ok()?;
    Some(parsed.and_utc().timestamp_millis())
}

/// Parse the aggregate row's `lastupdatedtime`.
///
/// The feed publishes `DD/MM/YYYY HH:MM:SS`; RFC 3339 is accepted as well.
pub fn parse_last_updated(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, LAST_UPDATED_FORMAT) {
        return Some(parsed.and_utc().timestamp_millis());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.timestamp_millis())
}
