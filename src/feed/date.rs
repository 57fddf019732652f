//! Publish-date normalization to UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// RFC-2822 layouts seen in the wild without any zone designator.
const ZONELESS_RFC2822: &[&str] = &["%a, %d %b %Y %H:%M:%S", "%d %b %Y %H:%M:%S"];

/// ISO-8601 layouts carrying a `+HHMM` style offset that RFC 3339 rejects.
const ISO_WITH_OFFSET: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%:z"];

/// ISO-8601 layouts without an offset; UTC is assumed.
const ISO_NAIVE: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Normalizes a feed date string to a UTC instant.
///
/// RSS favors RFC-2822 (`Wed, 02 Oct 2024 10:00:00 GMT`) and Atom favors
/// ISO-8601 (`2024-10-02T10:00:00+00:00`), but feeds are not always
/// compliant with either, so RFC-2822 is tried first and ISO-8601 second.
/// Values without an offset are taken as UTC.
///
/// Returns `None` when no layout matches.
pub fn normalize_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    parse_rfc2822(raw).or_else(|| parse_iso8601(raw))
}

fn parse_rfc2822(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ZONELESS_RFC2822
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        .map(|naive| naive.and_utc())
}

fn parse_iso8601(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = ISO_WITH_OFFSET
        .iter()
        .find_map(|layout| DateTime::parse_from_str(raw, layout).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = ISO_NAIVE
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
