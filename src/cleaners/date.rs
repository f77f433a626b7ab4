use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use crate::patterns::{MS_DATE_STRING, SEC_DATE_STRING};

#[allow(clippy::expect_used)]
static CLEAN_DATE_STRING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(published|updated|posted)(\s+on)?\s*:?\s*(.*)")
        .expect("CLEAN_DATE_STRING_RE regex")
});

/// Date-looking tokens: clock times, numeric dates, numbers and month names.
#[allow(clippy::expect_used)]
static SPLIT_DATE_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d{1,2}:\d{2}(\s?[ap]\.?m\.?)?)|(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})|(\d{1,4})|((jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)\S*)",
    )
    .expect("SPLIT_DATE_STRING regex")
});

#[allow(clippy::expect_used)]
static TIME_MERIDIAN_DOTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.m\.").expect("TIME_MERIDIAN_DOTS_RE regex"));

#[allow(clippy::expect_used)]
static ORDINAL_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d)(st|nd|rd|th)\b").expect("ORDINAL_SUFFIX_RE regex"));

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%b %d %Y %I:%M %p",
    "%b %d %Y %H:%M",
    "%d %b %Y %I:%M %p",
    "%d %b %Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
];

/// Parse a date in any of the accepted shapes, interpreting zone-less
/// values as UTC.
#[must_use]
pub fn parse_date(date_str: &str) -> Option<DateTime<Utc>> {
    let date_str = date_str.trim();
    if date_str.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(date_str) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, fmt) {
            return Some(dt.and_utc());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(date_str, fmt) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    None
}

/// Reduce free text around a date to its date tokens.
fn clean_date_string(date_str: &str) -> String {
    let without_label = CLEAN_DATE_STRING_RE.replace(date_str, "$3");
    let without_ordinals = ORDINAL_SUFFIX_RE.replace_all(&without_label, "$1");
    let tokens: Vec<&str> = SPLIT_DATE_STRING
        .find_iter(&without_ordinals)
        .map(|m| m.as_str())
        .collect();
    let joined = tokens.join(" ");
    TIME_MERIDIAN_DOTS_RE
        .replace_all(&joined, "m")
        .replace('.', "")
        .trim()
        .to_string()
}

fn to_iso(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Normalize a publication date to `YYYY-MM-DDTHH:MM:SS.sssZ`.
///
/// Epoch timestamps in milliseconds (13 digits) or seconds (10 digits) are
/// accepted, as are the common textual shapes. Labels such as
/// `Published:` and surrounding prose are ignored. Anything else yields
/// `None`.
#[must_use]
pub fn clean_date_published(date_str: &str) -> Option<String> {
    let date_str = date_str.trim();

    if MS_DATE_STRING.is_match(date_str) {
        let millis: i64 = date_str.parse().ok()?;
        return DateTime::from_timestamp_millis(millis).map(to_iso);
    }
    if SEC_DATE_STRING.is_match(date_str) {
        let secs: i64 = date_str.parse().ok()?;
        return DateTime::from_timestamp(secs, 0).map(to_iso);
    }

    if let Some(dt) = parse_date(date_str) {
        return Some(to_iso(dt));
    }

    let cleaned = clean_date_string(date_str);
    parse_date(&cleaned).map(to_iso)
}
