//! FHIR date/dateTime display helpers

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

/// Placeholder shown for absent values
pub const NOT_AVAILABLE: &str = "N/A";

const DISPLAY_FORMAT: &str = "%b %-d, %Y";
const MONTH_FORMAT: &str = "%b %Y";

/// Parse the calendar date of a FHIR `date` or `dateTime` value.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 date-times and date-times without offset.
/// Offsets are not normalized: the date is the one written in the value.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

/// Render a FHIR date for display, e.g. `Mar 14, 1958`.
///
/// Partial dates keep their precision: `1958` and `Mar 1958`.
/// Absent or empty input yields `N/A`; anything unparsable is returned as-is.
pub fn format_date(value: Option<&str>) -> String {
    match value {
        None => NOT_AVAILABLE.to_string(),
        Some(v) if v.trim().is_empty() => NOT_AVAILABLE.to_string(),
        Some(v) => match parse_date(v) {
            Some(date) => date.format(DISPLAY_FORMAT).to_string(),
            None => format_partial(v.trim()).unwrap_or_else(|| v.to_string()),
        },
    }
}

/// `YYYY` or `YYYY-MM`
fn format_partial(value: &str) -> Option<String> {
    match value.len() {
        4 if value.bytes().all(|b| b.is_ascii_digit()) => Some(value.to_string()),
        7 => NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
            .ok()
            .map(|date| date.format(MONTH_FORMAT).to_string()),
        _ => None,
    }
}

/// Whole years between `birth_date` and `today`.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> Option<u32> {
    let mut years = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Today's date in `YYYY-MM-DD` form (UTC)
pub fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}
