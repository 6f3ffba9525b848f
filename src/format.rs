//! Display formatting for date values

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Shown for missing dates
pub const EMPTY_DATE: &str = "—";
/// Shown for values that are not dates
pub const INVALID_DATE: &str = "Invalid Date";

const DISPLAY_FORMAT: &str = "%b %-d, %Y, %I:%M %p";

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Format a date string for display in the local timezone,
/// e.g. `Jan 5, 2024, 03:07 PM`
pub fn format_date(value: Option<&str>) -> String {
    format_date_in(value, &Local)
}

pub fn format_date_in<Tz>(value: Option<&str>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let value = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return EMPTY_DATE.to_string(),
    };

    match parse_date(value, tz) {
        Some(date) => date.format(DISPLAY_FORMAT).to_string(),
        None => INVALID_DATE.to_string(),
    }
}

fn parse_date<Tz: TimeZone>(value: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date.with_timezone(tz));
    }

    // Wall-clock times without an offset are taken as local to `tz`
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return tz.from_local_datetime(&naive).earliest();
        }
    }

    // Bare dates are midnight UTC
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight).with_timezone(tz))
}
