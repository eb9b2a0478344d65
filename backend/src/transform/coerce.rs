//! Lenient type coercion for raw fields.
//!
//! Every function here maps unparsable input to `None`. Nothing in this
//! module returns an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Trimmed, non-empty text or `None`.
pub fn to_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Parse a finite number. `NaN`, infinities, blanks and garbage are missing.
pub fn to_number(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// Parse a calendar date from the common date and timestamp layouts.
///
/// A bare year (`"1999"`) or year-month (`"1999-07"`) resolves to the first
/// day of that period.
pub fn to_date(raw: Option<&str>) -> Option<NaiveDate> {
    let s = raw.map(str::trim).filter(|s| !s.is_empty())?;

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| partial_date(s))
}

fn partial_date(s: &str) -> Option<NaiveDate> {
    let mut parts = s.splitn(2, '-');
    let year = parts
        .next()
        .filter(|y| y.len() == 4 && all_digits(y))?
        .parse::<i32>()
        .ok()?;
    let month = match parts.next() {
        Some(m) if (1..=2).contains(&m.len()) && all_digits(m) => m.parse::<u32>().ok()?,
        Some(_) => return None,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}
