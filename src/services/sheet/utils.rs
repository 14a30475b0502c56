use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

static DECIMAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("decimal pattern is valid")
});

static ISO_DATE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("date pattern is valid"));

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a plain decimal literal (no thousands separators, no hex, no inf/NaN).
pub fn parse_decimal(s: &str) -> Option<f64> {
    if !DECIMAL.is_match(s) {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn has_iso_date_prefix(s: &str) -> bool {
    ISO_DATE_PREFIX.is_match(s)
}

/// Parses strings starting with `YYYY-MM-DD` into a valid calendar date-time.
/// Offsets are converted to UTC.
pub fn parse_iso_date(s: &str) -> Option<NaiveDateTime> {
    if !has_iso_date_prefix(s) {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    for format in DATE_TIME_FORMATS.iter() {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(s, format) {
            return Some(parsed);
        }
    }

    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_utc())
}
