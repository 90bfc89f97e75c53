use chrono::{NaiveDateTime, Timelike};

use crate::error::ApiError;

pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse `YYYY-MM-DD HH:MM:SS` and return it re-rendered in that format.
/// Seconds run 00..=59; chrono parses `:60` as a leap second, which is refused.
pub fn date_time(raw: &str) -> Result<String, ApiError> {
    NaiveDateTime::parse_from_str(raw.trim(), DATE_TIME_FORMAT)
        .ok()
        .filter(|dt| dt.nanosecond() < 1_000_000_000)
        .map(|dt| dt.format(DATE_TIME_FORMAT).to_string())
        .ok_or_else(|| {
            ApiError::MalformedInput(format!(
                "date_time must be formatted as YYYY-MM-DD HH:MM:SS, got '{}'",
                raw
            ))
        })
}

pub fn price(price: f64) -> Result<f64, ApiError> {
    if price.is_finite() && price >= 0.0 {
        Ok(price)
    } else {
        Err(ApiError::MalformedInput(
            "price must be a non-negative number".into(),
        ))
    }
}

/// Trimmed, non-empty.
pub fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::MalformedInput(format!("{} is required", field)));
    }
    Ok(value)
}
