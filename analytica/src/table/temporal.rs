//! Datetime recognition for text columns.
//!
//! Values are matched against a small set of layouts before being handed to
//! `chrono`, so that obviously non-temporal strings are rejected cheaply.

use arrow::array::{Array, StringArray, TimestampNanosecondArray};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Layout patterns recognised as datetimes.
struct DatetimePatterns {
    date_iso: Regex,
    date_ymd_slash: Regex,
    date_us: Regex,
    date_eu: Regex,
    datetime_naive: Regex,
    datetime_offset: Regex,
}

impl DatetimePatterns {
    fn new() -> Self {
        Self {
            date_iso: compile(r"^\d{4}-\d{1,2}-\d{1,2}$"),
            date_ymd_slash: compile(r"^\d{4}/\d{1,2}/\d{1,2}$"),
            date_us: compile(r"^\d{1,2}/\d{1,2}/\d{4}$"),
            date_eu: compile(r"^\d{1,2}\.\d{1,2}\.\d{4}$"),
            datetime_naive: compile(r"^\d{4}-\d{1,2}-\d{1,2}[T ]\d{1,2}:\d{2}(:\d{2}(\.\d+)?)?$"),
            datetime_offset: compile(
                r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})$",
            ),
        }
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("datetime layout patterns are valid regular expressions")
}

static PATTERNS: Lazy<DatetimePatterns> = Lazy::new(DatetimePatterns::new);

/// Parses a single text value into a naive (UTC) datetime.
///
/// Returns `None` for blank input and for anything outside the recognised
/// layouts.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let patterns = &*PATTERNS;

    let date = if patterns.date_iso.is_match(value) {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
    } else if patterns.date_ymd_slash.is_match(value) {
        NaiveDate::parse_from_str(value, "%Y/%m/%d").ok()
    } else if patterns.date_us.is_match(value) {
        NaiveDate::parse_from_str(value, "%m/%d/%Y").ok()
    } else if patterns.date_eu.is_match(value) {
        NaiveDate::parse_from_str(value, "%d.%m.%Y").ok()
    } else {
        None
    };
    if let Some(date) = date {
        return date.and_hms_opt(0, 0, 0);
    }

    if patterns.datetime_naive.is_match(value) {
        let normalized = value.replacen('T', " ", 1);
        return NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M"))
            .ok();
    }

    if patterns.datetime_offset.is_match(value) {
        let normalized = value.replacen(' ', "T", 1);
        return DateTime::parse_from_rfc3339(&normalized)
            .ok()
            .map(|dt| dt.naive_utc());
    }

    None
}

/// Outcome of converting a text column to nanosecond timestamps.
#[derive(Debug, Clone)]
pub struct DatetimeCoercion {
    /// Converted values; blanks and unparseable values are null
    pub array: TimestampNanosecondArray,
    /// Number of non-blank values that converted
    pub parsed: usize,
    /// Number of non-blank values that did not convert
    pub failed: usize,
}

impl DatetimeCoercion {
    /// True when every non-blank value converted.
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }

    /// True when the column held values but none of them converted.
    pub fn is_total_failure(&self) -> bool {
        self.parsed == 0 && self.failed > 0
    }
}

/// Converts text values to timestamps, nulling out anything unparseable.
pub fn coerce_strings(values: &StringArray) -> DatetimeCoercion {
    let mut parsed = 0;
    let mut failed = 0;

    let converted: Vec<Option<i64>> = values
        .iter()
        .map(|value| {
            let value = value?;
            if value.trim().is_empty() {
                return None;
            }
            match parse_datetime(value).and_then(|dt| dt.and_utc().timestamp_nanos_opt()) {
                Some(nanos) => {
                    parsed += 1;
                    Some(nanos)
                }
                None => {
                    failed += 1;
                    None
                }
            }
        })
        .collect();

    DatetimeCoercion {
        array: TimestampNanosecondArray::from(converted),
        parsed,
        failed,
    }
}
