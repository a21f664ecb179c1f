//! Shared table builders for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use analytica::table::Table;
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};

pub fn floats(values: &[Option<f64>]) -> ArrayRef {
    Arc::new(Float64Array::from(values.to_vec()))
}

pub fn ints(values: &[i64]) -> ArrayRef {
    Arc::new(Int64Array::from(values.to_vec()))
}

pub fn strings(values: &[&str]) -> ArrayRef {
    Arc::new(StringArray::from(values.to_vec()))
}

pub fn table(columns: Vec<(&str, ArrayRef)>) -> Table {
    Table::from_columns(columns).expect("valid test table")
}

/// ISO dates `2024-01-01` onwards, one per day.
pub fn daily_dates(days: usize) -> Vec<String> {
    (0..days)
        .map(|d| {
            let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                + chrono::Duration::days(d as i64);
            date.format("%Y-%m-%d").to_string()
        })
        .collect()
}
