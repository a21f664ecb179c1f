//! Test helpers for building small in-memory tables.

use arrow::array::ArrayRef;

use crate::table::Table;

/// Builds a table from named arrays, panicking on invalid input.
pub fn table_of(columns: Vec<(&str, ArrayRef)>) -> Table {
    Table::from_columns(columns).expect("test table should be valid")
}
