//! Name-driven datetime coercion applied before any analyzer runs.

use std::sync::Arc;

use arrow::array::ArrayRef;

use crate::error::Result;
use crate::logging::LogConfig;
use crate::table::temporal::coerce_strings;
use crate::table::{ColumnKind, Table};

/// Converts text columns whose lowercased name ends with one of `keywords`
/// into nanosecond timestamps.
///
/// Values that do not parse become missing. A column in which nothing parses
/// is left as it was. Non-text columns are never touched. The input table is
/// not modified; a new table is returned.
pub fn coerce_datetime_columns(
    table: &Table,
    keywords: &[String],
    log_config: &LogConfig,
) -> Result<Table> {
    let keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    let mut working = table.clone();

    for index in 0..table.num_columns() {
        let column = table.column(index);
        let name = column.name().to_lowercase();
        if !keywords.iter().any(|k| name.ends_with(k.as_str())) {
            continue;
        }
        if column.kind() != ColumnKind::Text {
            continue;
        }

        let coercion = coerce_strings(&column.text_values()?);
        if coercion.is_total_failure() {
            crate::log_column!(
                log_config,
                column = column.name(),
                failed = coercion.failed,
                "Datetime coercion failed, keeping column as text"
            );
            continue;
        }

        crate::log_debug!(
            log_config,
            column = column.name(),
            parsed = coercion.parsed,
            failed = coercion.failed,
            "Coerced column to datetime"
        );
        working = working.with_column_replaced(index, Arc::new(coercion.array) as ArrayRef)?;
    }

    Ok(working)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::table_of;
    use arrow::array::{Array, Int64Array, StringArray};

    fn keywords() -> Vec<String> {
        vec!["date".to_string(), "time".to_string()]
    }

    #[test]
    fn test_coerces_suffix_matched_text_columns() {
        let table = table_of(vec![
            (
                "Order_DATE",
                Arc::new(StringArray::from(vec!["2024-01-01", "garbage", ""])) as ArrayRef,
            ),
            (
                "label",
                Arc::new(StringArray::from(vec!["2024-01-01", "b", "c"])) as ArrayRef,
            ),
        ]);

        let working = coerce_datetime_columns(&table, &keywords(), &LogConfig::default()).unwrap();
        let column = working.column(0);
        assert_eq!(column.kind(), ColumnKind::Datetime);
        assert_eq!(column.array().null_count(), 2);
        assert_eq!(working.column(1).kind(), ColumnKind::Text);

        // caller's table is unchanged
        assert_eq!(table.column(0).kind(), ColumnKind::Text);
    }

    #[test]
    fn test_only_suffix_matches() {
        let table = table_of(vec![(
            "date_of_birth",
            Arc::new(StringArray::from(vec!["2024-01-01"])) as ArrayRef,
        )]);
        let working = coerce_datetime_columns(&table, &keywords(), &LogConfig::default()).unwrap();
        assert_eq!(working.column(0).kind(), ColumnKind::Text);
    }

    #[test]
    fn test_total_failure_leaves_column() {
        let table = table_of(vec![(
            "start_time",
            Arc::new(StringArray::from(vec!["soon", "later"])) as ArrayRef,
        )]);
        let working = coerce_datetime_columns(&table, &keywords(), &LogConfig::verbose()).unwrap();
        assert_eq!(working, table);
    }

    #[test]
    fn test_numeric_columns_untouched() {
        let table = table_of(vec![(
            "runtime",
            Arc::new(Int64Array::from(vec![1, 2, 3])) as ArrayRef,
        )]);
        let working = coerce_datetime_columns(&table, &keywords(), &LogConfig::default()).unwrap();
        assert_eq!(working.column(0).kind(), ColumnKind::Integer);
    }
}
