//! Spreadsheet uploads (`.xlsx` and `.xls`).
//!
//! The first worksheet is read; its first row names the columns, with repeated
//! names suffixed `.1`, `.2` and so on. A column is typed from its non-empty
//! cells: all whole numbers give `Int64`, any other mix of numbers gives
//! `Float64`, all booleans give `Boolean`, all dates give a nanosecond
//! timestamp, and anything else is read as text.

use std::collections::HashMap;
use std::fmt::Display;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, TimestampNanosecondArray,
};
use calamine::{DataType, Range, Reader, Xls, Xlsx};

use super::TableSource;
use crate::error::{AnalysisError, Result};
use crate::table::Table;

/// Workbook container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookKind {
    /// Office Open XML (`.xlsx`)
    Xlsx,
    /// Legacy binary workbook (`.xls`)
    Xls,
}

/// Reads the first worksheet of a workbook.
#[derive(Debug, Clone)]
pub struct ExcelSource {
    kind: WorkbookKind,
}

impl ExcelSource {
    pub fn new(kind: WorkbookKind) -> Self {
        Self { kind }
    }

    /// `.xls` files use the legacy reader, everything else the xlsx reader.
    pub fn for_filename(filename: &str) -> Self {
        let is_xls = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xls"));
        Self::new(if is_xls {
            WorkbookKind::Xls
        } else {
            WorkbookKind::Xlsx
        })
    }
}

impl TableSource for ExcelSource {
    fn read(&self, bytes: &[u8]) -> Result<Table> {
        let cursor = Cursor::new(bytes.to_vec());
        let range = match self.kind {
            WorkbookKind::Xlsx => first_sheet(Xlsx::new(cursor).map_err(excel_error)?)?,
            WorkbookKind::Xls => first_sheet(Xls::new(cursor).map_err(excel_error)?)?,
        };
        range_to_table(&range)
    }

    fn description(&self) -> String {
        format!("{:?} workbook", self.kind).to_lowercase()
    }
}

fn excel_error(err: impl Display) -> AnalysisError {
    AnalysisError::excel(err.to_string())
}

fn first_sheet<R>(mut workbook: R) -> Result<Range<DataType>>
where
    R: Reader<Cursor<Vec<u8>>>,
    R::Error: Display,
{
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AnalysisError::unsupported_input("workbook has no worksheets"))?;
    workbook.worksheet_range(&sheet).map_err(excel_error)
}

fn range_to_table(range: &Range<DataType>) -> Result<Table> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| AnalysisError::unsupported_input("worksheet is empty"))?;
    let body: Vec<&[DataType]> = rows.collect();

    let names = header
        .iter()
        .enumerate()
        .map(|(index, cell)| match cell {
            DataType::Empty => format!("Unnamed: {index}"),
            other => other.to_string(),
        })
        .collect();

    let columns = dedupe_names(names).into_iter().enumerate().map(|(index, name)| {
        let cells: Vec<&DataType> = body.iter().map(|row| &row[index]).collect();
        (name, column_array(&cells))
    });

    Table::from_columns(columns)
}

/// Suffixes repeated header names with `.1`, `.2`, ... in order of appearance,
/// skipping suffixed names that are already taken.
fn dedupe_names(names: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    names
        .into_iter()
        .map(|mut name| {
            let mut count = counts.get(&name).copied().unwrap_or(0);
            while count > 0 {
                counts.insert(name.clone(), count + 1);
                name = format!("{name}.{count}");
                count = counts.get(&name).copied().unwrap_or(0);
            }
            counts.insert(name.clone(), count + 1);
            name
        })
        .collect()
}

fn column_array(cells: &[&DataType]) -> ArrayRef {
    let present: Vec<&DataType> = cells
        .iter()
        .copied()
        .filter(|c| !matches!(c, DataType::Empty))
        .collect();

    let all = |pred: fn(&DataType) -> bool| !present.is_empty() && present.iter().all(|c| pred(c));

    if all(|c| matches!(c, DataType::Int(_)) || matches!(c, DataType::Float(f) if f.fract() == 0.0))
    {
        return Arc::new(Int64Array::from_iter(cells.iter().map(|c| match c {
            DataType::Int(i) => Some(*i),
            DataType::Float(f) => Some(*f as i64),
            _ => None,
        })));
    }
    if all(|c| matches!(c, DataType::Int(_) | DataType::Float(_))) {
        return Arc::new(Float64Array::from_iter(cells.iter().map(|c| match c {
            DataType::Int(i) => Some(*i as f64),
            DataType::Float(f) => Some(*f),
            _ => None,
        })));
    }
    if all(|c| matches!(c, DataType::Bool(_))) {
        return Arc::new(BooleanArray::from_iter(cells.iter().map(|c| match c {
            DataType::Bool(b) => Some(*b),
            _ => None,
        })));
    }
    if all(|c| matches!(c, DataType::DateTime(_) | DataType::DateTimeIso(_))) {
        return Arc::new(TimestampNanosecondArray::from_iter(cells.iter().map(|c| {
            c.as_datetime()
                .and_then(|dt| dt.and_utc().timestamp_nanos_opt())
        })));
    }

    Arc::new(StringArray::from_iter(cells.iter().map(|c| match c {
        DataType::Empty => None,
        other => Some(other.to_string()),
    })))
}
