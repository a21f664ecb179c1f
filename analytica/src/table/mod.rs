//! The in-memory table consumed by the analysis pass.
//!
//! A [`Table`] is an Arrow [`RecordBatch`] whose columns all carry one of the
//! primitive kinds in [`ColumnKind`]. Missing values are Arrow nulls; in
//! floating-point columns a `NaN` counts as missing as well.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Float64Array, StringArray};
//! use analytica::table::{ColumnKind, Table};
//!
//! let table = Table::from_columns(vec![
//!     ("city", Arc::new(StringArray::from(vec!["Oslo", "Lima"])) as ArrayRef),
//!     ("temp", Arc::new(Float64Array::from(vec![Some(3.5), None])) as ArrayRef),
//! ])
//! .unwrap();
//!
//! assert_eq!(table.num_rows(), 2);
//! assert_eq!(table.column(1).kind(), ColumnKind::Float);
//! assert_eq!(table.column(1).missing_count(), 1);
//! ```

pub mod temporal;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{
    DataType, Field, Float32Type, Float64Type, Int64Type, Schema, TimeUnit,
    TimestampMicrosecondType, UInt64Type,
};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AnalysisError, Result};

/// Declared primitive type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Signed or unsigned integers
    Integer,
    /// Floating-point and decimal numbers
    Float,
    /// Booleans
    Boolean,
    /// Free text, plain or dictionary-encoded (including columns with no values at all)
    Text,
    /// Dates and timestamps
    Datetime,
}

impl ColumnKind {
    /// Maps an Arrow type to its column kind, if the type is supported.
    pub fn from_data_type(data_type: &DataType) -> Option<Self> {
        match data_type {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => Some(Self::Integer),
            DataType::Float32
            | DataType::Float64
            | DataType::Decimal128(_, _)
            | DataType::Decimal256(_, _) => Some(Self::Float),
            DataType::Boolean => Some(Self::Boolean),
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View | DataType::Null => {
                Some(Self::Text)
            }
            DataType::Dictionary(_, values)
                if matches!(
                    values.as_ref(),
                    DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View
                ) =>
            {
                Some(Self::Text)
            }
            DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => Some(Self::Datetime),
            _ => None,
        }
    }

    /// Integer and floating-point columns are numeric; booleans are not.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    /// Get the kind name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Text => "text",
            Self::Datetime => "datetime",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An ordered set of equally long, named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    batch: RecordBatch,
}

impl Table {
    /// Wraps a record batch after checking that every column is supported.
    pub fn try_new(batch: RecordBatch) -> Result<Self> {
        if batch.num_columns() == 0 {
            return Err(AnalysisError::unsupported_input("table has no columns"));
        }

        let mut seen = HashSet::new();
        for field in batch.schema().fields() {
            if ColumnKind::from_data_type(field.data_type()).is_none() {
                return Err(AnalysisError::unsupported_input(format!(
                    "column '{}' has unsupported type {}",
                    field.name(),
                    field.data_type()
                )));
            }
            if !seen.insert(field.name().clone()) {
                return Err(AnalysisError::unsupported_input(format!(
                    "duplicate column name '{}'",
                    field.name()
                )));
            }
        }

        Ok(Self { batch })
    }

    /// Builds a table from named Arrow arrays.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ArrayRef)>,
        S: Into<String>,
    {
        let (fields, arrays): (Vec<Field>, Vec<ArrayRef>) = columns
            .into_iter()
            .map(|(name, array)| {
                let field = Field::new(name.into(), array.data_type().clone(), true);
                (field, array)
            })
            .unzip();

        if arrays.is_empty() {
            return Err(AnalysisError::unsupported_input("table has no columns"));
        }

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Self::try_new(batch)
    }

    /// Number of rows shared by every column.
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// Returns the column at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn column(&self, index: usize) -> Column<'_> {
        let field = self.batch.schema_ref().field(index);
        let array = self.batch.column(index);
        Column {
            name: field.name(),
            data_type: field.data_type(),
            // validated in `try_new`
            kind: ColumnKind::from_data_type(field.data_type()).unwrap_or(ColumnKind::Text),
            array,
        }
    }

    /// Looks a column up by name.
    pub fn column_by_name(&self, name: &str) -> Option<Column<'_>> {
        self.batch
            .schema_ref()
            .index_of(name)
            .ok()
            .map(|index| self.column(index))
    }

    /// Iterates over the columns in declared order.
    pub fn columns(&self) -> impl Iterator<Item = Column<'_>> + '_ {
        (0..self.num_columns()).map(move |index| self.column(index))
    }

    /// Column names in declared order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns().map(|c| c.name().to_string()).collect()
    }

    /// The underlying record batch.
    pub fn record_batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Consumes the table and returns the underlying record batch.
    pub fn into_record_batch(self) -> RecordBatch {
        self.batch
    }

    /// Returns a new table in which the column at `index` is replaced.
    ///
    /// The receiver is left untouched; unchanged columns are shared.
    pub fn with_column_replaced(&self, index: usize, array: ArrayRef) -> Result<Self> {
        let schema = self.batch.schema();
        let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
        let mut arrays: Vec<ArrayRef> = self.batch.columns().to_vec();

        let Some(field) = fields.get_mut(index) else {
            return Err(AnalysisError::unsupported_input(format!(
                "column index {index} out of bounds"
            )));
        };
        *field = Field::new(field.name().clone(), array.data_type().clone(), true);
        arrays[index] = array;

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?;
        Self::try_new(batch)
    }
}

impl TryFrom<RecordBatch> for Table {
    type Error = AnalysisError;

    fn try_from(batch: RecordBatch) -> Result<Self> {
        Self::try_new(batch)
    }
}

/// A borrowed view of one column of a [`Table`].
#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    name: &'a str,
    data_type: &'a DataType,
    kind: ColumnKind,
    array: &'a ArrayRef,
}

impl<'a> Column<'a> {
    /// Column name.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Declared primitive kind.
    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// Declared Arrow type.
    pub fn data_type(&self) -> &'a DataType {
        self.data_type
    }

    /// Declared type as a display label, e.g. `Int64` or `Utf8`.
    pub fn dtype_label(&self) -> String {
        self.data_type.to_string()
    }

    /// The underlying Arrow array.
    pub fn array(&self) -> &'a ArrayRef {
        self.array
    }

    /// Number of values, missing ones included.
    pub fn len(&self) -> usize {
        self.array.len()
    }

    /// True when the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    /// Number of missing values (nulls, plus `NaN` in floating-point columns).
    pub fn missing_count(&self) -> usize {
        let nulls = self.array.logical_null_count();
        let nans = match self.array.data_type() {
            DataType::Float32 => self
                .array
                .as_primitive::<Float32Type>()
                .iter()
                .flatten()
                .filter(|v| v.is_nan())
                .count(),
            DataType::Float64 => self
                .array
                .as_primitive::<Float64Type>()
                .iter()
                .flatten()
                .filter(|v| v.is_nan())
                .count(),
            _ => 0,
        };
        nulls + nans
    }

    /// Values of a numeric column as `f64`; missing values are `None`.
    pub fn numeric_values(&self) -> Result<Vec<Option<f64>>> {
        if !self.kind.is_numeric() {
            return Err(AnalysisError::unsupported_input(format!(
                "column '{}' is not numeric",
                self.name
            )));
        }
        let floats = cast(self.array.as_ref(), &DataType::Float64)?;
        Ok(floats
            .as_primitive::<Float64Type>()
            .iter()
            .map(|v| v.filter(|v| !v.is_nan()))
            .collect())
    }

    /// Values of a datetime column as seconds since the Unix epoch.
    pub fn epoch_seconds(&self) -> Result<Vec<Option<f64>>> {
        if self.kind != ColumnKind::Datetime {
            return Err(AnalysisError::unsupported_input(format!(
                "column '{}' is not a datetime column",
                self.name
            )));
        }
        let micros = cast(
            self.array.as_ref(),
            &DataType::Timestamp(TimeUnit::Microsecond, None),
        )?;
        Ok(micros
            .as_primitive::<TimestampMicrosecondType>()
            .iter()
            .map(|v| v.map(|us| us as f64 / 1_000_000.0))
            .collect())
    }

    /// Values rendered as text. Only meaningful for text columns.
    pub fn text_values(&self) -> Result<StringArray> {
        let strings = cast(self.array.as_ref(), &DataType::Utf8)?;
        Ok(strings.as_string::<i32>().clone())
    }

    /// Number of distinct non-missing values of a text column.
    pub fn distinct_count(&self) -> Result<usize> {
        let values = self.text_values()?;
        let distinct: HashSet<&str> = values.iter().flatten().collect();
        Ok(distinct.len())
    }

    /// The first `limit` values as JSON scalars; missing values become `null`.
    pub fn preview_values(&self, limit: usize) -> Result<Vec<Value>> {
        let head = self.array.slice(0, limit.min(self.array.len()));

        let values = match self.array.data_type() {
            DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
                let ints = cast(head.as_ref(), &DataType::UInt64)?;
                ints.as_primitive::<UInt64Type>()
                    .iter()
                    .map(|v| v.map(Value::from).unwrap_or(Value::Null))
                    .collect()
            }
            _ => match self.kind {
                ColumnKind::Integer => {
                    let ints = cast(head.as_ref(), &DataType::Int64)?;
                    ints.as_primitive::<Int64Type>()
                        .iter()
                        .map(|v| v.map(Value::from).unwrap_or(Value::Null))
                        .collect()
                }
                ColumnKind::Float => {
                    let floats = cast(head.as_ref(), &DataType::Float64)?;
                    floats
                        .as_primitive::<Float64Type>()
                        .iter()
                        .map(|v| {
                            v.and_then(serde_json::Number::from_f64)
                                .map(Value::Number)
                                .unwrap_or(Value::Null)
                        })
                        .collect()
                }
                ColumnKind::Boolean => head
                    .as_boolean()
                    .iter()
                    .map(|v| v.map(Value::Bool).unwrap_or(Value::Null))
                    .collect(),
                ColumnKind::Text => {
                    let strings = cast(head.as_ref(), &DataType::Utf8)?;
                    strings
                        .as_string::<i32>()
                        .iter()
                        .map(|v| v.map(|s| Value::String(s.to_string())).unwrap_or(Value::Null))
                        .collect()
                }
                ColumnKind::Datetime => {
                    let micros = cast(
                        head.as_ref(),
                        &DataType::Timestamp(TimeUnit::Microsecond, None),
                    )?;
                    let micros = micros.as_primitive::<TimestampMicrosecondType>();
                    (0..micros.len())
                        .map(|i| {
                            if micros.is_null(i) {
                                return Value::Null;
                            }
                            micros
                                .value_as_datetime(i)
                                .map(|dt| {
                                    Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
                                })
                                .unwrap_or(Value::Null)
                        })
                        .collect()
                }
            },
        };

        Ok(values)
    }
}
