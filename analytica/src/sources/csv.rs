//! Delimited text uploads (CSV and TSV).

use std::io::Cursor;
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use tracing::debug;

use super::TableSource;
use crate::error::Result;
use crate::table::Table;

/// Options for configuring delimited text reading.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Whether the first line holds column names
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Maximum records to read for schema inference (default: 1000)
    pub schema_infer_max_records: usize,
    /// Rows per decoded batch
    pub batch_size: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
            schema_infer_max_records: 1000,
            batch_size: 8192,
        }
    }
}

/// Reads delimited text with Arrow's CSV reader and schema inference.
///
/// Empty fields are read as missing values.
#[derive(Debug, Clone, Default)]
pub struct CsvSource {
    options: CsvOptions,
}

impl CsvSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CsvOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CsvOptions {
        &self.options
    }
}

impl TableSource for CsvSource {
    fn read(&self, bytes: &[u8]) -> Result<Table> {
        let format = Format::default()
            .with_header(self.options.has_header)
            .with_delimiter(self.options.delimiter)
            .with_quote(self.options.quote);

        let (schema, records) = format.infer_schema(
            Cursor::new(bytes),
            Some(self.options.schema_infer_max_records),
        )?;
        debug!(records, fields = schema.fields().len(), "Inferred CSV schema");
        let schema = Arc::new(text_temporal_fields(&schema));

        let reader = ReaderBuilder::new(schema.clone())
            .with_format(format)
            .with_batch_size(self.options.batch_size)
            .build(Cursor::new(bytes))?;
        let batches = reader.collect::<std::result::Result<Vec<RecordBatch>, _>>()?;

        Table::try_new(concat_batches(&schema, &batches)?)
    }

    fn description(&self) -> String {
        format!("delimited text ({:?})", self.options.delimiter as char)
    }
}

/// Reads inferred date, time and timestamp fields back as text.
///
/// Datetime columns come only from name-driven preprocessing.
fn text_temporal_fields(schema: &Schema) -> Schema {
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|field| match field.data_type() {
            DataType::Date32
            | DataType::Date64
            | DataType::Time32(_)
            | DataType::Time64(_)
            | DataType::Timestamp(_, _) => {
                Field::new(field.name().clone(), DataType::Utf8, field.is_nullable())
            }
            _ => field.as_ref().clone(),
        })
        .collect();
    Schema::new(fields)
}
