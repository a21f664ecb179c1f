//! Parquet uploads.

use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::debug;

use super::TableSource;
use crate::error::Result;
use crate::table::Table;

/// Reads a Parquet file held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct ParquetSource {
    batch_size: Option<usize>,
}

impl ParquetSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the number of rows decoded per batch.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }
}

impl TableSource for ParquetSource {
    fn read(&self, bytes: &[u8]) -> Result<Table> {
        let mut builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(bytes))?;
        if let Some(batch_size) = self.batch_size {
            builder = builder.with_batch_size(batch_size);
        }
        let schema = builder.schema().clone();
        debug!(
            row_groups = builder.metadata().num_row_groups(),
            fields = schema.fields().len(),
            "Opened Parquet upload"
        );

        let batches = builder
            .build()?
            .collect::<std::result::Result<Vec<RecordBatch>, _>>()?;

        Table::try_new(concat_batches(&schema, &batches)?)
    }

    fn description(&self) -> String {
        "parquet".to_string()
    }
}
