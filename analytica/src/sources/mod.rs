//! Upload ingestion: turning the bytes of an uploaded file into a [`Table`].
//!
//! The analysis pass itself is format-agnostic. This module picks a reader
//! from the file extension and materializes the whole upload in memory.
//!
//! ## Supported Formats
//!
//! | extension | reader |
//! |---|---|
//! | `.csv` | [`CsvSource`] with `,` |
//! | `.tsv` | [`CsvSource`] with `\t` |
//! | `.parquet` | [`ParquetSource`] |
//! | `.xlsx`, `.xls` | `ExcelSource` (requires the `excel` feature) |
//!
//! # Example
//!
//! ```rust
//! use analytica::sources::TableLoader;
//!
//! let upload = b"city,visits\nOslo,3\nLima,5\n";
//! let table = TableLoader::new().load_from_upload("visits.csv", upload).unwrap();
//! assert_eq!(table.num_rows(), 2);
//! ```

mod csv;
#[cfg(feature = "excel")]
mod excel;
mod parquet;

pub use csv::{CsvOptions, CsvSource};
#[cfg(feature = "excel")]
pub use excel::{ExcelSource, WorkbookKind};
pub use parquet::ParquetSource;

use std::fmt::{self, Debug};
use std::path::Path;

use tracing::{info, instrument};

use crate::error::{AnalysisError, Result};
use crate::table::Table;

/// A reader that materializes an uploaded file as a table.
pub trait TableSource: Debug + Send + Sync {
    /// Parses the complete file contents.
    fn read(&self, bytes: &[u8]) -> Result<Table>;

    /// Short description for logs.
    fn description(&self) -> String;
}

/// Upload format, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Csv,
    Tsv,
    Parquet,
    Excel,
}

impl FileFormat {
    /// Picks the format from the (case-insensitive) extension of `filename`.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();

        match extension.as_str() {
            ".csv" => Ok(Self::Csv),
            ".tsv" => Ok(Self::Tsv),
            ".parquet" => Ok(Self::Parquet),
            ".xlsx" | ".xls" => Ok(Self::Excel),
            other => Err(AnalysisError::unsupported_input(format!(
                "Unsupported file extension: {other}"
            ))),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Parquet => "parquet",
            Self::Excel => "excel",
        };
        f.write_str(name)
    }
}

/// Loads uploads of any supported format.
#[derive(Debug, Clone, Default)]
pub struct TableLoader {
    csv_options: CsvOptions,
}

impl TableLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options applied to delimited uploads. The delimiter is always taken
    /// from the extension.
    pub fn with_csv_options(mut self, options: CsvOptions) -> Self {
        self.csv_options = options;
        self
    }

    /// Returns the reader for `filename`.
    pub fn source_for(&self, filename: &str) -> Result<Box<dyn TableSource>> {
        let source: Box<dyn TableSource> = match FileFormat::from_filename(filename)? {
            FileFormat::Csv => Box::new(CsvSource::with_options(CsvOptions {
                delimiter: b',',
                ..self.csv_options.clone()
            })),
            FileFormat::Tsv => Box::new(CsvSource::with_options(CsvOptions {
                delimiter: b'\t',
                ..self.csv_options.clone()
            })),
            FileFormat::Parquet => Box::new(ParquetSource::new()),
            FileFormat::Excel => excel_source(filename)?,
        };
        Ok(source)
    }

    /// Parses an uploaded file into a table.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub fn load_from_upload(&self, filename: &str, bytes: &[u8]) -> Result<Table> {
        let source = self.source_for(filename)?;
        let table = source.read(bytes)?;
        info!(
            source = %source.description(),
            rows = table.num_rows(),
            cols = table.num_columns(),
            "Upload loaded"
        );
        Ok(table)
    }
}

#[cfg(feature = "excel")]
fn excel_source(filename: &str) -> Result<Box<dyn TableSource>> {
    Ok(Box::new(ExcelSource::for_filename(filename)))
}

#[cfg(not(feature = "excel"))]
fn excel_source(filename: &str) -> Result<Box<dyn TableSource>> {
    Err(AnalysisError::unsupported_input(format!(
        "Excel support is not enabled, cannot read '{filename}'"
    )))
}
