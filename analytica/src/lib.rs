//! # Analytica - Automatic Analysis of Tabular Uploads
//!
//! Analytica takes a rectangular dataset (CSV, TSV, Parquet or Excel) and
//! produces a structured summary without any user-written queries: per-column
//! metadata with a semantic type, missing-value counts, descriptive statistics,
//! a Pearson correlation matrix, ranked linear trends and a few plain-English
//! insights. Tables are held as Apache Arrow record batches.
//!
//! ## Quick Start
//!
//! ```rust
//! use analytica::prelude::*;
//!
//! # fn main() -> analytica::error::Result<()> {
//! let upload = b"sale_date,revenue\n\
//!     2024-01-01,100\n2024-01-02,110\n2024-01-03,120\n\
//!     2024-01-04,130\n2024-01-05,140\n2024-01-06,150\n";
//!
//! let table = load_table_from_upload("sales.csv", upload)?;
//! let result = analyze_table(&table, &AnalysisRequest::new("sales.csv"))?;
//!
//! assert_eq!(result.column("revenue").unwrap().inferred_semantic, Some(SemanticTag::CurrencyLike));
//! assert_eq!(result.trends[0].direction, TrendDirection::Up);
//! println!("{}", result.to_json_pretty()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Thresholds
//!
//! Every threshold lives in [`config::AnalysisConfig`] and is handed to the
//! analyzer when it is built:
//!
//! ```rust
//! use analytica::prelude::*;
//!
//! let config = AnalysisConfig::builder()
//!     .min_trend_r2(0.5)
//!     .max_trends(3)
//!     .build();
//! let analyzer = TableAnalyzer::builder()
//!     .config(config)
//!     .log_config(LogConfig::verbose())
//!     .build()
//!     .unwrap();
//! # let _ = analyzer;
//! ```
//!
//! ## Logging
//!
//! The analysis pass emits `tracing` events and spans. Binaries can install a
//! subscriber with [`logging::setup::init_logging`].

pub mod analysis;
pub mod analyzers;
pub mod config;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod sources;
pub mod table;

#[cfg(test)]
pub(crate) mod test_helpers;

use analysis::{AnalysisResult, TableAnalyzer};
use config::AnalysisRequest;
use error::Result;
use sources::TableLoader;
use table::Table;

/// Parses an uploaded file into a [`Table`], choosing the reader from the
/// file extension.
pub fn load_table_from_upload(filename: &str, bytes: &[u8]) -> Result<Table> {
    TableLoader::new().load_from_upload(filename, bytes)
}

/// Analyzes `table` with the default configuration.
pub fn analyze_table(table: &Table, request: &AnalysisRequest) -> Result<AnalysisResult> {
    TableAnalyzer::builder().build()?.analyze(table, request)
}
