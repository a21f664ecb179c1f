//! The analysis pass over one table.
//!
//! [`TableAnalyzer`] owns the configuration and runs, in order: datetime
//! preprocessing on a working copy, semantic inference, statistics, trend
//! detection and insight generation. The first error aborts the pass.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Int64Array, StringArray};
//! use analytica::analysis::TableAnalyzer;
//! use analytica::config::AnalysisRequest;
//! use analytica::table::Table;
//!
//! let table = Table::from_columns(vec![
//!     ("region", Arc::new(StringArray::from(vec!["n", "s", "n", "e", "w", "s"])) as ArrayRef),
//!     ("units", Arc::new(Int64Array::from(vec![3, 5, 7, 9, 11, 13])) as ArrayRef),
//! ])
//! .unwrap();
//!
//! let analyzer = TableAnalyzer::builder().build().unwrap();
//! let result = analyzer.analyze(&table, &AnalysisRequest::new("units.csv")).unwrap();
//!
//! assert_eq!(result.meta.rows, 6);
//! assert_eq!(result.trends[0].column, "units");
//! assert_eq!(result.insights[0], "Loaded 6 rows × 2 columns.");
//! ```

mod preprocess;
pub mod result;

pub use preprocess::coerce_datetime_columns;
pub use result::{AnalysisResult, ColumnInfo, PreviewRow, TableMeta};

use indexmap::IndexMap;
use tracing::{info, instrument};

use crate::analyzers::{
    InsightGenerator, InsightInputs, SemanticTypeInferencer, StatisticalAnalyzer, TrendAnalyzer,
};
use crate::config::{AnalysisConfig, AnalysisRequest};
use crate::error::Result;
use crate::logging::{truncate_field, LogConfig};
use crate::table::Table;

/// Runs the full analysis of a table.
///
/// The analyzer holds no per-table state, so one instance can serve any
/// number of calls, including concurrent ones.
#[derive(Debug, Clone)]
pub struct TableAnalyzer {
    config: AnalysisConfig,
    log_config: LogConfig,
}

impl TableAnalyzer {
    /// Creates an analyzer with the given configuration.
    pub fn with_config(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            log_config: LogConfig::default(),
        })
    }

    /// Creates a builder with the default configuration.
    pub fn builder() -> TableAnalyzerBuilder {
        TableAnalyzerBuilder::default()
    }

    /// The configuration in use.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyzes `table`. The table itself is never modified.
    #[instrument(skip(self, table, request), fields(
        filename = %truncate_field(&request.filename, self.log_config.max_field_length),
        rows = table.num_rows(),
        cols = table.num_columns(),
    ))]
    pub fn analyze(&self, table: &Table, request: &AnalysisRequest) -> Result<AnalysisResult> {
        info!("Starting table analysis");

        let working =
            coerce_datetime_columns(table, &self.config.datetime_keywords, &self.log_config)?;
        let rows = working.num_rows();

        let meta = TableMeta {
            filename: request.filename.clone(),
            rows,
            cols: working.num_columns(),
        };

        let inferencer = SemanticTypeInferencer::new(&self.config);
        let columns = working
            .columns()
            .map(|column| -> Result<ColumnInfo> {
                let tag = inferencer.infer(&column, rows)?;
                crate::log_column!(
                    self.log_config,
                    column = column.name(),
                    semantic = %tag,
                    "Inferred semantic tag"
                );
                Ok(ColumnInfo {
                    name: column.name().to_string(),
                    dtype: column.dtype_label(),
                    inferred_semantic: Some(tag),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let preview = preview_rows(&working, request.max_preview_rows)?;

        let statistics = StatisticalAnalyzer::new(&working);
        let missing = statistics.missing_counts();
        let numeric_stats = statistics.numeric_statistics()?;
        let correlations = statistics.correlation_matrix(request.max_corr_cols)?;

        let trends = TrendAnalyzer::new(&self.config)
            .with_log_config(self.log_config.clone())
            .analyze(&working)?;

        let insight_correlations =
            if request.max_corr_cols == self.config.insight_correlation_columns {
                correlations.clone()
            } else {
                statistics.correlation_matrix(self.config.insight_correlation_columns)?
            };
        let insights = InsightGenerator::new().generate(&InsightInputs {
            rows: meta.rows,
            cols: meta.cols,
            numeric_stats: &numeric_stats,
            trends: &trends,
            correlations: &insight_correlations,
        });

        info!(
            numeric_columns = numeric_stats.len(),
            trends = trends.len(),
            insights = insights.len(),
            "Table analysis completed"
        );

        Ok(AnalysisResult {
            meta,
            columns,
            preview,
            missing,
            numeric_stats,
            correlations,
            trends,
            insights,
        })
    }
}

/// Builder for [`TableAnalyzer`].
#[derive(Debug, Clone, Default)]
pub struct TableAnalyzerBuilder {
    config: AnalysisConfig,
    log_config: LogConfig,
}

impl TableAnalyzerBuilder {
    /// Replace the analysis configuration
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the logging configuration
    pub fn log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Validate the configuration and build the analyzer
    pub fn build(self) -> Result<TableAnalyzer> {
        self.config.validate()?;
        Ok(TableAnalyzer {
            config: self.config,
            log_config: self.log_config,
        })
    }
}

fn preview_rows(table: &Table, limit: usize) -> Result<Vec<PreviewRow>> {
    let row_count = limit.min(table.num_rows());
    let mut rows: Vec<PreviewRow> = (0..row_count)
        .map(|_| IndexMap::with_capacity(table.num_columns()))
        .collect();

    for column in table.columns() {
        let values = column.preview_values(row_count)?;
        for (row, value) in rows.iter_mut().zip(values) {
            row.insert(column.name().to_string(), value);
        }
    }

    Ok(rows)
}
