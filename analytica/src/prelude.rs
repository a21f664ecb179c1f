//! Prelude for commonly used types and functions in analytica.

pub use crate::analysis::{AnalysisResult, ColumnInfo, TableAnalyzer, TableMeta};
pub use crate::analyzers::{
    CorrelationMatrix, NumericStatistics, SemanticTag, TrendDirection, TrendResult,
};
pub use crate::config::{AnalysisConfig, AnalysisRequest};
pub use crate::error::{AnalysisError, Result};
pub use crate::logging::LogConfig;
pub use crate::sources::{FileFormat, TableLoader};
pub use crate::table::{ColumnKind, Table};
pub use crate::{analyze_table, load_table_from_upload};
