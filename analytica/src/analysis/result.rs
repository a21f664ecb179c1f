//! The aggregate produced by one analysis pass.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analyzers::{CorrelationMatrix, NumericStatistics, SemanticTag, TrendResult};
use crate::error::Result;

/// Basic facts about the analyzed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    pub filename: String,
    pub rows: usize,
    pub cols: usize,
}

/// Declared and inferred type of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared Arrow type after preprocessing, e.g. `Int64`
    pub dtype: String,
    pub inferred_semantic: Option<SemanticTag>,
}

/// One preview row: column name → JSON scalar.
pub type PreviewRow = IndexMap<String, Value>;

/// Everything computed for one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub meta: TableMeta,
    pub columns: Vec<ColumnInfo>,
    pub preview: Vec<PreviewRow>,
    pub missing: IndexMap<String, usize>,
    pub numeric_stats: IndexMap<String, NumericStatistics>,
    pub correlations: CorrelationMatrix,
    pub trends: Vec<TrendResult>,
    pub insights: Vec<String>,
}

impl AnalysisResult {
    /// Renders the result as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Looks up the column info of `name`.
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }
}
