//! Column-level analyzers run by the analysis pass.
//!
//! ## Available Analyzers
//!
//! - **Semantic inference** (`semantic`): ordered keyword and type rules that tag
//!   each column as datetime, boolean, identifier, currency-like, numeric,
//!   categorical or text
//! - **Statistics** (`statistics`): missing counts, descriptive statistics and a
//!   variance-ranked Pearson correlation matrix
//! - **Trends** (`trends`): least-squares fits against a time or row axis,
//!   filtered by a meaningfulness gate and ranked by `|slope| × R²`
//! - **Insights** (`insights`): short sentences derived from the outputs above
//!
//! Every analyzer is a pure function of the table and the configuration it was
//! built with; none of them keeps state between calls.

pub mod insights;
pub mod semantic;
pub mod statistics;
pub mod trends;

pub use insights::{InsightGenerator, InsightInputs};
pub use semantic::{SemanticTag, SemanticTypeInferencer};
pub use statistics::{
    strongest_correlation, CorrelationMatrix, CorrelationPair, NumericStatistics,
    StatisticalAnalyzer,
};
pub use trends::{LinearFit, TrendAnalyzer, TrendDirection, TrendResult};
