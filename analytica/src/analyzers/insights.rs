//! Short natural-language insights about an analyzed table.
//!
//! Insights are derived from results the analysis pass has already
//! computed; nothing is recalculated here.

use indexmap::IndexMap;

use super::statistics::{strongest_correlation, CorrelationMatrix, NumericStatistics};
use super::trends::{TrendDirection, TrendResult};

/// Upstream results the insights are derived from.
#[derive(Debug, Clone, Copy)]
pub struct InsightInputs<'a> {
    pub rows: usize,
    pub cols: usize,
    pub numeric_stats: &'a IndexMap<String, NumericStatistics>,
    /// Ranked trends, strongest first
    pub trends: &'a [TrendResult],
    pub correlations: &'a CorrelationMatrix,
}

/// Produces the ordered insight sentences.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsightGenerator;

impl InsightGenerator {
    pub fn new() -> Self {
        Self
    }

    /// The size sentence always comes first; the variability, trend and
    /// correlation sentences follow when their inputs support them.
    pub fn generate(&self, inputs: &InsightInputs<'_>) -> Vec<String> {
        let mut insights = vec![format!(
            "Loaded {} rows × {} columns.",
            inputs.rows, inputs.cols
        )];

        insights.extend(variability_insight(inputs.numeric_stats));
        insights.extend(trend_insight(inputs.trends));
        insights.extend(correlation_insight(inputs.correlations));

        insights
    }
}

fn variability_insight(stats: &IndexMap<String, NumericStatistics>) -> Option<String> {
    let mut highest: Option<&str> = None;
    let mut highest_variance = 0.0;

    for (column, column_stats) in stats {
        if column_stats.count <= 1 {
            continue;
        }
        let variance = column_stats.variance().unwrap_or(0.0);
        if variance > highest_variance {
            highest_variance = variance;
            highest = Some(column);
        }
    }

    highest.map(|column| format!("High variability in '{column}'."))
}

fn trend_insight(trends: &[TrendResult]) -> Option<String> {
    let top = trends.first()?;
    let direction = match top.direction {
        TrendDirection::Up => "Increasing",
        TrendDirection::Down | TrendDirection::None => "Decreasing",
    };
    Some(format!(
        "{direction} trend in '{}' (R²={:.2}).",
        top.column, top.r2
    ))
}

fn correlation_insight(correlations: &CorrelationMatrix) -> Option<String> {
    let pair = strongest_correlation(correlations)?;
    Some(format!(
        "Strongest Pearson correlation: {} ↔ {} (ρ={:.2}).",
        pair.left, pair.right, pair.coefficient
    ))
}
