//! Thresholds and per-call parameters for the analysis pass.
//!
//! Every tunable used by the analyzers lives in [`AnalysisConfig`], which is
//! handed to the [`TableAnalyzer`](crate::analysis::TableAnalyzer) when it is
//! built. Nothing is read from process-wide state.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Configuration for semantic inference, trend detection and insights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Name keywords that suggest datetime content (default: `date`, `time`)
    pub datetime_keywords: Vec<String>,
    /// Name keywords that mark numeric identifiers (default: `id`, `_id`)
    pub id_keywords: Vec<String>,
    /// Name keywords that mark currency-like numeric columns
    pub currency_keywords: Vec<String>,
    /// Fraction of the row count below which distinct text values are categorical (default: 0.05)
    pub categorical_threshold_ratio: f64,
    /// Lower bound of the categorical cutoff (default: 20)
    pub categorical_min_unique: usize,
    /// Minimum R² for a trend to be reported (default: 0.2)
    pub min_trend_r2: f64,
    /// Minimum number of valid points for a trend fit (default: 5)
    pub min_trend_observations: usize,
    /// Maximum number of trends returned (default: 5)
    pub max_trends: usize,
    /// Absolute slope a trend must exceed (default: 1e-12)
    pub min_trend_slope: f64,
    /// Column cap of the correlation matrix used for the correlation insight (default: 10)
    pub insight_correlation_columns: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            datetime_keywords: to_strings(&["date", "time"]),
            id_keywords: to_strings(&["id", "_id"]),
            currency_keywords: to_strings(&[
                "price", "amount", "revenue", "cost", "sales", "salary",
            ]),
            categorical_threshold_ratio: 0.05,
            categorical_min_unique: 20,
            min_trend_r2: 0.2,
            min_trend_observations: 5,
            max_trends: 5,
            min_trend_slope: 1e-12,
            insight_correlation_columns: 10,
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl AnalysisConfig {
    /// Creates a new builder starting from the default thresholds.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }

    /// Checks that every threshold is usable.
    pub fn validate(&self) -> Result<()> {
        if self.categorical_threshold_ratio.is_nan() || self.categorical_threshold_ratio < 0.0 {
            return Err(AnalysisError::configuration(format!(
                "categorical_threshold_ratio must be non-negative, got {}",
                self.categorical_threshold_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.min_trend_r2) {
            return Err(AnalysisError::configuration(format!(
                "min_trend_r2 must be within [0, 1], got {}",
                self.min_trend_r2
            )));
        }
        if self.min_trend_observations < 2 {
            return Err(AnalysisError::configuration(
                "min_trend_observations must be at least 2 to fit a line",
            ));
        }
        if self.min_trend_slope.is_nan() || self.min_trend_slope < 0.0 {
            return Err(AnalysisError::configuration(format!(
                "min_trend_slope must be non-negative, got {}",
                self.min_trend_slope
            )));
        }
        Ok(())
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug, Clone)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    /// Replace the datetime name keywords
    pub fn datetime_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.datetime_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the identifier name keywords
    pub fn id_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.id_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the currency name keywords
    pub fn currency_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.currency_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the categorical cutoff ratio
    pub fn categorical_threshold_ratio(mut self, ratio: f64) -> Self {
        self.config.categorical_threshold_ratio = ratio;
        self
    }

    /// Set the lower bound of the categorical cutoff
    pub fn categorical_min_unique(mut self, min_unique: usize) -> Self {
        self.config.categorical_min_unique = min_unique;
        self
    }

    /// Set the R² floor for reported trends
    pub fn min_trend_r2(mut self, r2: f64) -> Self {
        self.config.min_trend_r2 = r2;
        self
    }

    /// Set the minimum number of points for a trend fit
    pub fn min_trend_observations(mut self, observations: usize) -> Self {
        self.config.min_trend_observations = observations;
        self
    }

    /// Set the maximum number of trends returned
    pub fn max_trends(mut self, max_trends: usize) -> Self {
        self.config.max_trends = max_trends;
        self
    }

    /// Set the slope magnitude a trend must exceed
    pub fn min_trend_slope(mut self, slope: f64) -> Self {
        self.config.min_trend_slope = slope;
        self
    }

    /// Set the correlation column cap used by the insight step
    pub fn insight_correlation_columns(mut self, columns: usize) -> Self {
        self.config.insight_correlation_columns = columns;
        self
    }

    /// Build the configuration
    pub fn build(self) -> AnalysisConfig {
        self.config
    }
}

/// Per-call parameters of one analysis pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Display name of the analyzed upload (may be empty)
    pub filename: String,
    /// Number of leading rows included in the preview
    pub max_preview_rows: usize,
    /// Maximum number of columns in the correlation matrix
    pub max_corr_cols: usize,
}

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            filename: String::new(),
            max_preview_rows: 20,
            max_corr_cols: 20,
        }
    }
}

impl AnalysisRequest {
    /// Creates a request for the given file name with default limits.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Default::default()
        }
    }

    /// Sets the preview row limit.
    pub fn with_max_preview_rows(mut self, rows: usize) -> Self {
        self.max_preview_rows = rows;
        self
    }

    /// Sets the correlation column limit.
    pub fn with_max_corr_cols(mut self, cols: usize) -> Self {
        self.max_corr_cols = cols;
        self
    }
}
