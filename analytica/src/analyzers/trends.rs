//! Linear trend detection for numeric columns.
//!
//! Each numeric column is fitted with a least-squares line against a shared
//! X axis: the first datetime column (in seconds since the Unix epoch) when
//! the table has one, otherwise the 0-based row index. A fit is reported only
//! when it passes the meaningfulness gate:
//!
//! - `|slope| > min_trend_slope`
//! - `R² ≥ min_trend_r2`
//! - the interquartile range of the fitted Y values is positive
//!
//! Reported trends are ranked by `|slope| × R²`, strongest first.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::statistics::{mean, quantile};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::logging::LogConfig;
use crate::table::{ColumnKind, Table};

/// Sign of a trend's slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    None,
}

impl TrendDirection {
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            Self::Up
        } else if slope < 0.0 {
            Self::Down
        } else {
            Self::None
        }
    }
}

/// A reported trend of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub column: String,
    pub slope: f64,
    pub r2: f64,
    pub direction: TrendDirection,
}

impl TrendResult {
    /// Ranking score, `|slope| × R²`.
    pub fn score(&self) -> f64 {
        self.slope.abs() * self.r2
    }
}

/// Degree-1 least-squares fit `y = slope·x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r2: f64,
}

impl LinearFit {
    /// Fits a line through the paired points.
    ///
    /// Returns `Ok(None)` when fewer than two points are given or all X values
    /// coincide. A non-finite slope or intercept is a computation failure.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Result<Option<Self>> {
        if xs.len() != ys.len() {
            return Err(AnalysisError::computation_failure(format!(
                "regression inputs differ in length ({} vs {})",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < 2 {
            return Ok(None);
        }

        let mean_x = mean(xs);
        let mean_y = mean(ys);
        let (mut sxx, mut sxy) = (0.0, 0.0);
        for (x, y) in xs.iter().zip(ys) {
            let dx = x - mean_x;
            sxx += dx * dx;
            sxy += dx * (y - mean_y);
        }
        if sxx == 0.0 {
            return Ok(None);
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        if !slope.is_finite() || !intercept.is_finite() {
            return Err(AnalysisError::computation_failure(format!(
                "least-squares fit produced a non-finite line (slope {slope}, intercept {intercept})"
            )));
        }

        let (mut ss_res, mut ss_tot) = (0.0, 0.0);
        for (x, y) in xs.iter().zip(ys) {
            let predicted = slope * x + intercept;
            ss_res += (y - predicted).powi(2);
            ss_tot += (y - mean_y).powi(2);
        }
        let r2 = if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot };

        Ok(Some(Self {
            slope,
            intercept,
            r2,
        }))
    }
}

/// Fits, filters and ranks trends of every numeric column.
#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    min_r2: f64,
    min_observations: usize,
    max_trends: usize,
    min_slope: f64,
    log_config: LogConfig,
}

impl TrendAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            min_r2: config.min_trend_r2,
            min_observations: config.min_trend_observations,
            max_trends: config.max_trends,
            min_slope: config.min_trend_slope,
            log_config: LogConfig::default(),
        }
    }

    /// Sets the logging configuration used for per-column decisions.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Returns the ranked trends of `table`, at most `max_trends` of them.
    #[instrument(skip(self, table), fields(rows = table.num_rows()))]
    pub fn analyze(&self, table: &Table) -> Result<Vec<TrendResult>> {
        let x_axis = x_axis(table)?;
        let finite_x = x_axis.iter().filter(|x| x.is_some()).count();
        if finite_x < self.min_observations {
            crate::log_debug!(
                self.log_config,
                finite_x,
                "Too few axis values for trend fitting"
            );
            return Ok(Vec::new());
        }

        let mut trends = Vec::new();
        for column in table.columns().filter(|c| c.kind().is_numeric()) {
            let ys = column.numeric_values()?;

            // same joint mask selects X and Y
            let (valid_x, valid_y): (Vec<f64>, Vec<f64>) = x_axis
                .iter()
                .zip(&ys)
                .filter_map(|(x, y)| Some(((*x)?, finite(*y)?)))
                .unzip();

            if valid_y.len() < self.min_observations {
                crate::log_column!(
                    self.log_config,
                    column = column.name(),
                    valid = valid_y.len(),
                    "Skipping trend fit, too few valid points"
                );
                continue;
            }

            let Some(fit) = LinearFit::fit(&valid_x, &valid_y)? else {
                continue;
            };

            if self.is_meaningful(&fit, &valid_y) {
                crate::log_column!(
                    self.log_config,
                    column = column.name(),
                    slope = fit.slope,
                    r2 = fit.r2,
                    "Trend accepted"
                );
                trends.push(TrendResult {
                    column: column.name().to_string(),
                    slope: fit.slope,
                    r2: fit.r2,
                    direction: TrendDirection::from_slope(fit.slope),
                });
            }
        }

        trends.sort_by(|a, b| b.score().total_cmp(&a.score()));
        trends.truncate(self.max_trends);
        Ok(trends)
    }

    fn is_meaningful(&self, fit: &LinearFit, ys: &[f64]) -> bool {
        let mut sorted = ys.to_vec();
        sorted.sort_by(f64::total_cmp);
        let iqr = match (quantile(&sorted, 0.75), quantile(&sorted, 0.25)) {
            (Some(p75), Some(p25)) => p75 - p25,
            _ => 0.0,
        };

        fit.slope.abs() > self.min_slope && fit.r2 >= self.min_r2 && iqr > 0.0
    }
}

/// The shared X axis; `None` marks rows excluded from every fit.
fn x_axis(table: &Table) -> Result<Vec<Option<f64>>> {
    match table.columns().find(|c| c.kind() == ColumnKind::Datetime) {
        Some(column) => Ok(column
            .epoch_seconds()?
            .into_iter()
            .map(finite)
            .collect()),
        None => Ok((0..table.num_rows()).map(|i| Some(i as f64)).collect()),
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::table_of;
    use arrow::array::{ArrayRef, Float64Array, Int64Array, TimestampSecondArray};
    use std::sync::Arc;

    fn analyzer() -> TrendAnalyzer {
        TrendAnalyzer::new(&AnalysisConfig::default())
    }

    fn floats(values: Vec<Option<f64>>) -> ArrayRef {
        Arc::new(Float64Array::from(values))
    }

    #[test]
    fn test_linear_fit_exact() {
        let fit = LinearFit::fit(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 5.0, 7.0])
            .unwrap()
            .unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.r2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_fit_degenerate() {
        assert_eq!(LinearFit::fit(&[1.0], &[1.0]).unwrap(), None);
        assert_eq!(LinearFit::fit(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).unwrap(), None);

        let flat = LinearFit::fit(&[0.0, 1.0, 2.0], &[4.0, 4.0, 4.0])
            .unwrap()
            .unwrap();
        assert_eq!(flat.slope, 0.0);
        assert_eq!(flat.r2, 0.0);

        assert!(matches!(
            LinearFit::fit(&[0.0, 1.0], &[1.0]),
            Err(AnalysisError::ComputationFailure(_))
        ));
    }

    #[test]
    fn test_linear_fit_overflow_is_failure() {
        let result = LinearFit::fit(&[0.0, 1.0], &[-f64::MAX, f64::MAX]);
        assert!(matches!(result, Err(AnalysisError::ComputationFailure(_))));
    }

    #[test]
    fn test_direction_from_slope() {
        assert_eq!(TrendDirection::from_slope(0.5), TrendDirection::Up);
        assert_eq!(TrendDirection::from_slope(-0.5), TrendDirection::Down);
        assert_eq!(TrendDirection::from_slope(0.0), TrendDirection::None);
        assert_eq!(
            serde_json::to_string(&TrendDirection::None).unwrap(),
            "\"none\""
        );
    }

    #[test]
    fn test_row_index_axis() {
        let table = table_of(vec![(
            "y",
            floats((0..10).map(|i| Some(3.0 * i as f64 + 1.0)).collect()),
        )]);
        let trends = analyzer().analyze(&table).unwrap();
        assert_eq!(trends.len(), 1);
        assert!((trends[0].slope - 3.0).abs() < 1e-9);
        assert_eq!(trends[0].direction, TrendDirection::Up);
    }

    #[test]
    fn test_constant_column_is_never_a_trend() {
        let table = table_of(vec![("x", floats(vec![Some(5.0); 10]))]);
        assert!(analyzer().analyze(&table).unwrap().is_empty());
    }

    #[test]
    fn test_too_few_points() {
        let table = table_of(vec![(
            "y",
            floats(vec![Some(1.0), Some(2.0), None, Some(4.0), Some(5.0), None]),
        )]);
        assert!(analyzer().analyze(&table).unwrap().is_empty());
    }

    #[test]
    fn test_too_few_axis_values() {
        let table = table_of(vec![
            (
                "when",
                Arc::new(TimestampSecondArray::from(vec![
                    Some(0),
                    None,
                    None,
                    Some(10),
                    None,
                    Some(20),
                ])) as ArrayRef,
            ),
            ("y", Arc::new(Int64Array::from(vec![1, 2, 3, 4, 5, 6])) as ArrayRef),
        ]);
        assert!(analyzer().analyze(&table).unwrap().is_empty());
    }

    #[test]
    fn test_ranking_and_cap() {
        let columns: Vec<(String, ArrayRef)> = (1..=7)
            .map(|k| {
                let values = (0..20).map(|i| Some((k * i) as f64)).collect();
                (format!("c{k}"), floats(values))
            })
            .collect();
        let table = table_of(
            columns
                .iter()
                .map(|(n, a)| (n.as_str(), a.clone()))
                .collect(),
        );

        let trends = analyzer().analyze(&table).unwrap();
        let names: Vec<&str> = trends.iter().map(|t| t.column.as_str()).collect();
        assert_eq!(names, vec!["c7", "c6", "c5", "c4", "c3"]);
    }

    #[test]
    fn test_r2_floor_rejects_noise() {
        let noisy = vec![5.0, -5.0, 4.0, -4.0, 6.0, -6.0, 5.0, -5.0, 4.5, -4.5];
        let table = table_of(vec![("noise", floats(noisy.into_iter().map(Some).collect()))]);
        assert!(analyzer().analyze(&table).unwrap().is_empty());

        let lenient = AnalysisConfig::builder().min_trend_r2(0.0).build();
        let table_trends = TrendAnalyzer::new(&lenient).analyze(&table).unwrap();
        assert_eq!(table_trends.len(), 1);
    }
}
