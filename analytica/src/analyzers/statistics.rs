//! Descriptive statistics and correlations over numeric columns.
//!
//! Only integer and floating-point columns take part; booleans do not. All
//! mappings are keyed by column name and keep the table's column order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::table::Table;

/// Column name → column name → Pearson coefficient.
pub type CorrelationMatrix = IndexMap<String, IndexMap<String, f64>>;

/// Descriptive statistics of one numeric column.
///
/// Every field except `count` is `None` when the column has no values. `std`
/// is the sample standard deviation and is `0.0` for a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStatistics {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub median: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

impl NumericStatistics {
    /// Computes the statistics of the given values. Missing values must
    /// already be removed.
    pub fn from_values(values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self {
                count,
                mean: None,
                std: None,
                min: None,
                p25: None,
                median: None,
                p75: None,
                max: None,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let std = sample_variance(values).map(f64::sqrt).unwrap_or(0.0);

        Self {
            count,
            mean: Some(mean(values)),
            std: Some(std),
            min: sorted.first().copied(),
            p25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            p75: quantile(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }

    /// Sample variance (`std²`), if defined.
    pub fn variance(&self) -> Option<f64> {
        self.std.map(|s| s * s)
    }
}

/// One off-diagonal entry of a [`CorrelationMatrix`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPair {
    pub left: String,
    pub right: String,
    pub coefficient: f64,
}

/// Computes missing counts, numeric statistics and correlations of a table.
#[derive(Debug, Clone, Copy)]
pub struct StatisticalAnalyzer<'a> {
    table: &'a Table,
}

impl<'a> StatisticalAnalyzer<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self { table }
    }

    /// Missing-value count of every column. Empty for a table without rows.
    pub fn missing_counts(&self) -> IndexMap<String, usize> {
        if self.table.num_rows() == 0 {
            return IndexMap::new();
        }
        self.table
            .columns()
            .map(|column| (column.name().to_string(), column.missing_count()))
            .collect()
    }

    /// Statistics of every numeric column. Empty when the table has no rows
    /// or no numeric columns.
    #[instrument(skip(self), fields(rows = self.table.num_rows()))]
    pub fn numeric_statistics(&self) -> Result<IndexMap<String, NumericStatistics>> {
        let mut stats = IndexMap::new();
        for (name, values) in self.numeric_columns()? {
            let present: Vec<f64> = values.into_iter().flatten().collect();
            stats.insert(name, NumericStatistics::from_values(&present));
        }
        Ok(stats)
    }

    /// Pearson correlations among the `max_cols` numeric columns with the
    /// highest sample variance.
    ///
    /// Ties keep column order and columns without a defined variance rank
    /// last. Coefficients use pairwise-complete observations; undefined ones
    /// (fewer than two pairs, zero variance) are reported as `0.0`.
    #[instrument(skip(self), fields(rows = self.table.num_rows()))]
    pub fn correlation_matrix(&self, max_cols: usize) -> Result<CorrelationMatrix> {
        let columns = self.numeric_columns()?;

        let mut ranked: Vec<(usize, Option<f64>)> = columns
            .iter()
            .enumerate()
            .map(|(index, (_, values))| {
                let present: Vec<f64> = values.iter().flatten().copied().collect();
                (index, sample_variance(&present))
            })
            .collect();
        // stable: equal variances keep column order
        ranked.sort_by(|a, b| match (a.1, b.1) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        ranked.truncate(max_cols);

        let selected: Vec<&(String, Vec<Option<f64>>)> =
            ranked.iter().map(|(index, _)| &columns[*index]).collect();

        let mut matrix = CorrelationMatrix::new();
        for (row_name, row_values) in &selected {
            let mut row = IndexMap::with_capacity(selected.len());
            for (col_name, col_values) in &selected {
                let coefficient = if row_name == col_name {
                    self_correlation(row_values)
                } else {
                    pearson(row_values, col_values)
                };
                row.insert(col_name.clone(), coefficient);
            }
            matrix.insert(row_name.clone(), row);
        }

        Ok(matrix)
    }

    fn numeric_columns(&self) -> Result<Vec<(String, Vec<Option<f64>>)>> {
        if self.table.num_rows() == 0 {
            return Ok(Vec::new());
        }
        self.table
            .columns()
            .filter(|column| column.kind().is_numeric())
            .map(|column| Ok((column.name().to_string(), column.numeric_values()?)))
            .collect()
    }
}

/// Finds the off-diagonal entry with the largest absolute coefficient.
///
/// The matrix is scanned row by row and only a strictly larger magnitude
/// replaces the current best, so the first pair encountered wins ties. An
/// entry of exactly `0.0` is never reported.
pub fn strongest_correlation(matrix: &CorrelationMatrix) -> Option<CorrelationPair> {
    let mut strongest = None;
    let mut best = 0.0;

    for (left, row) in matrix {
        for (right, &coefficient) in row {
            if left == right {
                continue;
            }
            if coefficient.abs() > best {
                best = coefficient.abs();
                strongest = Some(CorrelationPair {
                    left: left.clone(),
                    right: right.clone(),
                    coefficient,
                });
            }
        }
    }

    strongest
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n − 1 denominator); `None` below two values.
pub(crate) fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(sum_sq / (values.len() - 1) as f64)
}

/// Linear-interpolation quantile of ascending `sorted` values.
pub(crate) fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = p * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

fn self_correlation(values: &[Option<f64>]) -> f64 {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    match sample_variance(&present) {
        Some(variance) if variance > 0.0 => 1.0,
        _ => 0.0,
    }
}

/// Pearson coefficient over the rows where both values are present.
fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();

    if xs.len() < 2 {
        return 0.0;
    }

    let mean_x = mean(&xs);
    let mean_y = mean(&ys);
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(&ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denominator = (sxx * syy).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let r = sxy / denominator;
    if r.is_nan() {
        0.0
    } else {
        r.clamp(-1.0, 1.0)
    }
}
