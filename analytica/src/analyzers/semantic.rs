//! Semantic type inference for table columns.
//!
//! The declared Arrow type says how a column is stored; the semantic tag says
//! what it most likely means. Tags come from a fixed, ordered list of rules
//! over the declared kind and the column name, so the same column always gets
//! the same tag.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Float64Array};
//! use analytica::analyzers::{SemanticTag, SemanticTypeInferencer};
//! use analytica::config::AnalysisConfig;
//! use analytica::table::Table;
//!
//! let table = Table::from_columns(vec![(
//!     "unit_price",
//!     Arc::new(Float64Array::from(vec![9.99, 4.5])) as ArrayRef,
//! )])
//! .unwrap();
//!
//! let inferencer = SemanticTypeInferencer::new(&AnalysisConfig::default());
//! let tag = inferencer.infer(&table.column(0), table.num_rows()).unwrap();
//! assert_eq!(tag, SemanticTag::CurrencyLike);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::table::temporal::parse_datetime;
use crate::table::{Column, ColumnKind};

/// Coarse human-meaning classification of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticTag {
    Datetime,
    Boolean,
    Identifier,
    CurrencyLike,
    Numeric,
    Categorical,
    Text,
}

impl SemanticTag {
    /// Wire name of the tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Datetime => "datetime",
            Self::Boolean => "boolean",
            Self::Identifier => "identifier",
            Self::CurrencyLike => "currency_like",
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for SemanticTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assigns a [`SemanticTag`] to each column.
#[derive(Debug, Clone)]
pub struct SemanticTypeInferencer {
    datetime_keywords: Vec<String>,
    id_keywords: Vec<String>,
    currency_keywords: Vec<String>,
    categorical_threshold_ratio: f64,
    categorical_min_unique: usize,
}

impl SemanticTypeInferencer {
    /// Creates an inferencer using the keywords and cutoffs of `config`.
    pub fn new(config: &AnalysisConfig) -> Self {
        let lower = |keywords: &[String]| -> Vec<String> {
            keywords.iter().map(|k| k.to_lowercase()).collect()
        };
        Self {
            datetime_keywords: lower(&config.datetime_keywords),
            id_keywords: lower(&config.id_keywords),
            currency_keywords: lower(&config.currency_keywords),
            categorical_threshold_ratio: config.categorical_threshold_ratio,
            categorical_min_unique: config.categorical_min_unique,
        }
    }

    /// Infers the tag of one column of a table with `row_count` rows.
    ///
    /// Rules are tried in order and the first match wins:
    ///
    /// 1. declared datetime
    /// 2. name contains a datetime keyword and every value converts to a datetime
    ///    (text that parses, or numbers read as epoch nanoseconds)
    /// 3. declared boolean
    /// 4. declared numeric: identifier keyword, then currency keyword, else numeric
    /// 5. categorical when the distinct count is below
    ///    `max(categorical_min_unique, row_count × categorical_threshold_ratio)`, else text
    pub fn infer(&self, column: &Column<'_>, row_count: usize) -> Result<SemanticTag> {
        let name = column.name().to_lowercase();

        if column.kind() == ColumnKind::Datetime {
            return Ok(SemanticTag::Datetime);
        }

        if contains_any(&name, &self.datetime_keywords) && self.converts_to_datetime(column)? {
            return Ok(SemanticTag::Datetime);
        }

        match column.kind() {
            ColumnKind::Boolean => Ok(SemanticTag::Boolean),
            ColumnKind::Integer | ColumnKind::Float => Ok(self.numeric_tag(&name)),
            ColumnKind::Text | ColumnKind::Datetime => self.categorical_or_text(column, row_count),
        }
    }

    fn numeric_tag(&self, name: &str) -> SemanticTag {
        if contains_any(name, &self.id_keywords) {
            SemanticTag::Identifier
        } else if contains_any(name, &self.currency_keywords) {
            SemanticTag::CurrencyLike
        } else {
            SemanticTag::Numeric
        }
    }

    /// Whether every value of the column reads as a datetime.
    ///
    /// Numbers read as nanoseconds since the Unix epoch, so integer columns
    /// always convert and float columns convert while their values fit the
    /// nanosecond range. Booleans never convert.
    fn converts_to_datetime(&self, column: &Column<'_>) -> Result<bool> {
        match column.kind() {
            ColumnKind::Datetime | ColumnKind::Integer => Ok(true),
            ColumnKind::Float => Ok(column
                .numeric_values()?
                .iter()
                .flatten()
                .all(|v| v.is_finite() && v.abs() < EPOCH_NANOS_LIMIT)),
            ColumnKind::Boolean => Ok(false),
            ColumnKind::Text => {
                let values = column.text_values()?;
                Ok(values
                    .iter()
                    .flatten()
                    .filter(|v| !v.trim().is_empty())
                    .all(|v| parse_datetime(v).is_some()))
            }
        }
    }

    fn categorical_or_text(&self, column: &Column<'_>, row_count: usize) -> Result<SemanticTag> {
        let distinct = column.distinct_count()?;
        let threshold =
            (self.categorical_min_unique as f64).max(row_count as f64 * self.categorical_threshold_ratio);

        if (distinct as f64) < threshold {
            Ok(SemanticTag::Categorical)
        } else {
            Ok(SemanticTag::Text)
        }
    }
}

/// Magnitude past which a float no longer fits an `i64` nanosecond timestamp.
const EPOCH_NANOS_LIMIT: f64 = 9.2e18;

fn contains_any(name: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| name.contains(k.as_str()))
}
