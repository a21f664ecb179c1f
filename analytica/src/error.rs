//! Error types for the Analytica analysis library.
//!
//! All failures surfaced by the crate are represented by [`AnalysisError`].
//! An analysis pass is atomic: the first error raised by any component aborts
//! the whole pass and no partial result is returned.

use thiserror::Error;

/// The main error type for the Analytica library.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The delivered table (or upload) cannot be interpreted.
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// A numeric routine failed on the data it was given.
    #[error("Computation failed: {0}")]
    ComputationFailure(String),

    /// The analysis configuration is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from the Parquet reader.
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Error while reading a spreadsheet upload.
    #[error("Excel error: {0}")]
    Excel(String),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A type alias for `Result<T, AnalysisError>`.
///
/// # Examples
///
/// ```rust
/// use analytica::error::Result;
///
/// fn summarize() -> Result<usize> {
///     Ok(0)
/// }
/// # summarize().unwrap();
/// ```
pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    /// Creates an unsupported input error with the given message.
    pub fn unsupported_input(msg: impl Into<String>) -> Self {
        Self::UnsupportedInput(msg.into())
    }

    /// Creates a computation failure with the given message.
    pub fn computation_failure(msg: impl Into<String>) -> Self {
        Self::ComputationFailure(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a spreadsheet reader error with the given message.
    pub fn excel(msg: impl Into<String>) -> Self {
        Self::Excel(msg.into())
    }

    /// Returns true when the caller handed in something the core rejects,
    /// as opposed to a failure while computing on acceptable input.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedInput(_) | Self::Configuration(_) | Self::Excel(_) | Self::Parquet(_)
        )
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
