//! Error types for u-datalab.

use thiserror::Error;

/// All errors produced by u-datalab operations.
///
/// Every variant is recoverable at the stage boundary: a failing stage
/// returns one of these and leaves its input untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataLabError {
    /// The declared file extension is not one of `csv`, `xlsx`, `xls`, `json`.
    #[error("unsupported file format: '{extension}'")]
    UnsupportedFormat { extension: String },

    /// Text input could not be decoded with any of the configured encodings.
    #[error("could not decode input (tried {})", .attempted.join(", "))]
    DecodeFailure { attempted: Vec<String> },

    /// The missing-value policy does not apply to the column's kind.
    #[error("policy '{policy}' cannot be applied to {kind} column '{column}'")]
    InvalidPolicyForKind {
        column: String,
        policy: String,
        kind: String,
    },

    /// The aggregation value column is not numeric.
    #[error("cannot aggregate {kind} column '{column}'")]
    InvalidAggregationTarget { column: String, kind: String },

    /// A required column or parameter was not provided.
    #[error("no {what} selected")]
    EmptySelection { what: String },

    /// Column not found in DataFrame.
    #[error("column '{name}' not found")]
    ColumnNotFound { name: String },

    /// Column is not numeric where numeric data is required.
    #[error("column '{column}' is not numeric")]
    NonNumericColumn { column: String },

    /// Insufficient data for the requested operation.
    #[error("need at least {min_required} values, got {actual}")]
    InsufficientData { min_required: usize, actual: usize },

    /// A statistic overflowed or is undefined for the given values.
    #[error("{what} is not finite")]
    NonFiniteStatistic { what: String },

    /// A column with this name already exists.
    #[error("column '{name}' already exists")]
    DuplicateColumn { name: String },

    /// Dimension mismatch.
    #[error("expected {expected} elements, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// CSV parsing failed.
    #[error("CSV parse error at line {line}: {message}")]
    CsvParse { line: usize, message: String },

    /// JSON input was malformed or had an unsupported layout.
    #[error("JSON parse error: {0}")]
    Json(String),

    /// Spreadsheet workbook could not be read.
    #[error("workbook error: {0}")]
    Workbook(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DataLabError>;

impl From<serde_json::Error> for DataLabError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

impl From<calamine::Error> for DataLabError {
    fn from(e: calamine::Error) -> Self {
        Self::Workbook(e.to_string())
    }
}

impl DataLabError {
    pub(crate) fn column_not_found(name: &str) -> Self {
        Self::ColumnNotFound {
            name: name.to_string(),
        }
    }

    pub(crate) fn empty_selection(what: &str) -> Self {
        Self::EmptySelection {
            what: what.to_string(),
        }
    }
}
