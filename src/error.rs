//! Error types for the cleaning pipeline

use thiserror::Error;

/// Result type alias for cleaning operations
pub type Result<T> = std::result::Result<T, CleanError>;

/// Main error type for the cleaning pipeline
#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Type mismatch in column '{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },

    #[error("Malformed value in column '{column}' at row {row}: {reason}")]
    MalformedInput {
        column: String,
        row: usize,
        reason: String,
    },

    #[error("Unmapped category in column '{column}': {value:?}")]
    UnmappedCategory { column: String, value: String },

    #[error("Undecodable text in column '{column}' at row {row}")]
    DecodeError { column: String, row: usize },

    #[error("Row index is missing, call reset_index first")]
    IndexMissing,

    #[error("Row index is not contiguous: position {position} holds {found:?}")]
    IndexNotContiguous { position: usize, found: Option<i64> },

    #[error("Encoder not fitted")]
    EncoderNotFitted,
}

impl CleanError {
    pub(crate) fn type_mismatch(
        column: &str,
        expected: impl Into<String>,
        actual: &polars::prelude::DataType,
    ) -> Self {
        CleanError::TypeMismatch {
            column: column.to_string(),
            expected: expected.into(),
            actual: actual.to_string(),
        }
    }
}

impl From<polars::error::PolarsError> for CleanError {
    fn from(err: polars::error::PolarsError) -> Self {
        CleanError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for CleanError {
    fn from(err: serde_json::Error) -> Self {
        CleanError::SerializationError(err.to_string())
    }
}
