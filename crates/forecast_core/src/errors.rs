//! Error types for the forecast core library

use thiserror::Error;

use crate::serde_canon::CanonicalError;

/// Errors that can occur while transforming data, scoring or persisting models
#[derive(Error, Debug)]
pub enum ForecastError {
    /// A column referenced by a transform or the model is absent
    #[error("Column not found: {0}")]
    MissingColumn(String),

    /// A column exists but holds the wrong kind of data
    #[error("Column type mismatch for '{column}': expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    /// Columns of a frame disagree on their row count
    #[error("Row count mismatch for '{column}': expected {expected}, got {actual}")]
    RowCount {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Model validation failed
    #[error("Model validation failed: {0}")]
    ValidationFailed(String),

    /// Metric computation received unusable input
    #[error("Invalid metric input: {0}")]
    InvalidMetricInput(String),

    /// Artifact container is malformed or was tampered with
    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Canonical serialization error
    #[error("Canonical serialization error: {0}")]
    Canonical(#[from] CanonicalError),

    /// Zip container error
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Result type for forecast core operations
pub type Result<T> = std::result::Result<T, ForecastError>;
