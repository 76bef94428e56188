use eshop_forecast_core::ForecastError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the training CSV.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("unexpected header: expected [{expected}], found [{found}]")]
    Header { expected: String, found: String },

    #[error("line {line}: {message}")]
    Row { line: u64, message: String },

    #[error("dataset {} has no data rows", .0.display())]
    Empty(PathBuf),
}

/// Errors returned by the trainer.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("training error: {0}")]
    Training(String),

    #[error(transparent)]
    Core(#[from] ForecastError),
}
