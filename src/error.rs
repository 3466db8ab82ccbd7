use thiserror::Error;

use crate::models::Dataset;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] ::config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{dataset} input is missing required column '{column}'")]
    Schema { dataset: Dataset, column: String },

    #[error("{dataset} pipeline left no rows after stage '{stage}'")]
    EmptyResult { dataset: Dataset, stage: String },

    #[error("Run incomplete: {0} dataset(s) failed, see the run report")]
    IncompleteRun(usize),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ProcessingError {
    pub fn schema(dataset: Dataset, column: impl Into<String>) -> Self {
        ProcessingError::Schema {
            dataset,
            column: column.into(),
        }
    }

    pub fn empty_result(dataset: Dataset, stage: impl std::fmt::Display) -> Self {
        ProcessingError::EmptyResult {
            dataset,
            stage: stage.to_string(),
        }
    }
}
