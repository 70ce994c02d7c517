//! Reader error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Required column {0} not found")]
    MissingColumn(&'static str),

    #[error("JSON-OCEL error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML-OCEL error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("Unsupported log format: {0}")]
    UnsupportedFormat(String),
}

pub type SourceResult<T> = Result<T, SourceError>;
