//! Centralized error types for docflow.

use thiserror::Error;

/// Main error type for docflow transforms and configuration.
#[derive(Error, Debug)]
pub enum DocflowError {
    #[error("Row {row}: cannot combine creation date '{date}' and time '{time}' into a timestamp")]
    MalformedTimestamp {
        row: usize,
        date: String,
        time: String,
    },

    #[error("Event '{event_id}': timestamp '{value}' does not match YYYY-MM-DD HH:MM:SS")]
    MalformedEventTimestamp { event_id: String, value: String },

    #[error("Row {row}: required field {field} is missing")]
    MissingField { row: usize, field: &'static str },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for docflow operations.
pub type DocflowResult<T> = Result<T, DocflowError>;

impl DocflowError {
    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Source row index of a row-level error, if this error belongs to one row.
    pub fn row(&self) -> Option<usize> {
        match self {
            Self::MalformedTimestamp { row, .. } | Self::MissingField { row, .. } => Some(*row),
            _ => None,
        }
    }
}
