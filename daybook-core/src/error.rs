//! Error types for daybook.

use thiserror::Error;

/// Errors that can occur in daybook operations.
#[derive(Error, Debug)]
pub enum DaybookError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid date key '{0}'. Expected YYYY-MM-DD")]
    InvalidDateKey(String),

    #[error("Invalid date/time '{0}'. Expected YYYYMMDD or YYYYMMDDTHHMMSS")]
    InvalidDateTime(String),

    #[error("No entry '{id}' on {date_key}")]
    NotFound { date_key: String, id: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),
}

/// Result type alias for daybook operations.
pub type DaybookResult<T> = Result<T, DaybookError>;
