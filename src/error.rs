//! Error types for calc-insight

use thiserror::Error;

/// Errors that can occur while ingesting, analysing or persisting a session
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("Failed to parse session payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid session payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid domain configuration: {0}")]
    ConfigError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
