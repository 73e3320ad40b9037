//! Error types for the EDW reasoning assistant

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

#[derive(Error, Debug)]
pub enum AssistantError {

    // =============================
    // Pipeline Errors
    // =============================

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Warehouse error ({status}): {message}")]
    WarehouseError { status: u16, message: String },

    #[error("Statement timed out after {0}s")]
    StatementTimeout(u64),

    #[error("Unexpected warehouse response: {0}")]
    ResponseFormatError(String),

    #[error("Completion error: {0}")]
    CompletionError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
