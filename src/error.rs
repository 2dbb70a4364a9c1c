//! Error types for the Todo Gate crate.

use thiserror::Error;

/// Main error type for crate-level operations (configuration, I/O, decoding).
///
/// Admission outcomes have their own type, see
/// [`AdmissionError`](crate::admission::AdmissionError).
#[derive(Error, Debug)]
pub enum GateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Todo Gate operations.
pub type Result<T> = std::result::Result<T, GateError>;
