//! # Error Types
//!
//! This module defines error types used throughout the tapelabel library.

use thiserror::Error;

/// Main error type for tapelabel operations
#[derive(Debug, Error)]
pub enum LabelError {
    /// Request rejected before any work started (empty widget list, no rows)
    #[error("{0}")]
    Validation(String),

    /// Label could not be rendered as a whole (e.g., nothing renderable)
    #[error("Render error: {0}")]
    Render(String),

    /// The print sink reported a failure
    #[error("Print failed: {0}")]
    Printer(String),

    /// No printer with the requested id is configured
    #[error("Printer not found: {0}")]
    PrinterNotFound(String),

    /// The printer is busy with another batch job
    #[error("{0}")]
    Conflict(String),

    /// A batch job ended with an error event
    #[error("Batch stopped: {message}")]
    Batch {
        index: Option<usize>,
        message: String,
    },

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for LabelError {
    fn from(e: image::ImageError) -> Self {
        LabelError::Image(e.to_string())
    }
}
