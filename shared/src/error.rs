/*!
Common error types for the Neuromask decoding components.

Only conditions that make an input unusable are errors. Per-frame and
per-field anomalies are [`crate::Diagnostic`]s and never abort a batch.
*/

use thiserror::Error;

/// Common result type used throughout the shared library
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Error type for operations that abort processing of one input
#[derive(Error, Debug)]
pub enum DecodeError {
    /// I/O errors while reading the input stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Frame data that cannot be built or interpreted
    #[error("Invalid frame data: {0}")]
    InvalidFrame(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DecodeError {
    /// Create a new invalid frame error
    pub fn invalid_frame(msg: impl Into<String>) -> Self {
        Self::InvalidFrame(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
