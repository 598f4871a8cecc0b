//! Error types for the `jobsage-model` crate.

use thiserror::Error;

/// Errors that can occur when calling a generation backend.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The backend could not be reached: connection failure or timeout.
    #[error("Generation backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend answered with a non-success status.
    ///
    /// The raw response body is preserved for operator diagnostics.
    #[error("Generation backend returned {status}: {body}")]
    BackendError {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Raw response body, unmodified.
        body: String,
    },

    /// The backend returned a 2xx response whose body could not be parsed,
    /// even after tolerant normalization.
    #[error("Malformed backend output: {raw}")]
    MalformedOutput {
        /// Raw response body, unmodified.
        raw: String,
    },

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for `ModelError`.
pub type Result<T> = std::result::Result<T, ModelError>;
