//! Error types for the `jobsage-rag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval and query operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// The query string is empty or whitespace-only.
    ///
    /// Rejected before any encoder, index, or backend call is made.
    #[error("Invalid query: empty or whitespace-only")]
    InvalidQuery,

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A vector's dimension does not match the index's.
    ///
    /// Always a configuration fault: the same encoder configuration must be
    /// used for corpus build and query encoding.
    #[error("Dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensionality the index was built with.
        expected: usize,
        /// Dimensionality of the offending vector.
        actual: usize,
    },

    /// The assembled prompt exceeds the configured maximum size.
    ///
    /// Deterministic for a given query and document set; never retried and
    /// never silently truncated.
    #[error("Prompt too large: {size} chars exceeds limit of {limit}")]
    PromptTooLarge {
        /// Size of the assembled prompt in characters.
        size: usize,
        /// Configured maximum prompt size in characters.
        limit: usize,
    },

    /// The persisted index artifact could not be written or loaded intact.
    #[error("Index artifact error: {0}")]
    Artifact(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A failure from the generation backend.
    #[error(transparent)]
    Model(#[from] jobsage_model::ModelError),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
