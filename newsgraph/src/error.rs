//! Error types for the newsgraph library.

use thiserror::Error;

/// Result type for newsgraph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for newsgraph operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Core data-model error (configuration, malformed records, tagging).
    #[error(transparent)]
    Core(#[from] newsgraph_core::Error),

    /// CSV read/write error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upload retry policy was exhausted without a 2xx response.
    #[error("Upload failed after {attempts} attempts: {message}")]
    Upload {
        /// Attempts made before giving up.
        attempts: u32,
        /// Last observed failure.
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a tagging error (per-sentence NER failure).
    #[must_use]
    pub fn tagging(msg: impl Into<String>) -> Self {
        Self::Core(newsgraph_core::Error::tagging(msg))
    }

    /// Create a malformed-record error.
    #[must_use]
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Core(newsgraph_core::Error::malformed(msg))
    }
}
