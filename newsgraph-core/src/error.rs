//! Error types for newsgraph-core.

use thiserror::Error;

/// Result type for newsgraph-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for newsgraph-core operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid pipeline configuration. Aborts the run before any work.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A source record is missing required fields or carries non-text content.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// The NER collaborator failed on a sentence.
    #[error("Tagging failed: {0}")]
    Tagging(String),

    /// A link references an entity id that is not in the entity table.
    #[error("Link references unknown entity: {0}")]
    UnknownEntity(uuid::Uuid),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a malformed record error.
    #[must_use]
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedRecord(msg.into())
    }

    /// Create a tagging error.
    #[must_use]
    pub fn tagging(msg: impl Into<String>) -> Self {
        Self::Tagging(msg.into())
    }
}
