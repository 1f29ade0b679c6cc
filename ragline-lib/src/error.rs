//! Error types for ragline

use thiserror::Error;

/// Result type alias for ragline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ragline operations
#[derive(Error, Debug)]
pub enum Error {
    /// The embedding model is unavailable or rejected the input
    #[error("embedding error: {0}")]
    Embedding(String),

    /// A vector does not have the dimension the store was built for
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Failed to read from or write to the vector store
    #[error("persistence error: {0}")]
    Persistence(String),

    /// The backing store lacks a capability required at initialization
    #[error("schema error: {0}")]
    Schema(String),

    /// The language model call failed
    #[error("generation error: {0}")]
    Generation(String),

    /// Invalid input provided
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Missing or malformed configuration
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Persistence(e.to_string())
    }
}
