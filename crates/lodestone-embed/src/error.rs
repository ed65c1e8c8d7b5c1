//! Error types for embedding operations

use thiserror::Error;

/// Embedding error type
#[derive(Error, Debug)]
pub enum EmbedError {
    /// Provider request failed
    #[error("Provider error: {0}")]
    Provider(String),

    /// HTTP transport error talking to the provider
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No persisted embedding store exists yet
    #[error("No embeddings found at {0}; run a rebuild first")]
    StoreMissing(String),

    /// Filesystem error while persisting or loading the store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted store could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for embedding operations
pub type EmbedResult<T> = Result<T, EmbedError>;
