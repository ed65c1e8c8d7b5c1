//! Error types for graph operations

use thiserror::Error;

/// Graph error type
#[derive(Error, Debug)]
pub enum GraphError {
    /// A requested node is not present in the graph. Reported to the
    /// caller as a structured result, never a process abort.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// No persisted graph exists yet
    #[error("No graph found at {0}; run a rebuild first")]
    StoreMissing(String),

    /// Filesystem error while persisting or loading the graph
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted graph could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;
