//! Error types for the lexical index

use thiserror::Error;

/// Lexical index error type
#[derive(Error, Debug)]
pub enum IndexError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Schema/migration error
    #[error("Schema error: {0}")]
    Schema(String),

    /// No index database exists yet
    #[error("No search index found at {0}; run a rebuild first")]
    StoreMissing(String),

    /// Underlying rusqlite error
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;
