//! Error types for core operations

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Filesystem error while walking or reading the vault
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),

    /// A path could not be expressed relative to the vault root
    #[error("Path outside vault root: {0}")]
    OutsideVault(String),
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
