//! Error types for hybrid search

use thiserror::Error;

/// Search error type
#[derive(Error, Debug)]
pub enum SearchError {
    /// Lexical index error, including a missing index database
    #[error(transparent)]
    Index(#[from] lodestone_index::IndexError),

    /// Embedding store or provider error
    #[error(transparent)]
    Embed(#[from] lodestone_embed::EmbedError),

    /// Knowledge graph error
    #[error(transparent)]
    Graph(#[from] lodestone_graph::GraphError),

    /// Neither index tier is available for this query
    #[error("No search stores found under {0}; run a rebuild first")]
    NothingToSearch(String),
}

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;
