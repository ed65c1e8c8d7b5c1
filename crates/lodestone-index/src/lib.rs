//! Lexical full-text index backed by SQLite FTS5
//!
//! One row per non-secret document with denormalized searchable fields
//! (title, type, tags, body) and an mtime freshness token used to skip
//! unchanged documents on rebuild. Ranking is FTS5's built-in BM25;
//! this crate is responsible for sanitization, incremental freshness
//! tracking and classification exclusion, not for the ranking math.

pub mod connection;
pub mod error;
pub mod indexer;
pub mod schema;
pub mod search;

pub use connection::IndexPool;
pub use error::{IndexError, IndexResult};
pub use indexer::{IndexStats, IndexSummary, LexicalIndex};
pub use search::{LexicalHit, SearchFilters};
