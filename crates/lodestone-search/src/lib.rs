//! Hybrid search
//!
//! Three retrieval tiers feed one ranked list: BM25 over the lexical
//! index, cosine similarity over the embedding store, and an optional
//! centrality boost from the knowledge graph. The tiers degrade
//! independently: with no embeddings the lexical path stands alone,
//! and an unreachable provider never fails a query that the lexical
//! index can answer.

pub mod error;
pub mod fusion;
pub mod hybrid;

pub use error::{SearchError, SearchResult};
pub use fusion::{fuse, SearchHit, SearchSource};
pub use hybrid::{HybridSearcher, SearchMode, SearchRequest};
