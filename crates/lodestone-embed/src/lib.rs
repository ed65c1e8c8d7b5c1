//! Vector index and embedding provider interface
//!
//! Maintains a persisted mapping from document path to a fixed-length
//! embedding vector computed by an external provider. Vectors are
//! recomputed only for changed documents; a change of embedding model
//! invalidates the whole store because vectors from different models
//! are not comparable. This tier is optional: when no provider is
//! reachable the lexical path stays fully functional.

pub mod error;
pub mod prepare;
pub mod provider;
pub mod similarity;
pub mod store;

pub use error::{EmbedError, EmbedResult};
pub use prepare::prepare_text;
pub use provider::{EmbeddingProvider, MockProvider, OllamaProvider};
pub use similarity::cosine_similarity;
pub use store::{EmbeddingEntry, EmbeddingStore, EmbedSummary, VectorHit};
