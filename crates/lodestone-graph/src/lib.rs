//! Knowledge graph construction and queries
//!
//! Builds a typed link graph from parsed vault documents: one node per
//! document, untyped edges from inline wikilinks, typed edges from
//! frontmatter relationship declarations. The graph persists to JSON
//! and serves breadth-first traversal, shortest-path, orphan and hub
//! queries over an undirected adjacency view.

pub mod builder;
pub mod error;
pub mod model;
pub mod query;
pub mod store;

pub use builder::build;
pub use error::{GraphError, GraphResult};
pub use model::{Edge, GraphNode, GraphStats, KnowledgeGraph, TypedEdge};
pub use query::{HubEntry, NodeRef, PathResult, TraversalLayer, TraversalResult};
