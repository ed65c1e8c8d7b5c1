//! Graph node/edge model and persisted shape

use lodestone_core::{Classification, RelationKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One node per indexable document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub title: String,
    #[serde(rename = "type")]
    pub note_type: Option<String>,
    pub classification: Classification,
    pub tags: Vec<String>,
    pub in_degree: usize,
    pub out_degree: usize,
    /// Always `in_degree + out_degree`; recomputed whenever edges
    /// change, never updated independently.
    pub degree: usize,
}

/// Untyped edge from an inline wikilink. Directed for storage;
/// traversal treats edges as undirected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

/// Typed edge from a frontmatter relationship declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: RelationKind,
}

/// Summary statistics persisted alongside the graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub total_typed_edges: usize,
    pub avg_degree: f64,
}

/// The persisted knowledge graph.
///
/// Nodes are keyed by document path in a sorted map so rebuilds over
/// an unchanged vault serialize byte-identically (modulo the build
/// timestamp) and tie-breaks stay stable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub nodes: BTreeMap<String, GraphNode>,
    pub edges: Vec<Edge>,
    pub typed_edges: Vec<TypedEdge>,
    pub built: String,
    pub stats: GraphStats,
}

impl KnowledgeGraph {
    pub fn contains(&self, path: &str) -> bool {
        self.nodes.contains_key(path)
    }

    /// Edge count over both untyped and typed edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len() + self.typed_edges.len()
    }

    /// Maximum node degree, at least 1 so normalization never divides
    /// by zero.
    pub fn max_degree(&self) -> usize {
        self.nodes.values().map(|n| n.degree).max().unwrap_or(0).max(1)
    }

    /// Node degree normalized into [0, 1] by the maximum degree, used
    /// as the centrality signal in rank fusion.
    pub fn centrality(&self) -> BTreeMap<String, f64> {
        let max = self.max_degree() as f64;
        self.nodes
            .iter()
            .map(|(path, node)| (path.clone(), node.degree as f64 / max))
            .collect()
    }
}
