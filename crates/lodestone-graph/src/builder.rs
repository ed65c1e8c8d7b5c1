//! Graph construction from parsed documents
//!
//! Two-pass build: materialize every node and edge first, then compute
//! degrees once all edges are known. Wikilink targets are deduplicated
//! per document before edges exist, so repeated references to the same
//! note contribute a single edge.

use crate::model::{Edge, GraphNode, GraphStats, KnowledgeGraph, TypedEdge};
use lodestone_core::{wikilinks, Document, LinkResolver};
use std::collections::BTreeSet;
use tracing::debug;

/// Build the knowledge graph for a set of documents.
pub fn build(documents: &[Document]) -> KnowledgeGraph {
    let resolver = LinkResolver::new(documents);

    let mut graph = KnowledgeGraph::default();
    let mut edges = Vec::new();
    let mut typed_edges = Vec::new();

    for doc in documents {
        graph.nodes.insert(
            doc.path.clone(),
            GraphNode {
                title: doc.title.clone(),
                note_type: doc.note_type.clone(),
                classification: doc.classification,
                tags: doc.tags.clone(),
                in_degree: 0,
                out_degree: 0,
                degree: 0,
            },
        );

        // Inline references appear in the body and occasionally in
        // frontmatter values (e.g. `project: "[[Project - X]]"`).
        let mut targets: BTreeSet<String> = wikilinks::unique_targets(&doc.body);
        targets.extend(wikilinks::unique_targets(&doc.raw_frontmatter));

        for target in targets {
            if let Some(resolved) = resolver.resolve(&target) {
                if resolved != doc.path {
                    edges.push(Edge {
                        source: doc.path.clone(),
                        target: resolved.to_string(),
                    });
                }
            }
        }

        for relation in &doc.relationships {
            if let Some(resolved) = resolver.resolve(&relation.target) {
                if resolved != doc.path {
                    typed_edges.push(TypedEdge {
                        source: doc.path.clone(),
                        target: resolved.to_string(),
                        kind: relation.kind.clone(),
                    });
                }
            }
        }
    }

    graph.edges = edges;
    graph.typed_edges = typed_edges;
    compute_degrees(&mut graph);

    graph.built = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    graph.stats = stats(&graph);
    debug!(
        nodes = graph.stats.total_nodes,
        edges = graph.stats.total_edges,
        typed = graph.stats.total_typed_edges,
        "Graph built"
    );
    graph
}

/// Second pass: degrees over typed and untyped edges together.
fn compute_degrees(graph: &mut KnowledgeGraph) {
    for node in graph.nodes.values_mut() {
        node.in_degree = 0;
        node.out_degree = 0;
        node.degree = 0;
    }

    let endpoints: Vec<(String, String)> = graph
        .edges
        .iter()
        .map(|e| (e.source.clone(), e.target.clone()))
        .chain(
            graph
                .typed_edges
                .iter()
                .map(|e| (e.source.clone(), e.target.clone())),
        )
        .collect();

    for (source, target) in endpoints {
        if let Some(node) = graph.nodes.get_mut(&source) {
            node.out_degree += 1;
        }
        if let Some(node) = graph.nodes.get_mut(&target) {
            node.in_degree += 1;
        }
    }

    for node in graph.nodes.values_mut() {
        node.degree = node.in_degree + node.out_degree;
    }
}

fn stats(graph: &KnowledgeGraph) -> GraphStats {
    let total_degree: usize = graph.nodes.values().map(|n| n.degree).sum();
    GraphStats {
        total_nodes: graph.nodes.len(),
        total_edges: graph.edges.len(),
        total_typed_edges: graph.typed_edges.len(),
        avg_degree: total_degree as f64 / graph.nodes.len().max(1) as f64,
    }
}
