//! Read-only graph queries: traversal, shortest path, orphans, hubs

use crate::error::{GraphError, GraphResult};
use crate::model::KnowledgeGraph;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// Lightweight node reference returned by queries.
#[derive(Debug, Clone, Serialize)]
pub struct NodeRef {
    pub path: String,
    pub title: String,
    #[serde(rename = "type")]
    pub note_type: Option<String>,
}

/// Nodes at one hop distance from the traversal start.
#[derive(Debug, Clone, Serialize)]
pub struct TraversalLayer {
    pub depth: usize,
    pub nodes: Vec<NodeRef>,
}

/// Result of a breadth-first traversal.
#[derive(Debug, Clone, Serialize)]
pub struct TraversalResult {
    pub start: String,
    pub depth: usize,
    pub layers: Vec<TraversalLayer>,
    /// Reachable nodes within the depth bound, excluding the start
    pub total_reachable: usize,
}

/// A shortest path between two nodes.
#[derive(Debug, Clone, Serialize)]
pub struct PathResult {
    pub length: usize,
    pub nodes: Vec<NodeRef>,
}

/// One entry in the hubs listing.
#[derive(Debug, Clone, Serialize)]
pub struct HubEntry {
    pub path: String,
    pub title: String,
    #[serde(rename = "type")]
    pub note_type: Option<String>,
    pub degree: usize,
    pub in_degree: usize,
    pub out_degree: usize,
}

fn node_ref(graph: &KnowledgeGraph, path: &str) -> NodeRef {
    let node = &graph.nodes[path];
    NodeRef {
        path: path.to_string(),
        title: node.title.clone(),
        note_type: node.note_type.clone(),
    }
}

/// Undirected adjacency over both untyped and typed edges. Sets keep
/// neighbour order deterministic.
fn adjacency(graph: &KnowledgeGraph) -> BTreeMap<&str, BTreeSet<&str>> {
    let mut adj: BTreeMap<&str, BTreeSet<&str>> = graph
        .nodes
        .keys()
        .map(|path| (path.as_str(), BTreeSet::new()))
        .collect();

    let endpoints = graph
        .edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .chain(
            graph
                .typed_edges
                .iter()
                .map(|e| (e.source.as_str(), e.target.as_str())),
        );

    for (source, target) in endpoints {
        if graph.contains(source) && graph.contains(target) {
            if let Some(set) = adj.get_mut(source) {
                set.insert(target);
            }
            if let Some(set) = adj.get_mut(target) {
                set.insert(source);
            }
        }
    }

    adj
}

/// Breadth-first traversal up to `depth` hops, nodes grouped by hop
/// distance. The start node is layer 0.
pub fn traverse(graph: &KnowledgeGraph, start: &str, depth: usize) -> GraphResult<TraversalResult> {
    if !graph.contains(start) {
        return Err(GraphError::NodeNotFound(start.to_string()));
    }
    let adj = adjacency(graph);

    let mut visited: HashMap<&str, usize> = HashMap::from([(start, 0)]);
    let mut queue: VecDeque<(&str, usize)> = VecDeque::from([(start, 0)]);
    let mut layers: BTreeMap<usize, Vec<NodeRef>> = BTreeMap::new();

    while let Some((current, d)) = queue.pop_front() {
        layers.entry(d).or_default().push(node_ref(graph, current));

        if d < depth {
            for neighbour in &adj[current] {
                if !visited.contains_key(neighbour) {
                    visited.insert(neighbour, d + 1);
                    queue.push_back((neighbour, d + 1));
                }
            }
        }
    }

    Ok(TraversalResult {
        start: start.to_string(),
        depth,
        total_reachable: visited.len() - 1,
        layers: layers
            .into_iter()
            .map(|(depth, nodes)| TraversalLayer { depth, nodes })
            .collect(),
    })
}

/// Breadth-first shortest path over the undirected adjacency.
///
/// Returns `Ok(None)` when the two nodes are in different connected
/// components; missing nodes are a [`GraphError::NodeNotFound`]. Under
/// ties the first-discovered predecessor wins, so the result is *a*
/// shortest path, not a unique one.
pub fn shortest_path(
    graph: &KnowledgeGraph,
    start: &str,
    end: &str,
) -> GraphResult<Option<PathResult>> {
    if !graph.contains(start) {
        return Err(GraphError::NodeNotFound(start.to_string()));
    }
    if !graph.contains(end) {
        return Err(GraphError::NodeNotFound(end.to_string()));
    }

    let adj = adjacency(graph);
    let mut predecessor: HashMap<&str, Option<&str>> = HashMap::from([(start, None)]);
    let mut queue: VecDeque<&str> = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        if current == end {
            let mut path = Vec::new();
            let mut node = Some(current);
            while let Some(p) = node {
                path.push(p);
                node = predecessor[p];
            }
            path.reverse();

            return Ok(Some(PathResult {
                length: path.len() - 1,
                nodes: path.into_iter().map(|p| node_ref(graph, p)).collect(),
            }));
        }

        for neighbour in &adj[current] {
            if !predecessor.contains_key(neighbour) {
                predecessor.insert(neighbour, Some(current));
                queue.push_back(neighbour);
            }
        }
    }

    Ok(None)
}

/// Nodes with no connections at all (degree 0), sorted by path.
pub fn orphans(graph: &KnowledgeGraph) -> Vec<NodeRef> {
    graph
        .nodes
        .iter()
        .filter(|(_, node)| node.degree == 0)
        .map(|(path, _)| node_ref(graph, path))
        .collect()
}

/// The most connected nodes, descending by degree. The sort is stable,
/// so ties keep build order (path order).
pub fn hubs(graph: &KnowledgeGraph, limit: usize) -> Vec<HubEntry> {
    let mut entries: Vec<HubEntry> = graph
        .nodes
        .iter()
        .map(|(path, node)| HubEntry {
            path: path.clone(),
            title: node.title.clone(),
            note_type: node.note_type.clone(),
            degree: node.degree,
            in_degree: node.in_degree,
            out_degree: node.out_degree,
        })
        .collect();

    entries.sort_by(|a, b| b.degree.cmp(&a.degree));
    entries.truncate(limit);
    entries
}

/// Resolve a user-supplied note argument to a graph node path: exact
/// path first, then case-insensitive stem or substring match.
pub fn resolve_note_arg(graph: &KnowledgeGraph, arg: &str) -> Option<String> {
    if graph.contains(arg) {
        return Some(arg.to_string());
    }

    let arg_lower = arg.to_lowercase();
    for path in graph.nodes.keys() {
        let stem = std::path::Path::new(path)
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if stem == arg_lower || stem.contains(&arg_lower) {
            return Some(path.clone());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use lodestone_core::types::Classification;
    use lodestone_core::Document;

    fn doc(stem: &str, body: &str) -> Document {
        Document {
            path: format!("{stem}.md"),
            stem: stem.to_string(),
            title: stem.to_string(),
            note_type: None,
            classification: Classification::Personal,
            tags: vec![],
            created: None,
            verified: None,
            status: None,
            encrypted: false,
            relationships: vec![],
            raw_frontmatter: String::new(),
            body: body.to_string(),
            mtime: 0.0,
        }
    }

    /// A - B - C chain plus orphan D.
    fn chain_graph() -> KnowledgeGraph {
        build(&[
            doc("A", "[[B]]"),
            doc("B", "[[C]]"),
            doc("C", ""),
            doc("D", ""),
        ])
    }

    #[test]
    fn traverse_depth_zero_is_start_only() {
        let graph = chain_graph();
        let result = traverse(&graph, "A.md", 0).unwrap();
        assert_eq!(result.layers.len(), 1);
        assert_eq!(result.layers[0].nodes[0].path, "A.md");
        assert_eq!(result.total_reachable, 0);
    }

    #[test]
    fn traverse_is_monotonic_in_depth() {
        let graph = chain_graph();
        let mut previous = 0;
        for depth in 0..4 {
            let result = traverse(&graph, "A.md", depth).unwrap();
            assert!(result.total_reachable >= previous);
            previous = result.total_reachable;
        }
        // Never exceeds the component size minus the start node
        assert_eq!(previous, 2);
    }

    #[test]
    fn traverse_layers_group_by_distance() {
        let graph = chain_graph();
        let result = traverse(&graph, "A.md", 2).unwrap();
        let by_depth: Vec<(usize, Vec<&str>)> = result
            .layers
            .iter()
            .map(|l| (l.depth, l.nodes.iter().map(|n| n.path.as_str()).collect()))
            .collect();
        assert_eq!(
            by_depth,
            vec![
                (0, vec!["A.md"]),
                (1, vec!["B.md"]),
                (2, vec!["C.md"]),
            ]
        );
    }

    #[test]
    fn traverse_missing_start_is_not_found() {
        let graph = chain_graph();
        let err = traverse(&graph, "Z.md", 1).unwrap_err();
        assert!(matches!(err, GraphError::NodeNotFound(_)));
    }

    #[test]
    fn traversal_is_undirected() {
        // Edge direction C <- B should not stop traversal from C
        let graph = chain_graph();
        let result = traverse(&graph, "C.md", 2).unwrap();
        assert_eq!(result.total_reachable, 2);
    }

    #[test]
    fn shortest_path_to_self_is_zero() {
        let graph = chain_graph();
        let result = shortest_path(&graph, "A.md", "A.md").unwrap().unwrap();
        assert_eq!(result.length, 0);
        assert_eq!(result.nodes.len(), 1);
    }

    #[test]
    fn shortest_path_across_chain() {
        let graph = chain_graph();
        let result = shortest_path(&graph, "A.md", "C.md").unwrap().unwrap();
        assert_eq!(result.length, 2);
        let paths: Vec<&str> = result.nodes.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, vec!["A.md", "B.md", "C.md"]);
    }

    #[test]
    fn disconnected_nodes_have_no_path() {
        let graph = chain_graph();
        assert!(shortest_path(&graph, "A.md", "D.md").unwrap().is_none());
    }

    #[test]
    fn orphans_are_degree_zero_nodes() {
        let graph = chain_graph();
        let orphans = orphans(&graph);
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].path, "D.md");
    }

    #[test]
    fn hubs_sort_descending_with_stable_ties() {
        let graph = build(&[doc("A", "[[B]]"), doc("B", "[[A]]"), doc("C", "")]);
        let hubs = hubs(&graph, 2);
        assert_eq!(hubs.len(), 2);
        // A and B tie at degree 2; build order breaks the tie
        assert_eq!(hubs[0].path, "A.md");
        assert_eq!(hubs[0].degree, 2);
        assert_eq!(hubs[1].path, "B.md");
    }

    #[test]
    fn mutual_pair_and_orphan_queries_agree() {
        let graph = build(&[doc("A", "[[B]]"), doc("B", "[[A]]"), doc("C", "")]);

        let orphan_paths: Vec<String> = orphans(&graph).into_iter().map(|n| n.path).collect();
        assert_eq!(orphan_paths, vec!["C.md"]);

        let top = hubs(&graph, 1);
        assert_eq!(top[0].degree, 2);

        let path = shortest_path(&graph, "A.md", "B.md").unwrap().unwrap();
        assert_eq!(path.length, 1);

        assert!(shortest_path(&graph, "A.md", "C.md").unwrap().is_none());
    }

    #[test]
    fn resolves_note_arguments_loosely() {
        let graph = chain_graph();
        assert_eq!(resolve_note_arg(&graph, "A.md"), Some("A.md".to_string()));
        assert_eq!(resolve_note_arg(&graph, "a"), Some("A.md".to_string()));
        assert_eq!(resolve_note_arg(&graph, "nope"), None);
    }
}
