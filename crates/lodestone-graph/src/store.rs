//! Graph persistence
//!
//! The graph lives in one JSON file. Writes go through a temp file in
//! the same directory followed by an atomic rename, so a concurrent
//! reader always sees either the old or the new graph, never a partial
//! write.

use crate::error::{GraphError, GraphResult};
use crate::model::KnowledgeGraph;
use std::path::Path;
use tracing::{debug, info};

/// Persist the graph, replacing any existing file atomically.
pub fn save(graph: &KnowledgeGraph, path: &Path) -> GraphResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(graph)?;
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;

    info!(path = ?path, nodes = graph.stats.total_nodes, "Graph saved");
    Ok(())
}

/// Load a persisted graph. A missing file surfaces as
/// [`GraphError::StoreMissing`] with an actionable message.
pub fn load(path: &Path) -> GraphResult<KnowledgeGraph> {
    if !path.is_file() {
        return Err(GraphError::StoreMissing(path.display().to_string()));
    }
    let json = std::fs::read_to_string(path)?;
    let graph = serde_json::from_str(&json)?;
    debug!(path = ?path, "Graph loaded");
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use tempfile::TempDir;

    #[test]
    fn round_trips_through_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".lodestone/graph.json");

        let graph = build(&[]);
        save(&graph, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.stats.total_nodes, 0);
        assert_eq!(loaded.built, graph.built);
    }

    #[test]
    fn missing_store_is_actionable() {
        let tmp = TempDir::new().unwrap();
        let err = load(&tmp.path().join("graph.json")).unwrap_err();
        assert!(matches!(err, GraphError::StoreMissing(_)));
        assert!(err.to_string().contains("rebuild"));
    }

    #[test]
    fn save_replaces_existing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("graph.json");

        save(&build(&[]), &path).unwrap();
        save(&build(&[]), &path).unwrap();

        assert!(load(&path).is_ok());
        assert!(!path.with_extension("json.tmp").exists());
    }
}
