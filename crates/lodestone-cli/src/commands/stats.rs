//! Statistics across every store

use anyhow::Result;
use lodestone_core::config::VaultConfig;
use lodestone_embed::EmbeddingStore;
use lodestone_graph::KnowledgeGraph;
use lodestone_index::LexicalIndex;
use std::collections::BTreeMap;

pub fn execute(config: VaultConfig, json: bool) -> Result<()> {
    let graph = lodestone_graph::store::load(&config.graph_path()).ok();
    let index_stats = LexicalIndex::open_existing(&config.index_path())
        .and_then(|index| index.stats())
        .ok();
    let embeddings = EmbeddingStore::load_existing(&config.embeddings_path()).ok();

    if json {
        return print_json(&config, graph.as_ref(), index_stats.as_ref(), embeddings.as_ref());
    }

    match &graph {
        Some(graph) => print_graph(graph),
        None => println!("No graph found. Run: lode rebuild"),
    }

    match &index_stats {
        Some(stats) => print_index(&config, stats),
        None => println!("\nNo search index found. Run: lode rebuild"),
    }

    match &embeddings {
        Some(store) => print_embeddings(&config, store),
        None => println!("\nNo embeddings found. Run: lode rebuild (requires a reachable provider)"),
    }

    Ok(())
}

fn print_json(
    config: &VaultConfig,
    graph: Option<&KnowledgeGraph>,
    index: Option<&lodestone_index::IndexStats>,
    embeddings: Option<&EmbeddingStore>,
) -> Result<()> {
    let output = serde_json::json!({
        "graph": graph.map(|g| serde_json::json!({
            "built": g.built,
            "total_nodes": g.stats.total_nodes,
            "total_edges": g.stats.total_edges,
            "total_typed_edges": g.stats.total_typed_edges,
            "avg_degree": g.stats.avg_degree,
            "orphans": g.nodes.values().filter(|n| n.degree == 0).count(),
        })),
        "index": index.map(|s| serde_json::json!({
            "total": s.total,
            "by_type": s.by_type,
            "by_classification": s.by_classification,
            "encrypted": s.encrypted,
            "last_built": s.last_built,
            "size_bytes": s.size_bytes,
        })),
        "embeddings": embeddings.map(|e| serde_json::json!({
            "model": e.model,
            "dimension": e.dimension,
            "count": e.count,
            "built": e.built,
            "path": config.embeddings_path(),
        })),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Counts sorted descending, ties by name.
fn sorted_counts(counts: BTreeMap<String, usize>) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

fn print_graph(graph: &KnowledgeGraph) {
    println!("\nKnowledge Graph");
    println!("Built: {}", graph.built);
    println!("Total nodes: {}", graph.stats.total_nodes);
    println!(
        "Total edges: {} (untyped) + {} (typed)",
        graph.stats.total_edges, graph.stats.total_typed_edges
    );
    println!("Average degree: {:.1}", graph.stats.avg_degree);

    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    for node in graph.nodes.values() {
        let key = node.note_type.clone().unwrap_or_else(|| "unknown".to_string());
        *by_type.entry(key).or_default() += 1;
    }
    if !by_type.is_empty() {
        println!("\nNodes by type:");
        for (note_type, count) in sorted_counts(by_type) {
            println!("  {note_type:<20} {count:>4}");
        }
    }

    let total = graph.nodes.len().max(1);
    let orphans = graph.nodes.values().filter(|n| n.degree == 0).count();
    let connected = graph.nodes.len() - orphans;
    println!("\nConnected: {} ({}%)", connected, connected * 100 / total);
    println!("Orphans: {orphans}");

    let mut typed_counts: BTreeMap<String, usize> = BTreeMap::new();
    for edge in &graph.typed_edges {
        *typed_counts.entry(edge.kind.to_string()).or_default() += 1;
    }
    if !typed_counts.is_empty() {
        println!("\nTyped relationships:");
        for (kind, count) in sorted_counts(typed_counts) {
            println!("  {kind:<20} {count:>4}");
        }
    }
}

fn print_index(config: &VaultConfig, stats: &lodestone_index::IndexStats) {
    println!("\nSearch Index: {}", config.index_path().display());
    println!("Total notes indexed: {}", stats.total);

    if !stats.by_type.is_empty() {
        println!("\nBy type:");
        for (note_type, count) in &stats.by_type {
            println!("  {note_type:<20} {count:>4}");
        }
    }

    if !stats.by_classification.is_empty() {
        println!("\nBy classification:");
        for (classification, count) in &stats.by_classification {
            println!("  {classification:<20} {count:>4}");
        }
    }

    if stats.encrypted > 0 {
        println!("\nEncrypted notes: {} (metadata-only in index)", stats.encrypted);
    }
    if let Some(built) = &stats.last_built {
        println!("\nLast built: {built}");
    }
    println!("Database size: {:.1} KB", stats.size_bytes as f64 / 1024.0);
}

fn print_embeddings(config: &VaultConfig, store: &EmbeddingStore) {
    println!("\nEmbeddings: {}", config.embeddings_path().display());
    println!("Model: {}", store.model.as_deref().unwrap_or("unknown"));
    println!("Dimension: {}", store.dimension);
    println!("Total notes: {}", store.count);
    println!("Built: {}", store.built);
}
