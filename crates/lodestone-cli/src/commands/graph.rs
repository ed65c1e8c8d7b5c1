//! Graph query commands: traverse, path, orphans, hubs

use anyhow::{bail, Result};
use lodestone_core::config::VaultConfig;
use lodestone_graph::{query, KnowledgeGraph};

fn load_graph(config: &VaultConfig) -> Result<KnowledgeGraph> {
    Ok(lodestone_graph::store::load(&config.graph_path())?)
}

fn resolve(graph: &KnowledgeGraph, arg: &str) -> Result<String> {
    match query::resolve_note_arg(graph, arg) {
        Some(path) => Ok(path),
        None => bail!("Note not found: {arg}"),
    }
}

pub fn traverse(config: VaultConfig, note: &str, depth: usize, json: bool) -> Result<()> {
    let graph = load_graph(&config)?;
    let start = resolve(&graph, note)?;
    let result = query::traverse(&graph, &start, depth)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("\nTraversal from: {} (depth {})", result.start, result.depth);
    println!("Reachable notes: {}\n", result.total_reachable);
    for layer in &result.layers {
        let label = if layer.depth == 0 {
            "Start".to_string()
        } else {
            format!("Depth {}", layer.depth)
        };
        println!("  {label}:");
        for node in &layer.nodes {
            let note_type = node.note_type.as_deref().unwrap_or("unknown");
            println!("    [{}] {} ({})", note_type, node.title, node.path);
        }
    }
    Ok(())
}

pub fn path(config: VaultConfig, from: &str, to: &str, json: bool) -> Result<()> {
    let graph = load_graph(&config)?;
    let start = resolve(&graph, from)?;
    let end = resolve(&graph, to)?;
    let result = query::shortest_path(&graph, &start, &end)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match result {
        Some(path) => {
            println!("\nShortest path ({} hop(s)):\n", path.length);
            for (i, node) in path.nodes.iter().enumerate() {
                let connector = if i == 0 { "  " } else { "  -> " };
                let note_type = node.note_type.as_deref().unwrap_or("unknown");
                println!("{}[{}] {} ({})", connector, note_type, node.title, node.path);
            }
        }
        None => println!("No path found between {start} and {end}"),
    }
    Ok(())
}

pub fn orphans(config: VaultConfig, json: bool) -> Result<()> {
    let graph = load_graph(&config)?;
    let orphans = query::orphans(&graph);

    if json {
        println!("{}", serde_json::to_string_pretty(&orphans)?);
        return Ok(());
    }

    if orphans.is_empty() {
        println!("No orphan notes found - all notes are connected!");
        return Ok(());
    }

    println!("\n{} orphan note(s) (no connections):\n", orphans.len());
    for orphan in &orphans {
        let note_type = orphan.note_type.as_deref().unwrap_or("unknown");
        println!("  [{}] {}", note_type, orphan.path);
    }
    Ok(())
}

pub fn hubs(config: VaultConfig, limit: usize, json: bool) -> Result<()> {
    let graph = load_graph(&config)?;
    let hubs = query::hubs(&graph, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&hubs)?);
        return Ok(());
    }

    println!("\nTop {} most connected notes:\n", hubs.len());
    for (i, hub) in hubs.iter().enumerate() {
        let note_type = hub.note_type.as_deref().unwrap_or("unknown");
        println!("  {:>2}. [{}] {}", i + 1, note_type, hub.title);
        println!(
            "      {} (degree: {}, in: {}, out: {})",
            hub.path, hub.degree, hub.in_degree, hub.out_degree
        );
    }
    Ok(())
}
