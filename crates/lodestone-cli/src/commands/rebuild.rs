//! Full rebuild: graph, lexical index, and embeddings when reachable

use anyhow::Result;
use lodestone_core::config::VaultConfig;
use lodestone_core::VaultWalker;
use lodestone_embed::{EmbeddingProvider, EmbeddingStore, OllamaProvider};
use lodestone_index::LexicalIndex;
use std::time::Instant;
use tracing::{info, warn};

pub async fn execute(config: VaultConfig, skip_embeddings: bool, json: bool) -> Result<()> {
    let started = Instant::now();
    config.ensure_data_dir()?;

    // The graph keeps secret notes as nodes so link structure stays
    // whole; the index builders drop them from content stores.
    let graph_docs = VaultWalker::new(&config.root)
        .include_secret_dir()
        .collect()?;
    let graph = lodestone_graph::build(&graph_docs);
    lodestone_graph::store::save(&graph, &config.graph_path())?;

    let docs = VaultWalker::new(&config.root).collect()?;
    let index = LexicalIndex::open(&config.index_path())?;
    let summary = index.index_all(&docs)?;

    let embed_summary = if skip_embeddings {
        None
    } else {
        embed_pass(&config, &docs).await
    };

    let elapsed = started.elapsed().as_secs_f64();
    let orphans = graph.nodes.values().filter(|n| n.degree == 0).count();

    if json {
        let mut output = serde_json::json!({
            "elapsed_secs": elapsed,
            "graph": {
                "nodes": graph.stats.total_nodes,
                "edges": graph.stats.total_edges,
                "typed_edges": graph.stats.total_typed_edges,
                "orphans": orphans,
            },
            "index": {
                "total": summary.total,
                "updated": summary.updated,
                "unchanged": summary.unchanged,
                "removed": summary.removed,
            },
        });
        if let Some(embed) = &embed_summary {
            output["embeddings"] = serde_json::json!({
                "embedded": embed.embedded,
                "unchanged": embed.unchanged,
                "failed": embed.failed,
                "pruned": embed.pruned,
            });
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Rebuilt in {elapsed:.2}s");
    println!(
        "  Graph: {} nodes, {} edges (untyped) + {} (typed), {} orphan(s)",
        graph.stats.total_nodes, graph.stats.total_edges, graph.stats.total_typed_edges, orphans
    );
    println!(
        "  Index: {} notes ({} updated, {} unchanged, {} removed)",
        summary.total, summary.updated, summary.unchanged, summary.removed
    );
    match embed_summary {
        Some(embed) if embed.failed == 0 => println!(
            "  Embeddings: {} embedded, {} unchanged, {} pruned",
            embed.embedded, embed.unchanged, embed.pruned
        ),
        Some(embed) => println!(
            "  Embeddings: {} embedded, {} failed (provider trouble; lexical search unaffected)",
            embed.embedded, embed.failed
        ),
        None => println!("  Embeddings: skipped"),
    }
    Ok(())
}

/// Run the embedding pass when the provider answers; an unreachable
/// provider downgrades the rebuild, never fails it.
async fn embed_pass(
    config: &VaultConfig,
    docs: &[lodestone_core::Document],
) -> Option<lodestone_embed::EmbedSummary> {
    let provider = match OllamaProvider::new(
        &config.embedding.url,
        &config.embedding.model,
        config.embedding.timeout_secs,
    ) {
        Ok(provider) => provider,
        Err(err) => {
            warn!(error = %err, "Embedding provider unavailable; skipping embeddings");
            return None;
        }
    };

    // Probe before committing to a full pass
    if let Err(err) = provider.embed("lodestone").await {
        warn!(error = %err, url = %config.embedding.url, "Embedding provider unreachable; skipping embeddings");
        return None;
    }

    let mut store = EmbeddingStore::load(&config.embeddings_path());
    let summary = store
        .update(docs, &provider, config.embedding.batch_size)
        .await;
    if let Err(err) = store.save(&config.embeddings_path()) {
        warn!(error = %err, "Failed to persist embedding store");
        return None;
    }
    info!(
        embedded = summary.embedded,
        pruned = summary.pruned,
        "Embedding pass complete"
    );
    Some(summary)
}
