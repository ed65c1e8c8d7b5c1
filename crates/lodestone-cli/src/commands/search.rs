use anyhow::{bail, Result};
use lodestone_core::config::VaultConfig;
use lodestone_embed::{EmbeddingProvider, OllamaProvider};
use lodestone_search::{HybridSearcher, SearchHit, SearchMode, SearchRequest, SearchSource};
use tracing::warn;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    config: VaultConfig,
    query: String,
    note_type: Option<String>,
    limit: usize,
    explain: bool,
    lexical_only: bool,
    vector_only: bool,
    json: bool,
) -> Result<()> {
    if lexical_only && vector_only {
        bail!("--lexical-only and --vector-only are mutually exclusive");
    }
    let mode = if lexical_only {
        SearchMode::LexicalOnly
    } else if vector_only {
        SearchMode::VectorOnly
    } else {
        SearchMode::Hybrid
    };

    // The provider is only worth constructing when the vector tier can run
    let provider: Option<OllamaProvider> = if !lexical_only
        && config.embeddings_path().is_file()
    {
        match OllamaProvider::new(
            &config.embedding.url,
            &config.embedding.model,
            config.embedding.timeout_secs,
        ) {
            Ok(provider) => Some(provider),
            Err(err) => {
                warn!(error = %err, "Embedding provider unavailable");
                None
            }
        }
    } else {
        None
    };

    let request = SearchRequest {
        query,
        note_type,
        limit,
        mode,
    };
    let searcher = HybridSearcher::new(config);
    let hits = searcher
        .search(provider.as_ref().map(|p| p as &dyn EmbeddingProvider), &request)
        .await?;

    if json {
        print_json(&hits)?;
    } else {
        print_human(&hits, explain);
    }
    Ok(())
}

fn display_score(hit: &SearchHit) -> f64 {
    match hit.source {
        SearchSource::Hybrid => hit.fusion_score,
        SearchSource::Lexical => hit.bm25_score,
        SearchSource::Vector => hit.vector_score as f64,
    }
}

fn print_json(hits: &[SearchHit]) -> Result<()> {
    let output: Vec<serde_json::Value> = hits
        .iter()
        .map(|hit| {
            serde_json::json!({
                "path": hit.path,
                "title": hit.title,
                "type": hit.note_type,
                "score": display_score(hit),
                "snippet": hit.snippet,
                "source": hit.source,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_human(hits: &[SearchHit], explain: bool) {
    if hits.is_empty() {
        println!("No results found.");
        return;
    }

    println!("\nFound {} result(s):\n", hits.len());

    for (i, hit) in hits.iter().enumerate() {
        let note_type = hit.note_type.as_deref().unwrap_or("unknown");
        println!("  {}. [{}] {}", i + 1, note_type, hit.title);
        println!("     {}", hit.path);

        if let Some(snippet) = hit.snippet.as_deref().filter(|s| !s.is_empty()) {
            let truncated: String = snippet.chars().take(200).collect();
            println!("     {truncated}");
        }

        if explain {
            match hit.source {
                SearchSource::Hybrid => {
                    let mut parts = vec![
                        format!("fusion={:.4}", hit.fusion_score),
                        format!("bm25={:.4}", hit.bm25_score),
                        format!("vector={:.4}", hit.vector_score),
                    ];
                    if hit.graph_score > 0.0 {
                        parts.push(format!("graph={:.2}", hit.graph_score));
                    }
                    println!("     Score: {}", parts.join(" "));
                }
                SearchSource::Lexical => println!("     Score: bm25={:.4}", hit.bm25_score),
                SearchSource::Vector => println!("     Score: vector={:.4}", hit.vector_score),
            }

            if let Some(tags) = hit.tags.as_deref().filter(|t| !t.is_empty()) {
                println!("     Tags: {tags}");
            }
            if let Some(cls) = hit.classification.as_deref().filter(|c| *c != "personal") {
                println!("     Classification: {cls}");
            }
        }

        println!();
    }
}
