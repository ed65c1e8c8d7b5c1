use anyhow::Result;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use lodestone_cli::cli::{Cli, Commands};
use lodestone_cli::commands;
use lodestone_core::config::{self, VaultConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level: LevelFilter = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        cli.log_level.map(Into::into).unwrap_or(LevelFilter::WARN)
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(format!(
            "lodestone_core={level},lodestone_graph={level},lodestone_index={level},lodestone_embed={level},lodestone_search={level},lodestone_cli={level}"
        )))
        .with_writer(std::io::stderr)
        .init();

    let root = match cli.vault {
        Some(root) => root,
        None => config::discover_root(&std::env::current_dir()?),
    };
    let mut config = VaultConfig::load(root)?;
    if let Some(url) = cli.embedding_url {
        config.embedding.url = url;
    }
    if let Some(model) = cli.embedding_model {
        config.embedding.model = model;
    }

    match cli.command {
        Commands::Search {
            query,
            note_type,
            limit,
            explain,
            lexical_only,
            vector_only,
        } => {
            commands::search::execute(
                config,
                query,
                note_type,
                limit,
                explain,
                lexical_only,
                vector_only,
                cli.json,
            )
            .await?
        }

        Commands::Rebuild { skip_embeddings } => {
            commands::rebuild::execute(config, skip_embeddings, cli.json).await?
        }

        Commands::Traverse { note, depth } => {
            commands::graph::traverse(config, &note, depth, cli.json)?
        }

        Commands::Path { from, to } => commands::graph::path(config, &from, &to, cli.json)?,

        Commands::Orphans => commands::graph::orphans(config, cli.json)?,

        Commands::Hubs { limit } => commands::graph::hubs(config, limit, cli.json)?,

        Commands::Stats => commands::stats::execute(config, cli.json)?,
    }

    Ok(())
}
