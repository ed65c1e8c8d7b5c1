use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser)]
#[command(name = "lode")]
#[command(about = "lode - hybrid search and knowledge graph over a markdown vault")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault root directory (discovered from the working directory when omitted)
    #[arg(long, global = true)]
    pub vault: Option<PathBuf>,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Embedding service URL (overrides config file)
    #[arg(long, global = true)]
    pub embedding_url: Option<String>,

    /// Embedding model name (overrides config file)
    #[arg(long, global = true)]
    pub embedding_model: Option<String>,

    /// Output as JSON
    #[arg(short = 'j', long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the vault (hybrid lexical + vector when both indexes exist)
    Search {
        /// Search query
        query: String,

        /// Filter by note type
        #[arg(short = 't', long = "type")]
        note_type: Option<String>,

        /// Maximum results
        #[arg(short = 'L', long, default_value = "10")]
        limit: usize,

        /// Show scoring details
        #[arg(short, long)]
        explain: bool,

        /// Use the lexical index only
        #[arg(long)]
        lexical_only: bool,

        /// Use vector similarity only
        #[arg(long)]
        vector_only: bool,
    },

    /// Rebuild the graph, lexical index and (when a provider is reachable) embeddings
    Rebuild {
        /// Skip the embedding pass even if a provider is configured
        #[arg(long)]
        skip_embeddings: bool,
    },

    /// Breadth-first traversal from a note
    Traverse {
        /// Note path or stem
        note: String,

        /// Traversal depth
        #[arg(short, long, default_value = "2")]
        depth: usize,
    },

    /// Shortest path between two notes
    Path {
        /// Starting note path or stem
        from: String,

        /// Destination note path or stem
        to: String,
    },

    /// List notes with no connections
    Orphans,

    /// List the most connected notes
    Hubs {
        /// Maximum entries
        #[arg(short = 'L', long, default_value = "10")]
        limit: usize,
    },

    /// Show statistics for every store
    Stats,
}
