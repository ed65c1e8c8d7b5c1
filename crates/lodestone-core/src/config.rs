//! Vault configuration
//!
//! The vault root is explicit: components receive it at construction
//! instead of discovering it by walking parent directories. The CLI is
//! the only place that resolves a root from the environment.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the per-vault data directory holding the index, graph and
/// embedding stores.
pub const DATA_DIR: &str = ".lodestone";

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Base URL of the embedding service
    #[serde(default = "default_embedding_url")]
    pub url: String,

    /// Model name; a change invalidates every stored vector
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Documents per provider request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            url: default_embedding_url(),
            model: default_embedding_model(),
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_embedding_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_batch_size() -> usize {
    32
}

fn default_timeout_secs() -> u64 {
    30
}

/// Source weights for rank fusion. Renormalized at query time when
/// graph centrality is available.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FusionWeights {
    #[serde(default = "default_lexical_weight")]
    pub lexical: f64,
    #[serde(default = "default_vector_weight")]
    pub vector: f64,
    #[serde(default = "default_graph_weight")]
    pub graph: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            lexical: default_lexical_weight(),
            vector: default_vector_weight(),
            graph: default_graph_weight(),
        }
    }
}

fn default_lexical_weight() -> f64 {
    0.7
}

fn default_vector_weight() -> f64 {
    0.3
}

fn default_graph_weight() -> f64 {
    0.1
}

/// On-disk configuration file shape (`.lodestone/config.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FileConfig {
    #[serde(default)]
    embedding: Option<EmbeddingSettings>,
    #[serde(default)]
    weights: Option<FusionWeights>,
}

/// Resolved configuration for one vault.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub root: PathBuf,
    pub embedding: EmbeddingSettings,
    pub weights: FusionWeights,
}

impl VaultConfig {
    /// Configuration with defaults for the given root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            embedding: EmbeddingSettings::default(),
            weights: FusionWeights::default(),
        }
    }

    /// Load configuration for a vault, merging `.lodestone/config.toml`
    /// over defaults when present. A missing file is not an error.
    pub fn load(root: impl Into<PathBuf>) -> CoreResult<Self> {
        let root = root.into();
        let config_path = root.join(DATA_DIR).join("config.toml");

        let file: FileConfig = if config_path.is_file() {
            let text = std::fs::read_to_string(&config_path)?;
            toml::from_str(&text)
                .map_err(|e| CoreError::Config(format!("{}: {e}", config_path.display())))?
        } else {
            debug!(path = ?config_path, "No config file; using defaults");
            FileConfig::default()
        };

        Ok(Self {
            root,
            embedding: file.embedding.unwrap_or_default(),
            weights: file.weights.unwrap_or_default(),
        })
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    /// SQLite lexical index location.
    pub fn index_path(&self) -> PathBuf {
        self.data_dir().join("search.db")
    }

    /// Persisted knowledge graph location.
    pub fn graph_path(&self) -> PathBuf {
        self.data_dir().join("graph.json")
    }

    /// Persisted embedding store location.
    pub fn embeddings_path(&self) -> PathBuf {
        self.data_dir().join("embeddings.json")
    }

    /// Create the data directory if it does not exist yet.
    pub fn ensure_data_dir(&self) -> CoreResult<&Self> {
        std::fs::create_dir_all(self.data_dir())?;
        Ok(self)
    }
}

/// Walk upward from `start` looking for an existing data directory.
/// Returns `start` itself when none is found. CLI-edge helper only.
pub fn discover_root(start: &Path) -> PathBuf {
    let mut current = start;
    loop {
        if current.join(DATA_DIR).is_dir() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return start.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_config_file() {
        let tmp = TempDir::new().unwrap();
        let config = VaultConfig::load(tmp.path()).unwrap();
        assert_eq!(config.embedding.model, "nomic-embed-text");
        assert_eq!(config.weights.lexical, 0.7);
        assert_eq!(config.weights.vector, 0.3);
        assert_eq!(config.weights.graph, 0.1);
    }

    #[test]
    fn loads_overrides_from_toml() {
        let tmp = TempDir::new().unwrap();
        let data_dir = tmp.path().join(DATA_DIR);
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(
            data_dir.join("config.toml"),
            "[embedding]\nmodel = \"all-minilm\"\n\n[weights]\nlexical = 0.5\n",
        )
        .unwrap();

        let config = VaultConfig::load(tmp.path()).unwrap();
        assert_eq!(config.embedding.model, "all-minilm");
        assert_eq!(config.weights.lexical, 0.5);
        // Unspecified fields keep their defaults
        assert_eq!(config.weights.vector, 0.3);
    }

    #[test]
    fn discover_root_walks_upward() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::create_dir_all(tmp.path().join(DATA_DIR)).unwrap();

        assert_eq!(discover_root(&nested), tmp.path());
    }

    #[test]
    fn paths_land_in_data_dir() {
        let config = VaultConfig::new("/vault");
        assert_eq!(config.index_path(), PathBuf::from("/vault/.lodestone/search.db"));
        assert_eq!(config.graph_path(), PathBuf::from("/vault/.lodestone/graph.json"));
    }
}
