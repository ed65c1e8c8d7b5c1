//! Query orchestration across the three tiers
//!
//! The lexical index is the baseline tier: it answers on its own when
//! no embeddings exist, and an unreachable embedding provider only
//! loses the vector tier, never the query. Fusion runs when both
//! tiers return results.

use crate::error::{SearchError, SearchResult};
use crate::fusion::{fuse, SearchHit};
use lodestone_core::config::VaultConfig;
use lodestone_embed::{EmbeddingProvider, EmbeddingStore};
use lodestone_index::{IndexError, LexicalIndex, SearchFilters};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Which tiers a query may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Lexical plus vector when both stores exist
    #[default]
    Hybrid,
    /// BM25 only
    LexicalOnly,
    /// Cosine similarity only
    VectorOnly,
}

/// One search invocation.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub note_type: Option<String>,
    pub limit: usize,
    pub mode: SearchMode,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            note_type: None,
            limit: 10,
            mode: SearchMode::Hybrid,
        }
    }
}

/// Runs queries against whatever stores the vault has built.
pub struct HybridSearcher {
    config: VaultConfig,
}

impl HybridSearcher {
    pub fn new(config: VaultConfig) -> Self {
        Self { config }
    }

    /// Execute one query. The provider embeds the query text for the
    /// vector tier; pass `None` to search lexically regardless of mode.
    pub async fn search(
        &self,
        provider: Option<&dyn EmbeddingProvider>,
        request: &SearchRequest,
    ) -> SearchResult<Vec<SearchHit>> {
        match request.mode {
            SearchMode::LexicalOnly => self.lexical_tier(request).map(|hits| {
                hits.into_iter().take(request.limit).collect()
            }),
            SearchMode::VectorOnly => {
                let mut hits = self.vector_tier(provider, request).await?;
                hits.truncate(request.limit);
                Ok(hits)
            }
            SearchMode::Hybrid => self.hybrid(provider, request).await,
        }
    }

    async fn hybrid(
        &self,
        provider: Option<&dyn EmbeddingProvider>,
        request: &SearchRequest,
    ) -> SearchResult<Vec<SearchHit>> {
        let have_index = self.config.index_path().is_file();
        let have_embeddings = self.config.embeddings_path().is_file();
        if !have_index && !have_embeddings {
            return Err(SearchError::NothingToSearch(
                self.config.data_dir().display().to_string(),
            ));
        }

        let lexical = if have_index {
            self.run_lexical(request)?
        } else {
            warn!("No lexical index; answering from embeddings alone");
            Vec::new()
        };

        let vector = if have_embeddings {
            match self.run_vector(provider, request).await {
                Ok(hits) => hits,
                Err(err) => {
                    warn!(error = %err, "Vector tier unavailable; degrading to lexical");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        if !lexical.is_empty() && !vector.is_empty() {
            let centrality = self.load_centrality();
            debug!(
                lexical = lexical.len(),
                vector = vector.len(),
                centrality = centrality.len(),
                "Fusing result lists"
            );
            let mut fused = fuse(&lexical, &vector, &centrality, &self.config.weights);
            fused.truncate(request.limit);
            return Ok(fused);
        }

        let mut hits: Vec<SearchHit> = if !lexical.is_empty() {
            lexical.iter().map(SearchHit::from).collect()
        } else {
            vector.iter().map(SearchHit::from).collect()
        };
        hits.truncate(request.limit);
        Ok(hits)
    }

    fn lexical_tier(&self, request: &SearchRequest) -> SearchResult<Vec<SearchHit>> {
        Ok(self.run_lexical(request)?.iter().map(SearchHit::from).collect())
    }

    fn run_lexical(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<lodestone_index::LexicalHit>, IndexError> {
        let index = LexicalIndex::open_existing(&self.config.index_path())?;
        let filters = SearchFilters {
            note_type: request.note_type.clone(),
            exclude_classifications: Vec::new(),
        };
        index.search(&request.query, &filters, request.limit)
    }

    async fn vector_tier(
        &self,
        provider: Option<&dyn EmbeddingProvider>,
        request: &SearchRequest,
    ) -> SearchResult<Vec<SearchHit>> {
        let hits = self.run_vector(provider, request).await?;
        Ok(hits.iter().map(SearchHit::from).collect())
    }

    async fn run_vector(
        &self,
        provider: Option<&dyn EmbeddingProvider>,
        request: &SearchRequest,
    ) -> SearchResult<Vec<lodestone_embed::VectorHit>> {
        let provider = provider.ok_or_else(|| {
            lodestone_embed::EmbedError::Provider("no embedding provider configured".to_string())
        })?;
        let store = EmbeddingStore::load_existing(&self.config.embeddings_path())?;
        let query_vector = provider.embed(&request.query).await?;
        Ok(store.search(&query_vector, request.limit))
    }

    /// Missing or unreadable graph data just disables the boost.
    fn load_centrality(&self) -> BTreeMap<String, f64> {
        match lodestone_graph::store::load(&self.config.graph_path()) {
            Ok(graph) => graph.centrality(),
            Err(_) => BTreeMap::new(),
        }
    }
}
