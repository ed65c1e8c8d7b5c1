//! Persisted embedding store
//!
//! One JSON file mapping document path to embedding entry, written via
//! temp file + atomic rename like the graph store. Entries are pruned
//! when the source document is deleted or reclassified as secret; a
//! model change drops everything.

use crate::error::{EmbedError, EmbedResult};
use crate::prepare::prepare_text;
use crate::provider::EmbeddingProvider;
use crate::similarity::cosine_similarity;
use lodestone_core::Document;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// One document's stored embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingEntry {
    pub title: String,
    #[serde(rename = "type")]
    pub note_type: Option<String>,
    /// Freshness token mirroring the document's mtime
    pub mtime: f64,
    pub vector: Vec<f32>,
}

/// Outcome of one embedding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmbedSummary {
    pub embedded: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub pruned: usize,
    /// True when a model change forced full invalidation
    pub invalidated: bool,
}

/// One ranked vector search result.
#[derive(Debug, Clone, Serialize)]
pub struct VectorHit {
    pub path: String,
    pub title: String,
    #[serde(rename = "type")]
    pub note_type: Option<String>,
    pub score: f32,
}

/// The persisted vector index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddingStore {
    /// Model that produced the stored vectors; vectors from different
    /// models are not comparable
    pub model: Option<String>,
    pub dimension: usize,
    pub count: usize,
    pub built: String,
    pub embeddings: BTreeMap<String, EmbeddingEntry>,
}

impl EmbeddingStore {
    /// Load the store, yielding an empty one when the file does not
    /// exist or cannot be decoded (a corrupt store is rebuilt, not
    /// fatal).
    pub fn load(path: &Path) -> Self {
        if !path.is_file() {
            return Self::default();
        }
        match std::fs::read_to_string(path)
            .map_err(EmbedError::from)
            .and_then(|text| serde_json::from_str(&text).map_err(EmbedError::from))
        {
            Ok(store) => store,
            Err(err) => {
                warn!(path = ?path, error = %err, "Unreadable embedding store; starting fresh");
                Self::default()
            }
        }
    }

    /// Load for queries; a missing file is an actionable error.
    pub fn load_existing(path: &Path) -> EmbedResult<Self> {
        if !path.is_file() {
            return Err(EmbedError::StoreMissing(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Persist atomically.
    pub fn save(&self, path: &Path) -> EmbedResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string(self)?)?;
        std::fs::rename(&tmp, path)?;
        info!(path = ?path, count = self.count, "Embedding store saved");
        Ok(())
    }

    /// Embed changed or new documents, prune deletions, and handle
    /// model invalidation.
    ///
    /// A failing provider batch degrades that batch (skip and warn)
    /// instead of aborting the run; everything already embedded stays
    /// valid.
    pub async fn update(
        &mut self,
        documents: &[Document],
        provider: &dyn EmbeddingProvider,
        batch_size: usize,
    ) -> EmbedSummary {
        let mut summary = EmbedSummary::default();

        if let Some(stored_model) = &self.model {
            if stored_model != provider.model() {
                info!(
                    from = %stored_model,
                    to = %provider.model(),
                    "Embedding model changed; invalidating store"
                );
                self.embeddings.clear();
                summary.invalidated = true;
            }
        }
        self.model = Some(provider.model().to_string());

        let mut pending: Vec<(&Document, String)> = Vec::new();
        for doc in documents {
            if doc.is_secret() {
                if self.embeddings.remove(&doc.path).is_some() {
                    summary.pruned += 1;
                }
                continue;
            }

            let fresh = self
                .embeddings
                .get(&doc.path)
                .is_some_and(|entry| entry.mtime >= doc.mtime);
            if fresh {
                summary.unchanged += 1;
                continue;
            }

            pending.push((doc, prepare_text(doc)));
        }

        let current: BTreeSet<&str> = documents
            .iter()
            .filter(|d| !d.is_secret())
            .map(|d| d.path.as_str())
            .collect();
        summary.pruned += self.prune_paths(&current);

        for chunk in pending.chunks(batch_size.max(1)) {
            let texts: Vec<String> = chunk.iter().map(|(_, text)| text.clone()).collect();
            match provider.embed_batch(&texts).await {
                Ok(vectors) => {
                    for ((doc, _), vector) in chunk.iter().zip(vectors) {
                        self.dimension = vector.len();
                        self.embeddings.insert(
                            doc.path.clone(),
                            EmbeddingEntry {
                                title: doc.title.clone(),
                                note_type: doc.note_type.clone(),
                                mtime: doc.mtime,
                                vector,
                            },
                        );
                        summary.embedded += 1;
                    }
                }
                Err(err) => {
                    warn!(error = %err, batch = chunk.len(), "Embedding batch failed; skipping");
                    summary.failed += chunk.len();
                }
            }
        }

        self.count = self.embeddings.len();
        self.built = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        debug!(
            embedded = summary.embedded,
            unchanged = summary.unchanged,
            failed = summary.failed,
            pruned = summary.pruned,
            "Embedding update complete"
        );
        summary
    }

    /// Rank all stored vectors by cosine similarity to the query.
    pub fn search(&self, query_vector: &[f32], limit: usize) -> Vec<VectorHit> {
        let mut hits: Vec<VectorHit> = self
            .embeddings
            .iter()
            .map(|(path, entry)| VectorHit {
                path: path.clone(),
                title: entry.title.clone(),
                note_type: entry.note_type.clone(),
                score: cosine_similarity(query_vector, &entry.vector),
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        hits
    }

    /// Remove entries for documents no longer present. Returns the
    /// number removed.
    pub fn prune(&mut self, current: &BTreeSet<String>) -> usize {
        let current: BTreeSet<&str> = current.iter().map(|s| s.as_str()).collect();
        let removed = self.prune_paths(&current);
        self.count = self.embeddings.len();
        removed
    }

    fn prune_paths(&mut self, current: &BTreeSet<&str>) -> usize {
        let before = self.embeddings.len();
        self.embeddings.retain(|path, _| current.contains(path.as_str()));
        before - self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FailingProvider, MockProvider};
    use lodestone_core::types::Classification;
    use tempfile::TempDir;

    fn doc(path: &str, body: &str, mtime: f64) -> Document {
        Document {
            path: path.to_string(),
            stem: path.trim_end_matches(".md").to_string(),
            title: path.to_string(),
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
            mtime,
        }
    }

    #[tokio::test]
    async fn embeds_new_documents() {
        let mut store = EmbeddingStore::default();
        let provider = MockProvider::new();
        let summary = store
            .update(&[doc("a.md", "alpha text", 1.0)], &provider, 32)
            .await;

        assert_eq!(summary.embedded, 1);
        assert_eq!(store.count, 1);
        assert_eq!(store.dimension, 16);
        assert_eq!(store.model.as_deref(), Some("mock-embed"));
    }

    #[tokio::test]
    async fn unchanged_documents_are_skipped() {
        let mut store = EmbeddingStore::default();
        let provider = MockProvider::new();
        let docs = vec![doc("a.md", "alpha", 1.0)];

        store.update(&docs, &provider, 32).await;
        let second = store.update(&docs, &provider, 32).await;

        assert_eq!(second.embedded, 0);
        assert_eq!(second.unchanged, 1);
    }

    #[tokio::test]
    async fn model_change_invalidates_store() {
        let mut store = EmbeddingStore::default();
        let docs = vec![doc("a.md", "alpha", 1.0)];

        store.update(&docs, &MockProvider::with_model("model-a"), 32).await;
        let summary = store
            .update(&docs, &MockProvider::with_model("model-b"), 32)
            .await;

        assert!(summary.invalidated);
        // Everything recomputed under the new model
        assert_eq!(summary.embedded, 1);
        assert_eq!(store.model.as_deref(), Some("model-b"));
    }

    #[tokio::test]
    async fn secret_documents_are_pruned_not_embedded() {
        let mut store = EmbeddingStore::default();
        let provider = MockProvider::new();

        let mut secret = doc("s.md", "hidden", 1.0);
        secret.classification = Classification::Secret;

        let summary = store.update(&[secret.clone()], &provider, 32).await;
        assert_eq!(summary.embedded, 0);
        assert!(store.is_empty());

        // Previously embedded, then reclassified
        store.update(&[doc("s.md", "hidden", 1.0)], &provider, 32).await;
        assert_eq!(store.count, 1);
        let summary = store.update(&[secret], &provider, 32).await;
        assert_eq!(summary.pruned, 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn provider_failure_degrades_without_aborting() {
        let mut store = EmbeddingStore::default();
        let summary = store
            .update(&[doc("a.md", "alpha", 1.0)], &FailingProvider, 32)
            .await;

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.embedded, 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn prune_removes_exactly_deleted_entries() {
        let mut store = EmbeddingStore::default();
        let provider = MockProvider::new();
        store
            .update(
                &[doc("a.md", "alpha", 1.0), doc("b.md", "beta", 1.0)],
                &provider,
                32,
            )
            .await;

        let current: BTreeSet<String> = ["a.md".to_string()].into_iter().collect();
        assert_eq!(store.prune(&current), 1);
        assert!(store.embeddings.contains_key("a.md"));
        assert_eq!(store.count, 1);
    }

    #[tokio::test]
    async fn search_ranks_by_similarity() {
        let mut store = EmbeddingStore::default();
        let provider = MockProvider::new();
        store
            .update(
                &[
                    doc("a.md", "event sourcing and event logs", 1.0),
                    doc("b.md", "sourdough bread baking", 1.0),
                ],
                &provider,
                32,
            )
            .await;

        let query = provider.embed("event sourcing").await.unwrap();
        let hits = store.search(&query, 10);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].path, "a.md");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn round_trips_through_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".lodestone/embeddings.json");

        let mut store = EmbeddingStore::default();
        store
            .update(&[doc("a.md", "alpha", 1.0)], &MockProvider::new(), 32)
            .await;
        store.save(&path).unwrap();

        let loaded = EmbeddingStore::load_existing(&path).unwrap();
        assert_eq!(loaded.count, 1);
        assert_eq!(loaded.embeddings["a.md"].vector, store.embeddings["a.md"].vector);
    }

    #[test]
    fn missing_store_loads_empty() {
        let store = EmbeddingStore::load(Path::new("/nonexistent/embeddings.json"));
        assert!(store.is_empty());
        assert!(store.model.is_none());
    }

    #[test]
    fn missing_store_is_actionable_for_queries() {
        let err = EmbeddingStore::load_existing(Path::new("/nonexistent/embeddings.json"))
            .unwrap_err();
        assert!(matches!(err, EmbedError::StoreMissing(_)));
    }
}
