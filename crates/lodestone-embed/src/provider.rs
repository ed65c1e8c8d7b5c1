//! Embedding provider abstraction
//!
//! The core is indifferent to how vectors are computed: anything with
//! an `encode(text) -> vector` capability works. The Ollama provider
//! covers the common local-model case; the mock provider gives tests a
//! deterministic stand-in.

use crate::error::{EmbedError, EmbedResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Trait for embedding providers
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str) -> EmbedResult<Vec<f32>>;

    /// Generate embeddings for multiple texts. The default
    /// implementation loops over [`EmbeddingProvider::embed`].
    async fn embed_batch(&self, texts: &[String]) -> EmbedResult<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Model name, used for store invalidation
    fn model(&self) -> &str;
}

/// Ollama embedding provider (`POST /api/embeddings`).
pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaResponse {
    embedding: Vec<f32>,
}

impl OllamaProvider {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> EmbedResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    async fn embed(&self, text: &str) -> EmbedResult<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&OllamaRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EmbedError::Provider(format!(
                "{url} returned {}",
                response.status()
            )));
        }

        let body: OllamaResponse = response.json().await?;
        if body.embedding.is_empty() {
            return Err(EmbedError::Provider("empty embedding returned".to_string()));
        }
        debug!(model = %self.model, dims = body.embedding.len(), "Embedded text");
        Ok(body.embedding)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Deterministic provider for tests: hashes character trigrams into a
/// small fixed-dimension vector, so identical texts embed identically
/// and related texts overlap.
pub struct MockProvider {
    model: String,
    dimensions: usize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_dimensions(16)
    }

    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            model: "mock-embed".to_string(),
            dimensions,
        }
    }

    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            dimensions: 16,
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockProvider {
    async fn embed(&self, text: &str) -> EmbedResult<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimensions];
        let chars: Vec<char> = text.to_lowercase().chars().collect();
        for window in chars.windows(3) {
            let mut hash: u64 = 1469598103934665603;
            for c in window {
                hash ^= *c as u64;
                hash = hash.wrapping_mul(1099511628211);
            }
            vector[(hash % self.dimensions as u64) as usize] += 1.0;
        }
        Ok(vector)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// A provider that always fails, for degradation tests.
pub struct FailingProvider;

#[async_trait]
impl EmbeddingProvider for FailingProvider {
    async fn embed(&self, _text: &str) -> EmbedResult<Vec<f32>> {
        Err(EmbedError::Provider("provider unavailable".to_string()))
    }

    fn model(&self) -> &str {
        "failing"
    }
}
