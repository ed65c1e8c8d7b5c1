//! Reciprocal rank fusion
//!
//! Combines the independently ranked lexical and vector result lists
//! into one ordering. Each source contributes `1 / (k + rank + 1)` for
//! a 0-based rank with k = 60, so agreement between sources outweighs
//! a strong showing in either one alone. Graph centrality, when
//! available, adds a small hub boost scaled into the same range as a
//! top-rank RRF term.

use lodestone_core::config::FusionWeights;
use lodestone_embed::VectorHit;
use lodestone_index::LexicalHit;
use serde::Serialize;
use std::collections::BTreeMap;

/// RRF rank constant.
pub const RRF_K: f64 = 60.0;

/// Which tier produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    Lexical,
    Vector,
    Hybrid,
}

/// One ranked search result, from any tier.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub path: String,
    pub title: String,
    #[serde(rename = "type")]
    pub note_type: Option<String>,
    pub tags: Option<String>,
    pub classification: Option<String>,
    pub snippet: Option<String>,
    pub source: SearchSource,
    pub bm25_score: f64,
    pub vector_score: f32,
    /// Normalized node degree, 0 when no graph data was loaded
    pub graph_score: f64,
    /// Weighted RRF sum; 0 outside hybrid mode
    pub fusion_score: f64,
}

impl From<&LexicalHit> for SearchHit {
    fn from(hit: &LexicalHit) -> Self {
        Self {
            path: hit.path.clone(),
            title: hit.title.clone(),
            note_type: hit.note_type.clone(),
            tags: hit.tags.clone(),
            classification: Some(hit.classification.clone()),
            snippet: Some(hit.snippet.clone()),
            source: SearchSource::Lexical,
            bm25_score: hit.bm25_score,
            vector_score: 0.0,
            graph_score: 0.0,
            fusion_score: 0.0,
        }
    }
}

impl From<&VectorHit> for SearchHit {
    fn from(hit: &VectorHit) -> Self {
        Self {
            path: hit.path.clone(),
            title: hit.title.clone(),
            note_type: hit.note_type.clone(),
            tags: None,
            classification: None,
            snippet: None,
            source: SearchSource::Vector,
            bm25_score: 0.0,
            vector_score: hit.score,
            graph_score: 0.0,
            fusion_score: 0.0,
        }
    }
}

struct Fused {
    hit: SearchHit,
    lexical_rank: Option<usize>,
    vector_rank: Option<usize>,
}

fn rrf(rank: Option<usize>) -> f64 {
    match rank {
        Some(rank) => 1.0 / (RRF_K + rank as f64 + 1.0),
        None => 0.0,
    }
}

/// Fuse the two ranked lists, with an optional centrality boost.
///
/// When `centrality` is non-empty the three weights are renormalized
/// to sum to 1; otherwise only the lexical and vector weights apply,
/// unrenormalized. Ties sort stably by lexical rank, then vector rank.
pub fn fuse(
    lexical: &[LexicalHit],
    vector: &[VectorHit],
    centrality: &BTreeMap<String, f64>,
    weights: &FusionWeights,
) -> Vec<SearchHit> {
    let (w_lexical, w_vector, w_graph) = if centrality.is_empty() {
        (weights.lexical, weights.vector, 0.0)
    } else {
        let total = weights.lexical + weights.vector + weights.graph;
        (
            weights.lexical / total,
            weights.vector / total,
            weights.graph / total,
        )
    };

    let mut by_path: BTreeMap<&str, Fused> = BTreeMap::new();

    for (rank, hit) in lexical.iter().enumerate() {
        by_path.insert(
            &hit.path,
            Fused {
                hit: hit.into(),
                lexical_rank: Some(rank),
                vector_rank: None,
            },
        );
    }

    for (rank, hit) in vector.iter().enumerate() {
        match by_path.get_mut(hit.path.as_str()) {
            Some(entry) => {
                entry.vector_rank = Some(rank);
                entry.hit.vector_score = hit.score;
            }
            None => {
                by_path.insert(
                    &hit.path,
                    Fused {
                        hit: hit.into(),
                        lexical_rank: None,
                        vector_rank: Some(rank),
                    },
                );
            }
        }
    }

    let mut fused: Vec<Fused> = by_path
        .into_values()
        .map(|mut entry| {
            let graph_score = centrality.get(&entry.hit.path).copied().unwrap_or(0.0);
            entry.hit.graph_score = graph_score;
            entry.hit.fusion_score = w_lexical * rrf(entry.lexical_rank)
                + w_vector * rrf(entry.vector_rank)
                + w_graph * graph_score / (RRF_K + 1.0);
            entry.hit.source = SearchSource::Hybrid;
            entry
        })
        .collect();

    fused.sort_by(|a, b| {
        b.hit
            .fusion_score
            .total_cmp(&a.hit.fusion_score)
            .then_with(|| sort_rank(a.lexical_rank).cmp(&sort_rank(b.lexical_rank)))
            .then_with(|| sort_rank(a.vector_rank).cmp(&sort_rank(b.vector_rank)))
    });

    fused.into_iter().map(|entry| entry.hit).collect()
}

fn sort_rank(rank: Option<usize>) -> usize {
    rank.unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexical(path: &str) -> LexicalHit {
        LexicalHit {
            path: path.to_string(),
            title: path.to_string(),
            note_type: None,
            tags: None,
            classification: "personal".to_string(),
            created: None,
            status: None,
            verified: None,
            bm25_score: 1.0,
            snippet: String::new(),
        }
    }

    fn vector(path: &str, score: f32) -> VectorHit {
        VectorHit {
            path: path.to_string(),
            title: path.to_string(),
            note_type: None,
            score,
        }
    }

    fn paths(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|h| h.path.as_str()).collect()
    }

    #[test]
    fn doc_in_both_lists_ranks_first() {
        let lex = vec![lexical("a.md"), lexical("b.md")];
        let vec = vec![vector("b.md", 0.9), vector("c.md", 0.8)];

        let fused = fuse(&lex, &vec, &BTreeMap::new(), &FusionWeights::default());
        assert_eq!(paths(&fused), vec!["b.md", "a.md", "c.md"]);
    }

    #[test]
    fn both_lists_beat_one_list_at_same_rank() {
        let weights = FusionWeights::default();
        let both = fuse(
            &[lexical("a.md")],
            &[vector("a.md", 0.9)],
            &BTreeMap::new(),
            &weights,
        );
        let lexical_only = fuse(&[lexical("b.md")], &[], &BTreeMap::new(), &weights);

        assert!(both[0].fusion_score > lexical_only[0].fusion_score);
    }

    #[test]
    fn weights_apply_without_renormalization_when_no_centrality() {
        let fused = fuse(
            &[lexical("a.md")],
            &[],
            &BTreeMap::new(),
            &FusionWeights::default(),
        );
        let expected = 0.7 / 61.0;
        assert!((fused[0].fusion_score - expected).abs() < 1e-12);
    }

    #[test]
    fn centrality_renormalizes_weights_and_boosts_hubs() {
        let mut centrality = BTreeMap::new();
        centrality.insert("hub.md".to_string(), 1.0);
        centrality.insert("leaf.md".to_string(), 0.0);

        // Same lexical standing; only centrality differs
        let hub = fuse(&[lexical("hub.md")], &[], &centrality, &FusionWeights::default());
        let leaf = fuse(&[lexical("leaf.md")], &[], &centrality, &FusionWeights::default());

        let expected_leaf = (0.7 / 1.1) / 61.0;
        let expected_hub = expected_leaf + (0.1 / 1.1) / 61.0;
        assert!((leaf[0].fusion_score - expected_leaf).abs() < 1e-12);
        assert!((hub[0].fusion_score - expected_hub).abs() < 1e-12);
        assert!(hub[0].fusion_score > leaf[0].fusion_score);
        assert_eq!(hub[0].graph_score, 1.0);
    }

    #[test]
    fn single_list_docs_still_participate() {
        let fused = fuse(
            &[],
            &[vector("v.md", 0.5)],
            &BTreeMap::new(),
            &FusionWeights::default(),
        );
        assert_eq!(fused.len(), 1);
        assert!(fused[0].fusion_score > 0.0);
        assert_eq!(fused[0].vector_score, 0.5);
    }

    #[test]
    fn ties_break_by_lexical_then_vector_rank() {
        // Equal lexical and vector weights make rank-0 contributions tie
        let weights = FusionWeights {
            lexical: 0.5,
            vector: 0.5,
            graph: 0.1,
        };
        let fused = fuse(
            &[lexical("lex.md")],
            &[vector("vec.md", 0.9)],
            &BTreeMap::new(),
            &weights,
        );
        assert_eq!(paths(&fused), vec!["lex.md", "vec.md"]);
    }

    #[test]
    fn fused_hits_carry_both_scores() {
        let fused = fuse(
            &[lexical("a.md")],
            &[vector("a.md", 0.42)],
            &BTreeMap::new(),
            &FusionWeights::default(),
        );
        assert_eq!(fused[0].source, SearchSource::Hybrid);
        assert_eq!(fused[0].bm25_score, 1.0);
        assert_eq!(fused[0].vector_score, 0.42);
        assert!(fused[0].snippet.is_some());
    }
}
