//! BM25 search over the FTS5 projection
//!
//! The engine's MATCH grammar treats several characters as operators;
//! user queries are sanitized before they reach it, and a query that
//! still trips a syntax error degrades to an alphanumeric-only retry
//! rather than failing the search.

use crate::error::IndexResult;
use crate::indexer::LexicalIndex;
use lodestone_core::Classification;
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::Connection;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

static FTS_OPERATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[{}()\[\]^~]").expect("operator regex"));

static NON_WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("non-word regex"));

/// Optional restrictions on a lexical search.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Restrict to one note type
    pub note_type: Option<String>,
    /// Classifications to exclude. Secret is excluded unconditionally
    /// whether or not it appears here.
    pub exclude_classifications: Vec<Classification>,
}

/// One ranked lexical search result.
#[derive(Debug, Clone, Serialize)]
pub struct LexicalHit {
    pub path: String,
    pub title: String,
    #[serde(rename = "type")]
    pub note_type: Option<String>,
    pub tags: Option<String>,
    pub classification: String,
    pub created: Option<String>,
    pub status: Option<String>,
    pub verified: Option<String>,
    /// Magnitude of the FTS5 BM25 rank (higher is better)
    pub bm25_score: f64,
    /// Match context with hits wrapped in `**`
    pub snippet: String,
}

impl LexicalIndex {
    /// Ranked BM25 search. Secret rows can never match (they are never
    /// inserted), and the classification filter excludes secret again
    /// at the query layer regardless of caller input.
    pub fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
    ) -> IndexResult<Vec<LexicalHit>> {
        let fts_query = sanitize_query(query);
        if fts_query.is_empty() {
            return Ok(Vec::new());
        }

        let mut exclude: Vec<&str> = filters
            .exclude_classifications
            .iter()
            .map(|c| c.as_str())
            .collect();
        if !exclude.contains(&Classification::Secret.as_str()) {
            exclude.push(Classification::Secret.as_str());
        }

        self.pool().with_connection(|conn| {
            match run_match(conn, &fts_query, filters, &exclude, limit) {
                Ok(hits) => Ok(hits),
                Err(rusqlite::Error::SqliteFailure(..)) => {
                    // FTS5 syntax error: degrade to a simplified query
                    let simplified = NON_WORD_REGEX.replace_all(query, "").trim().to_string();
                    debug!(original = query, simplified, "FTS query fell back");
                    if simplified.is_empty() {
                        return Ok(Vec::new());
                    }
                    match run_match(conn, &simplified, filters, &exclude, limit) {
                        Ok(hits) => Ok(hits),
                        Err(rusqlite::Error::SqliteFailure(..)) => Ok(Vec::new()),
                        Err(err) => Err(err.into()),
                    }
                }
                Err(err) => Err(err.into()),
            }
        })
    }
}

fn run_match(
    conn: &Connection,
    fts_query: &str,
    filters: &SearchFilters,
    exclude: &[&str],
    limit: usize,
) -> Result<Vec<LexicalHit>, rusqlite::Error> {
    let mut sql = String::from(
        "SELECT n.path, n.title, n.type, n.tags, n.classification,
                n.created, n.status, n.verified,
                f.rank AS bm25_rank,
                snippet(fts_notes, 3, '>>>', '<<<', '...', 40) AS snippet
         FROM fts_notes f
         JOIN notes n ON n.id = f.rowid
         WHERE fts_notes MATCH ?",
    );
    let mut params: Vec<Value> = vec![Value::from(fts_query.to_string())];

    if let Some(note_type) = &filters.note_type {
        sql.push_str(" AND n.type = ?");
        params.push(Value::from(note_type.clone()));
    }

    if !exclude.is_empty() {
        let placeholders = vec!["?"; exclude.len()].join(", ");
        sql.push_str(&format!(" AND n.classification NOT IN ({placeholders})"));
        params.extend(exclude.iter().map(|c| Value::from(c.to_string())));
    }

    sql.push_str(" ORDER BY f.rank LIMIT ?");
    params.push(Value::from(limit as i64));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params), |row| {
        Ok(LexicalHit {
            path: row.get(0)?,
            title: row.get(1)?,
            note_type: row.get(2)?,
            tags: row.get(3)?,
            classification: row.get(4)?,
            created: row.get(5)?,
            status: row.get(6)?,
            verified: row.get(7)?,
            bm25_score: row.get::<_, f64>(8)?.abs(),
            snippet: clean_snippet(row.get::<_, Option<String>>(9)?),
        })
    })?;

    rows.collect()
}

/// Sanitize a user query for the FTS5 MATCH grammar.
///
/// Quoted phrases pass through untouched; otherwise operator
/// characters are stripped and boolean keywords dropped, leaving
/// space-separated terms (implicit AND).
pub fn sanitize_query(query: &str) -> String {
    let query = query.trim();
    if query.starts_with('"') && query.ends_with('"') && query.len() >= 2 {
        return query.to_string();
    }

    let cleaned = FTS_OPERATOR_REGEX.replace_all(query, "");
    let terms: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|t| {
            !matches!(
                t.to_uppercase().as_str(),
                "AND" | "OR" | "NOT" | "NEAR"
            )
        })
        .collect();

    terms.join(" ")
}

/// Map FTS5 snippet markers to display emphasis.
fn clean_snippet(snippet: Option<String>) -> String {
    snippet
        .unwrap_or_default()
        .replace(">>>", "**")
        .replace("<<<", "**")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodestone_core::types::Classification;
    use lodestone_core::Document;

    fn doc(path: &str, title: &str, body: &str) -> Document {
        Document {
            path: path.to_string(),
            stem: path.trim_end_matches(".md").to_string(),
            title: title.to_string(),
            note_type: Some("Concept".to_string()),
            classification: Classification::Personal,
            tags: vec![],
            created: None,
            verified: None,
            status: None,
            encrypted: false,
            relationships: vec![],
            raw_frontmatter: String::new(),
            body: body.to_string(),
            mtime: 1.0,
        }
    }

    fn seeded_index() -> LexicalIndex {
        let index = LexicalIndex::memory().unwrap();
        index
            .index_all(&[
                doc("events.md", "Event Sourcing", "Append-only log of events, with events replayed into projections."),
                doc("queues.md", "Message Queues", "Broker-based delivery of events."),
                doc("cooking.md", "Sourdough", "Sourdough needs flour, water, salt, patience."),
            ])
            .unwrap();
        index
    }

    #[test]
    fn finds_matching_documents_ranked() {
        let index = seeded_index();
        let hits = index.search("events", &SearchFilters::default(), 10).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].bm25_score >= hits[1].bm25_score);
        assert!(hits.iter().all(|h| h.path != "cooking.md"));
    }

    #[test]
    fn snippet_highlights_matches() {
        let index = seeded_index();
        let hits = index.search("sourdough", &SearchFilters::default(), 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].snippet.contains("**Sourdough**"));
    }

    #[test]
    fn type_filter_restricts_results() {
        let index = seeded_index();
        let filters = SearchFilters {
            note_type: Some("Decision".to_string()),
            ..Default::default()
        };
        assert!(index.search("events", &filters, 10).unwrap().is_empty());
    }

    #[test]
    fn classification_exclusion_applies() {
        let index = LexicalIndex::memory().unwrap();
        let mut confidential = doc("c.md", "Budget", "Confidential numbers");
        confidential.classification = Classification::Confidential;
        index.index_all(&[confidential]).unwrap();

        let filters = SearchFilters {
            exclude_classifications: vec![Classification::Confidential],
            ..Default::default()
        };
        assert!(index.search("budget", &filters, 10).unwrap().is_empty());
        assert_eq!(
            index.search("budget", &SearchFilters::default(), 10).unwrap().len(),
            1
        );
    }

    #[test]
    fn operator_characters_are_sanitized() {
        assert_eq!(sanitize_query("hello (world)"), "hello world");
        assert_eq!(sanitize_query("a AND b"), "a b");
        assert_eq!(sanitize_query("term^2 ~fuzzy"), "term2 fuzzy");
        assert_eq!(sanitize_query("\"exact phrase\""), "\"exact phrase\"");
    }

    #[test]
    fn broken_syntax_degrades_instead_of_failing() {
        let index = seeded_index();
        // Unbalanced quote is an FTS5 syntax error; the simplified
        // retry strips it and matches
        let hits = index.search("ev\"ents", &SearchFilters::default(), 10).unwrap();
        assert!(!hits.is_empty());
    }

    #[test]
    fn empty_query_yields_no_results() {
        let index = seeded_index();
        assert!(index.search("", &SearchFilters::default(), 10).unwrap().is_empty());
        assert!(index.search("()", &SearchFilters::default(), 10).unwrap().is_empty());
    }
}
