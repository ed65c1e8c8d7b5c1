//! Text preparation for embedding
//!
//! Combines metadata and a bounded excerpt of the body: code blocks
//! stripped, wikilinks unwrapped, blank runs collapsed, capped at
//! ~3000 characters so one pathological note cannot dominate batch
//! time.

use lodestone_core::{wikilinks, Document};

/// Body excerpt cap in characters.
const BODY_CAP: usize = 3000;

/// Build the text representation handed to the embedding provider.
pub fn prepare_text(doc: &Document) -> String {
    let mut parts = Vec::new();
    parts.push(format!("Title: {}", doc.title));
    if let Some(note_type) = &doc.note_type {
        parts.push(format!("Type: {note_type}"));
    }
    if !doc.tags.is_empty() {
        parts.push(format!("Tags: {}", doc.tags.join(", ")));
    }

    let cleaned = wikilinks::unwrap(&wikilinks::strip_code_blocks(doc.indexed_body()));
    parts.push(truncate_chars(&cleaned, BODY_CAP).to_string());

    parts.join("\n")
}

/// Truncate on a character boundary.
fn truncate_chars(text: &str, cap: usize) -> &str {
    match text.char_indices().nth(cap) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
