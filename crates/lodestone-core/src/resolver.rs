//! Link target resolution
//!
//! Maps wikilink text to a canonical note path. Resolution is a
//! best-effort heuristic: exact match against known file stems, then a
//! retry with each conventional type-name prefix prepended. Targets
//! that resolve to nothing are dropped by callers; broken links are a
//! query-time concern, not a build-time error.

use crate::types::Document;
use std::collections::HashMap;

/// Conventional type-name prefixes tried when an exact stem match
/// fails, so `[[Cloud Provider Selection]]` can reach
/// `Decision - Cloud Provider Selection.md`.
pub const TYPE_PREFIXES: [&str; 13] = [
    "Person - ",
    "System - ",
    "Concept - ",
    "Note - ",
    "Decision - ",
    "Meeting - ",
    "Task - ",
    "Project - ",
    "Resource - ",
    "Interaction - ",
    "ActionItem - ",
    "Daily - ",
    "Weblink - ",
];

/// Resolves wikilink text to canonical note paths.
#[derive(Debug, Clone, Default)]
pub struct LinkResolver {
    by_stem: HashMap<String, String>,
}

impl LinkResolver {
    /// Build a resolver over the given documents' stems.
    pub fn new(documents: &[Document]) -> Self {
        let by_stem = documents
            .iter()
            .map(|doc| (doc.stem.clone(), doc.path.clone()))
            .collect();
        Self { by_stem }
    }

    /// Resolve link text to a note path, or `None` if unresolvable.
    pub fn resolve(&self, target: &str) -> Option<&str> {
        let target = target.trim();
        if let Some(path) = self.by_stem.get(target) {
            return Some(path);
        }

        for prefix in TYPE_PREFIXES {
            if let Some(path) = self.by_stem.get(&format!("{prefix}{target}")) {
                return Some(path);
            }
        }

        None
    }

    pub fn len(&self) -> usize {
        self.by_stem.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_stem.is_empty()
    }
}
