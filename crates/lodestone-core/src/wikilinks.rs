//! Wikilink extraction
//!
//! Inline cross-references use Obsidian-style syntax:
//! - `[[Note Title]]` - basic link
//! - `[[Note Title|display text]]` - display alias (discarded)

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static WIKILINK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]|]+?)(?:\|[^\]]+?)?\]\]").expect("wikilink regex"));

static CODE_BLOCK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("code block regex"));

static BLANK_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank run regex"));

/// Extract wikilink targets in order of appearance, alias suffixes
/// stripped. Duplicates are kept; callers that need set semantics use
/// [`unique_targets`].
pub fn targets(text: &str) -> Vec<String> {
    WIKILINK_REGEX
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .collect()
}

/// Extract deduplicated wikilink targets. Two references to the same
/// target produce one entry, so edge materialization sees a set.
pub fn unique_targets(text: &str) -> BTreeSet<String> {
    targets(text).into_iter().collect()
}

/// Replace `[[Target|alias]]` and `[[Target]]` with the bare target
/// text, for embedding preparation.
pub fn unwrap(text: &str) -> String {
    WIKILINK_REGEX.replace_all(text, "$1").into_owned()
}

/// Remove fenced code blocks and collapse runs of blank lines.
pub fn strip_code_blocks(text: &str) -> String {
    let stripped = CODE_BLOCK_REGEX.replace_all(text, "");
    BLANK_RUN_REGEX.replace_all(&stripped, "\n\n").into_owned()
}
