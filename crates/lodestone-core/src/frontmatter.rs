//! Forgiving frontmatter parsing
//!
//! Notes start with a `---` delimited YAML-ish header. We deliberately
//! do not pull in a YAML parser: the original vault format only ever
//! uses scalar fields, inline lists (`tags: [a, b]`) and block lists
//! (`tags:` followed by `- item` lines), and a malformed header must
//! degrade to "field absent", never to a parse error that drops the
//! whole document.

use crate::types::{Classification, RelationKind, TypedRelation};
use crate::wikilinks;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Header delimiter: content must start with `---`, header ends at the
/// next `---` on its own line.
static HEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---[ \t]*\n(.*?)\n---[ \t]*(\n|\z)").expect("header regex"));

/// Scalar fields the typed structure knows about.
const SCALAR_FIELDS: [&str; 7] = [
    "title",
    "type",
    "created",
    "classification",
    "verified",
    "status",
    "encrypted",
];

static SCALAR_REGEXES: LazyLock<HashMap<&'static str, Regex>> = LazyLock::new(|| {
    SCALAR_FIELDS
        .iter()
        .map(|field| {
            let re = Regex::new(&format!(r"(?m)^{field}\s*:\s*(.+)$")).expect("scalar regex");
            (*field, re)
        })
        .collect()
});

static TAGS_INLINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^tags\s*:\s*\[([^\]]*)\]").expect("tags inline regex"));

static TAGS_BLOCK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^tags\s*:\s*$").expect("tags block regex"));

static RELATIONSHIPS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^relationships\s*:\s*$").expect("relationships regex"));

/// Relationship kind names the scanner recognizes, mirroring
/// [`RelationKind::KNOWN`].
const KIND_NAMES: [&str; 8] = [
    "references",
    "depends-on",
    "supersedes",
    "contradicts",
    "supports",
    "implements",
    "extends",
    "inspired-by",
];

/// Per-kind regexes for the two supported relationship layouts.
static KIND_REGEXES: LazyLock<HashMap<&'static str, (Regex, Regex)>> = LazyLock::new(|| {
    KIND_NAMES
        .iter()
        .map(|name| {
            let inline =
                Regex::new(&format!(r"(?m)^\s+{name}\s*:\s*\[(.+)\]\s*$")).expect("inline regex");
            let block = Regex::new(&format!(r"(?m)^\s+{name}\s*:\s*$")).expect("block regex");
            (*name, (inline, block))
        })
        .collect()
});

/// Strongly-typed view of a note's metadata header.
///
/// Every field is optional in the source; parsing failures surface as
/// absent fields rather than errors.
#[derive(Debug, Clone, Default)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub note_type: Option<String>,
    pub created: Option<String>,
    pub classification: Classification,
    pub tags: Vec<String>,
    pub verified: Option<String>,
    pub status: Option<String>,
    pub encrypted: bool,
    pub relationships: Vec<TypedRelation>,
    /// Raw header text, kept so callers can scan it for wikilinks
    /// (e.g. `project: "[[Project - X]]"`).
    pub raw: String,
}

/// Split content into a parsed header and the body. Content without a
/// well-formed header yields an empty [`Frontmatter`] and the full text
/// as body.
pub fn parse(content: &str) -> (Frontmatter, &str) {
    let Some(caps) = HEADER_REGEX.captures(content) else {
        return (Frontmatter::default(), content);
    };

    let yaml = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let body = &content[caps.get(0).map(|m| m.end()).unwrap_or(0)..];

    let fm = Frontmatter {
        title: scalar(yaml, "title"),
        note_type: scalar(yaml, "type"),
        created: scalar(yaml, "created"),
        classification: Classification::parse_or_default(scalar(yaml, "classification").as_deref()),
        tags: list(yaml, "tags"),
        verified: scalar(yaml, "verified"),
        status: scalar(yaml, "status"),
        encrypted: matches!(scalar(yaml, "encrypted").as_deref(), Some("true") | Some("True")),
        relationships: relationships(yaml),
        raw: yaml.to_string(),
    };

    (fm, body)
}

/// Extract a scalar field. Quotes are stripped; `null`, `~` and the
/// empty string all mean absent.
pub fn scalar(yaml: &str, field: &str) -> Option<String> {
    let re = SCALAR_REGEXES.get(field)?;
    let caps = re.captures(yaml)?;
    let value = unquote(caps.get(1)?.as_str().trim());
    match value {
        "" | "null" | "~" => None,
        v => Some(v.to_string()),
    }
}

/// Extract the `tags` list, accepting both inline and block layouts.
pub fn list(yaml: &str, field: &str) -> Vec<String> {
    debug_assert_eq!(field, "tags", "only tags uses list layout");

    if let Some(caps) = TAGS_INLINE_REGEX.captures(yaml) {
        return caps[1]
            .split(',')
            .map(|item| unquote(item.trim()).to_string())
            .filter(|item| !item.is_empty() && item != "null" && item != "~")
            .collect();
    }

    if let Some(m) = TAGS_BLOCK_REGEX.find(yaml) {
        let mut items = Vec::new();
        for line in yaml[m.end()..].lines() {
            let stripped = line.trim();
            if let Some(item) = stripped.strip_prefix("- ") {
                items.push(unquote(item.trim()).to_string());
            } else if !stripped.is_empty() && !stripped.starts_with('#') {
                break;
            }
        }
        return items;
    }

    Vec::new()
}

/// Extract typed relationship declarations.
///
/// Two layouts are accepted under a `relationships:` key:
///
/// ```yaml
/// relationships:
///   depends-on: ["[[Decision - Cloud Provider Selection]]"]
///   references:
///     - "[[Concept - Event Sourcing]]"
/// ```
///
/// Targets that are not wikilinks are ignored.
pub fn relationships(yaml: &str) -> Vec<TypedRelation> {
    let Some(m) = RELATIONSHIPS_REGEX.find(yaml) else {
        return Vec::new();
    };
    let remaining = &yaml[m.end()..];

    let mut out = Vec::new();
    for kind in RelationKind::KNOWN {
        let Some((inline_re, block_re)) = KIND_REGEXES.get(kind.as_str()) else {
            continue;
        };

        if let Some(caps) = inline_re.captures(remaining) {
            for target in wikilinks::targets(&caps[1]) {
                out.push(TypedRelation {
                    kind: kind.clone(),
                    target,
                });
            }
        }

        if let Some(m) = block_re.find(remaining) {
            for line in remaining[m.end()..].lines() {
                let stripped = line.trim();
                if stripped.starts_with("- ") {
                    if let Some(target) = wikilinks::targets(stripped).into_iter().next() {
                        out.push(TypedRelation {
                            kind: kind.clone(),
                            target,
                        });
                    }
                } else if !stripped.is_empty() && !stripped.starts_with('#') && !stripped.starts_with('-') {
                    break;
                }
            }
        }
    }

    out
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && ((bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\''))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalar_fields() {
        let content = "---\ntitle: \"My Note\"\ntype: Concept\nclassification: confidential\n---\nbody text\n";
        let (fm, body) = parse(content);
        assert_eq!(fm.title.as_deref(), Some("My Note"));
        assert_eq!(fm.note_type.as_deref(), Some("Concept"));
        assert_eq!(fm.classification, Classification::Confidential);
        assert_eq!(body, "body text\n");
    }

    #[test]
    fn missing_header_yields_defaults() {
        let content = "just a body, no header";
        let (fm, body) = parse(content);
        assert!(fm.title.is_none());
        assert_eq!(fm.classification, Classification::Personal);
        assert_eq!(body, content);
    }

    #[test]
    fn header_must_open_the_file() {
        let content = "preamble\n---\ntitle: Nope\n---\nbody";
        let (fm, body) = parse(content);
        assert!(fm.title.is_none());
        assert_eq!(body, content);
    }

    #[test]
    fn inline_and_block_tags() {
        let inline = "tags: [rust, search, graphs]";
        assert_eq!(list(inline, "tags"), vec!["rust", "search", "graphs"]);

        let block = "tags:\n  - rust\n  - 'search'\nstatus: active";
        assert_eq!(list(block, "tags"), vec!["rust", "search"]);
    }

    #[test]
    fn null_values_are_absent() {
        assert_eq!(scalar("title: null", "title"), None);
        assert_eq!(scalar("title: ~", "title"), None);
        assert_eq!(scalar("status: active", "status"), Some("active".to_string()));
    }

    #[test]
    fn relationships_inline_form() {
        let yaml = "relationships:\n  depends-on: [\"[[Decision - Cloud]]\", \"[[Concept - CQRS]]\"]\n";
        let rels = relationships(yaml);
        assert_eq!(rels.len(), 2);
        assert_eq!(rels[0].kind, RelationKind::DependsOn);
        assert_eq!(rels[0].target, "Decision - Cloud");
        assert_eq!(rels[1].target, "Concept - CQRS");
    }

    #[test]
    fn relationships_block_form() {
        let yaml = "relationships:\n  references:\n    - \"[[Concept - Event Sourcing]]\"\n    - \"[[Concept - Sagas]]\"\n";
        let rels = relationships(yaml);
        assert_eq!(rels.len(), 2);
        assert!(rels.iter().all(|r| r.kind == RelationKind::References));
    }

    #[test]
    fn malformed_relationships_are_skipped() {
        let yaml = "relationships:\n  depends-on: not-a-wikilink\n";
        assert!(relationships(yaml).is_empty());
    }

    #[test]
    fn encrypted_flag() {
        let (fm, _) = parse("---\nencrypted: true\n---\nx");
        assert!(fm.encrypted);
        let (fm, _) = parse("---\nencrypted: false\n---\nx");
        assert!(!fm.encrypted);
    }
}
