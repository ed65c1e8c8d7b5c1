//! Document, classification and relationship types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sensitivity tier controlling indexing eligibility.
///
/// Ordered by increasing sensitivity. `Secret` documents are never
/// written to the lexical or vector indexes and never appear in search
/// results; they still become graph nodes so link structure stays
/// complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Public,
    Personal,
    Confidential,
    Secret,
}

impl Classification {
    /// Parse a frontmatter value, falling back to `Personal` for
    /// anything unrecognized. Malformed metadata is never an error.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("public") => Self::Public,
            Some("confidential") => Self::Confidential,
            Some("secret") => Self::Secret,
            _ => Self::Personal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Personal => "personal",
            Self::Confidential => "confidential",
            Self::Secret => "secret",
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, Self::Secret)
    }
}

impl Default for Classification {
    fn default() -> Self {
        Self::Personal
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic kind of a typed relationship declared in frontmatter.
///
/// The vocabulary is closed; kinds outside it parse into
/// [`RelationKind::Other`] and round-trip through serialization, but
/// the frontmatter scanner only looks for the eight known kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationKind {
    References,
    DependsOn,
    Supersedes,
    Contradicts,
    Supports,
    Implements,
    Extends,
    InspiredBy,
    /// Extension point for vocabularies beyond the built-in set
    #[serde(untagged)]
    Other(String),
}

impl RelationKind {
    /// The kinds the frontmatter scanner recognizes.
    pub const KNOWN: [RelationKind; 8] = [
        RelationKind::References,
        RelationKind::DependsOn,
        RelationKind::Supersedes,
        RelationKind::Contradicts,
        RelationKind::Supports,
        RelationKind::Implements,
        RelationKind::Extends,
        RelationKind::InspiredBy,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::References => "references",
            Self::DependsOn => "depends-on",
            Self::Supersedes => "supersedes",
            Self::Contradicts => "contradicts",
            Self::Supports => "supports",
            Self::Implements => "implements",
            Self::Extends => "extends",
            Self::InspiredBy => "inspired-by",
            Self::Other(s) => s,
        }
    }
}

impl std::str::FromStr for RelationKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "references" => Self::References,
            "depends-on" => Self::DependsOn,
            "supersedes" => Self::Supersedes,
            "contradicts" => Self::Contradicts,
            "supports" => Self::Supports,
            "implements" => Self::Implements,
            "extends" => Self::Extends,
            "inspired-by" => Self::InspiredBy,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed relationship declaration, target still unresolved link text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedRelation {
    pub kind: RelationKind,
    pub target: String,
}

/// One indexable unit of content: a markdown file with optional
/// frontmatter and a body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier: path relative to the vault root
    pub path: String,
    /// Filename without extension, used for link resolution
    pub stem: String,
    /// Title from frontmatter, defaulting to the file stem
    pub title: String,
    /// Free-form category tag (`type:` in frontmatter)
    pub note_type: Option<String>,
    pub classification: Classification,
    pub tags: Vec<String>,
    pub created: Option<String>,
    pub verified: Option<String>,
    pub status: Option<String>,
    /// Body is ciphertext managed by an external tool; index metadata only
    pub encrypted: bool,
    /// Typed relationship declarations, targets unresolved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<TypedRelation>,
    /// Raw header text, scanned for wikilinks alongside the body
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_frontmatter: String,
    pub body: String,
    /// Freshness token: modification time in seconds since the epoch,
    /// at microsecond resolution
    pub mtime: f64,
}

impl Document {
    pub fn is_secret(&self) -> bool {
        self.classification.is_secret()
    }

    /// Body text as it should appear in indexes. Encrypted notes expose
    /// a placeholder so no ciphertext (or accidental plaintext) lands in
    /// the search index.
    pub fn indexed_body(&self) -> &str {
        if self.encrypted {
            "[ENCRYPTED]"
        } else {
            &self.body
        }
    }

    /// Tags joined for denormalized storage in the lexical index.
    pub fn tags_joined(&self) -> String {
        self.tags.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn classification_ordering_tracks_sensitivity() {
        assert!(Classification::Public < Classification::Personal);
        assert!(Classification::Personal < Classification::Confidential);
        assert!(Classification::Confidential < Classification::Secret);
    }

    #[test]
    fn classification_parse_is_forgiving() {
        assert_eq!(
            Classification::parse_or_default(Some("secret")),
            Classification::Secret
        );
        assert_eq!(
            Classification::parse_or_default(Some("bogus")),
            Classification::Personal
        );
        assert_eq!(
            Classification::parse_or_default(None),
            Classification::Personal
        );
    }

    #[test]
    fn relation_kind_round_trips() {
        for kind in RelationKind::KNOWN {
            let parsed = RelationKind::from_str(kind.as_str()).unwrap();
            assert_eq!(parsed, kind);
        }
        let other = RelationKind::from_str("mentions").unwrap();
        assert_eq!(other, RelationKind::Other("mentions".to_string()));
    }

    #[test]
    fn encrypted_body_is_masked() {
        let doc = Document {
            path: "a.md".into(),
            stem: "a".into(),
            title: "a".into(),
            note_type: None,
            classification: Classification::Personal,
            tags: vec![],
            created: None,
            verified: None,
            status: None,
            encrypted: true,
            relationships: vec![],
            raw_frontmatter: String::new(),
            body: "cipher".into(),
            mtime: 0.0,
        };
        assert_eq!(doc.indexed_body(), "[ENCRYPTED]");
    }
}
