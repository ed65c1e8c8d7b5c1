//! Vault walking and document loading

use crate::error::{CoreError, CoreResult};
use crate::frontmatter;
use crate::types::Document;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Directories never descended into: VCS, editor/tool state, build
/// caches, and our own data directory.
pub const SKIP_DIRS: [&str; 10] = [
    ".git",
    ".obsidian",
    ".claude",
    ".lodestone",
    ".graph",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "target",
];

/// Designated directory for secret material. Skipped by the index
/// builders; the graph builder opts in so link structure stays whole.
pub const SECRET_DIR: &str = "secret";

/// Files excluded by name regardless of location.
pub const SKIP_FILES: [&str; 2] = [".DS_Store", "Thumbs.db"];

/// Walks a vault directory and loads every indexable document.
///
/// The root is explicit configuration; nothing in this crate discovers
/// it by scanning parent directories.
#[derive(Debug, Clone)]
pub struct VaultWalker {
    root: PathBuf,
    include_secret_dir: bool,
}

impl VaultWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include_secret_dir: false,
        }
    }

    /// Descend into the designated secret directory as well. Used by
    /// the graph builder, which flags secret documents instead of
    /// dropping them.
    pub fn include_secret_dir(mut self) -> Self {
        self.include_secret_dir = true;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every indexable document under the root, sorted by path.
    ///
    /// Unreadable files are skipped with a warning; the walk itself
    /// only fails if the root is inaccessible.
    pub fn collect(&self) -> CoreResult<Vec<Document>> {
        let mut documents = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.file_type().is_dir() {
                    !self.is_skipped_dir(entry.file_name().to_string_lossy().as_ref())
                } else {
                    true
                }
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "Skipping unreadable vault entry");
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.is_indexable_file(entry.path()) {
                continue;
            }

            match self.load(entry.path()) {
                Ok(doc) => documents.push(doc),
                Err(err) => warn!(path = ?entry.path(), error = %err, "Skipping unreadable note"),
            }
        }

        documents.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(count = documents.len(), root = ?self.root, "Collected vault documents");
        Ok(documents)
    }

    /// Load and parse a single note.
    pub fn load(&self, path: &Path) -> CoreResult<Document> {
        let rel = path
            .strip_prefix(&self.root)
            .map_err(|_| CoreError::OutsideVault(path.display().to_string()))?;
        let rel_path = rel.to_string_lossy().replace('\\', "/");

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let content = std::fs::read_to_string(path)?;
        let metadata = std::fs::metadata(path)?;
        // Microsecond resolution: nanosecond tails sit below f64
        // precision at epoch magnitude and can jitter between stats of
        // an untouched file, which would defeat the freshness skip.
        let mtime = metadata
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as f64 / 1e6)
            .unwrap_or(0.0);

        let (fm, body) = frontmatter::parse(&content);

        Ok(Document {
            title: fm.title.unwrap_or_else(|| stem.clone()),
            path: rel_path,
            stem,
            note_type: fm.note_type,
            classification: fm.classification,
            tags: fm.tags,
            created: fm.created,
            verified: fm.verified,
            status: fm.status,
            encrypted: fm.encrypted,
            relationships: fm.relationships,
            raw_frontmatter: fm.raw,
            body: body.to_string(),
            mtime,
        })
    }

    fn is_skipped_dir(&self, name: &str) -> bool {
        if SKIP_DIRS.contains(&name) {
            return true;
        }
        name == SECRET_DIR && !self.include_secret_dir
    }

    fn is_indexable_file(&self, path: &Path) -> bool {
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            return false;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        !SKIP_FILES.contains(&name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Classification;
    use std::fs;
    use tempfile::TempDir;

    fn write_note(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn collects_markdown_only() {
        let tmp = TempDir::new().unwrap();
        write_note(tmp.path(), "a.md", "# A");
        write_note(tmp.path(), "b.txt", "not markdown");
        write_note(tmp.path(), "sub/c.md", "# C");

        let docs = VaultWalker::new(tmp.path()).collect().unwrap();
        let paths: Vec<_> = docs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["a.md", "sub/c.md"]);
    }

    #[test]
    fn skips_excluded_directories() {
        let tmp = TempDir::new().unwrap();
        write_note(tmp.path(), "keep.md", "# Keep");
        write_note(tmp.path(), ".git/config.md", "# Hidden");
        write_note(tmp.path(), "node_modules/dep.md", "# Dep");
        write_note(tmp.path(), "secret/key.md", "# Key");

        let docs = VaultWalker::new(tmp.path()).collect().unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].path, "keep.md");
    }

    #[test]
    fn secret_dir_opt_in() {
        let tmp = TempDir::new().unwrap();
        write_note(tmp.path(), "keep.md", "# Keep");
        write_note(tmp.path(), "secret/key.md", "# Key");

        let docs = VaultWalker::new(tmp.path())
            .include_secret_dir()
            .collect()
            .unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn parses_frontmatter_into_document() {
        let tmp = TempDir::new().unwrap();
        write_note(
            tmp.path(),
            "note.md",
            "---\ntitle: Real Title\ntype: Concept\nclassification: secret\ntags: [x, y]\n---\nBody here.\n",
        );

        let docs = VaultWalker::new(tmp.path()).collect().unwrap();
        let doc = &docs[0];
        assert_eq!(doc.title, "Real Title");
        assert_eq!(doc.note_type.as_deref(), Some("Concept"));
        assert_eq!(doc.classification, Classification::Secret);
        assert_eq!(doc.tags, vec!["x", "y"]);
        assert_eq!(doc.body.trim(), "Body here.");
        assert!(doc.mtime > 0.0);
    }

    #[test]
    fn mtime_token_is_stable_across_walks() {
        let tmp = TempDir::new().unwrap();
        write_note(tmp.path(), "a.md", "# A");

        let first = VaultWalker::new(tmp.path()).collect().unwrap()[0].mtime;
        let second = VaultWalker::new(tmp.path()).collect().unwrap()[0].mtime;

        // Re-walking an untouched file must yield the identical token,
        // or every rebuild would reindex and re-embed it
        assert_eq!(first, second);
        assert!(first > 0.0);
    }

    #[test]
    fn title_defaults_to_stem() {
        let tmp = TempDir::new().unwrap();
        write_note(tmp.path(), "Untitled Note.md", "no header");

        let docs = VaultWalker::new(tmp.path()).collect().unwrap();
        assert_eq!(docs[0].title, "Untitled Note");
        assert_eq!(docs[0].stem, "Untitled Note");
    }
}
