//! Incremental index maintenance

use crate::connection::IndexPool;
use crate::error::IndexResult;
use lodestone_core::Document;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// Outcome of one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexSummary {
    pub updated: usize,
    pub unchanged: usize,
    pub removed: usize,
    pub total: usize,
}

/// Index statistics for the stats surface.
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    pub total: usize,
    pub by_type: Vec<(String, usize)>,
    pub by_classification: Vec<(String, usize)>,
    pub encrypted: usize,
    pub last_built: Option<String>,
    pub size_bytes: u64,
}

/// The lexical index over vault documents.
#[derive(Clone)]
pub struct LexicalIndex {
    pool: IndexPool,
}

impl LexicalIndex {
    pub fn open(path: &Path) -> IndexResult<Self> {
        Ok(Self {
            pool: IndexPool::open(path)?,
        })
    }

    /// Open an existing index for queries; missing file is an error
    /// telling the caller to build first.
    pub fn open_existing(path: &Path) -> IndexResult<Self> {
        Ok(Self {
            pool: IndexPool::open_existing(path)?,
        })
    }

    pub fn memory() -> IndexResult<Self> {
        Ok(Self {
            pool: IndexPool::memory()?,
        })
    }

    pub(crate) fn pool(&self) -> &IndexPool {
        &self.pool
    }

    /// Insert or update one document's row.
    ///
    /// Returns `false` without touching the row when the stored
    /// freshness token is already current. Secret documents are
    /// actively removed if present and never inserted.
    pub fn index_document(&self, doc: &Document) -> IndexResult<bool> {
        self.pool.with_connection(|conn| index_into(conn, doc))
    }

    /// Index a whole batch inside one transaction, then reconcile
    /// deletions and refresh the FTS projection if anything changed.
    /// Either the whole batch commits or none of it does.
    pub fn index_all(&self, documents: &[Document]) -> IndexResult<IndexSummary> {
        let current: BTreeSet<String> = documents.iter().map(|d| d.path.clone()).collect();

        let mut summary = self.pool.with_connection_mut(|conn| {
            let tx = conn.transaction()?;
            let mut summary = IndexSummary::default();

            for doc in documents {
                if index_into(&tx, doc)? {
                    summary.updated += 1;
                    debug!(path = %doc.path, "Indexed");
                } else {
                    summary.unchanged += 1;
                }
            }

            summary.removed = remove_missing(&tx, &current)?;

            if summary.updated > 0 || summary.removed > 0 {
                tx.execute("INSERT INTO fts_notes(fts_notes) VALUES('rebuild')", [])?;
            }
            tx.execute(
                "INSERT OR REPLACE INTO meta (key, value) VALUES ('last_built', ?)",
                [chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()],
            )?;

            tx.commit()?;
            Ok(summary)
        })?;

        summary.total = self.count()?;
        info!(
            total = summary.total,
            updated = summary.updated,
            unchanged = summary.unchanged,
            removed = summary.removed,
            "Index build complete"
        );
        Ok(summary)
    }

    /// Remove rows for documents no longer present on disk.
    pub fn reconcile(&self, current: &BTreeSet<String>) -> IndexResult<usize> {
        self.pool
            .with_connection(|conn| remove_missing(conn, current))
    }

    pub fn count(&self) -> IndexResult<usize> {
        self.pool.with_connection(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;
            Ok(count as usize)
        })
    }

    pub fn stats(&self) -> IndexResult<IndexStats> {
        let size_bytes = self.pool.size_bytes()?;
        self.pool.with_connection(|conn| {
            let total: i64 = conn.query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?;

            let by_type = group_counts(
                conn,
                "SELECT COALESCE(type, 'unknown'), COUNT(*) FROM notes
                 GROUP BY type ORDER BY COUNT(*) DESC, type",
            )?;
            let by_classification = group_counts(
                conn,
                "SELECT classification, COUNT(*) FROM notes
                 GROUP BY classification ORDER BY COUNT(*) DESC, classification",
            )?;

            let encrypted: i64 = conn.query_row(
                "SELECT COUNT(*) FROM notes WHERE encrypted = 1",
                [],
                |row| row.get(0),
            )?;

            let last_built: Option<String> = conn
                .query_row(
                    "SELECT value FROM meta WHERE key = 'last_built'",
                    [],
                    |row| row.get(0),
                )
                .optional()?;

            Ok(IndexStats {
                total: total as usize,
                by_type,
                by_classification,
                encrypted: encrypted as usize,
                last_built,
                size_bytes,
            })
        })
    }
}

/// Upsert one document, honoring the freshness token and the secret
/// exclusion. Shared by the single-document and batch paths.
fn index_into(conn: &Connection, doc: &Document) -> IndexResult<bool> {
    if doc.is_secret() {
        conn.execute("DELETE FROM notes WHERE path = ?", [&doc.path])?;
        return Ok(false);
    }

    let stored_mtime: Option<f64> = conn
        .query_row(
            "SELECT mtime FROM notes WHERE path = ?",
            [&doc.path],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(stored) = stored_mtime {
        if stored >= doc.mtime {
            return Ok(false);
        }
    }

    conn.execute(
        "INSERT INTO notes (path, title, type, created, tags, classification,
                            encrypted, status, verified, content, mtime)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(path) DO UPDATE SET
             title=excluded.title, type=excluded.type, created=excluded.created,
             tags=excluded.tags, classification=excluded.classification,
             encrypted=excluded.encrypted, status=excluded.status,
             verified=excluded.verified, content=excluded.content,
             mtime=excluded.mtime",
        params![
            doc.path,
            doc.title,
            doc.note_type,
            doc.created,
            doc.tags_joined(),
            doc.classification.as_str(),
            doc.encrypted as i64,
            doc.status,
            doc.verified,
            doc.indexed_body(),
            doc.mtime,
        ],
    )?;

    Ok(true)
}

fn remove_missing(conn: &Connection, current: &BTreeSet<String>) -> IndexResult<usize> {
    let indexed: Vec<String> = {
        let mut stmt = conn.prepare("SELECT path FROM notes")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.filter_map(Result::ok).collect()
    };

    let mut removed = 0;
    for path in indexed {
        if !current.contains(&path) {
            conn.execute("DELETE FROM notes WHERE path = ?", [&path])?;
            removed += 1;
        }
    }
    Ok(removed)
}

fn group_counts(conn: &Connection, sql: &str) -> IndexResult<Vec<(String, usize)>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
    })?;
    Ok(rows.filter_map(Result::ok).collect())
}
