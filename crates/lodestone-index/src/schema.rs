//! Schema management and migrations

use crate::error::{IndexError, IndexResult};
use rusqlite::Connection;
use tracing::{debug, info};

/// Schema version - increment when making schema changes
const SCHEMA_VERSION: i32 = 1;

/// Apply all pending migrations
pub fn apply_migrations(conn: &Connection) -> IndexResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current_version = get_current_version(conn)?;
    debug!(current_version, target_version = SCHEMA_VERSION, "Checking migrations");

    if current_version < SCHEMA_VERSION {
        info!(from = current_version, to = SCHEMA_VERSION, "Applying schema migrations");
        apply_migration_v1(conn)?;
    }

    Ok(())
}

fn get_current_version(conn: &Connection) -> IndexResult<i32> {
    let version: Option<i32> = conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })
        .unwrap_or(None);

    Ok(version.unwrap_or(0))
}

fn record_migration(conn: &Connection, version: i32) -> IndexResult<()> {
    conn.execute(
        "INSERT INTO schema_migrations (version) VALUES (?)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: notes table, meta table, FTS5 projection with sync
/// triggers.
fn apply_migration_v1(conn: &Connection) -> IndexResult<()> {
    conn.execute_batch(SCHEMA_V1)
        .map_err(|e| IndexError::Schema(format!("Failed to apply v1 schema: {e}")))?;
    record_migration(conn, 1)?;
    Ok(())
}

/// Initial schema SQL
const SCHEMA_V1: &str = r#"
-- One row per non-secret note, denormalized for search. mtime is the
-- freshness token used to skip unchanged notes on rebuild.
CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    path TEXT UNIQUE NOT NULL,
    title TEXT,
    type TEXT,
    created TEXT,
    tags TEXT,
    classification TEXT NOT NULL DEFAULT 'personal',
    encrypted INTEGER NOT NULL DEFAULT 0,
    status TEXT,
    verified TEXT,
    content TEXT,
    mtime REAL NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_notes_type ON notes(type);
CREATE INDEX IF NOT EXISTS idx_notes_classification ON notes(classification);

-- Index-level metadata (last_built timestamp etc.)
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT
);

-- BM25-ranked projection kept in sync with notes via triggers
CREATE VIRTUAL TABLE IF NOT EXISTS fts_notes USING fts5(
    title, type, tags, content,
    content=notes, content_rowid=id
);

CREATE TRIGGER IF NOT EXISTS notes_ai AFTER INSERT ON notes BEGIN
    INSERT INTO fts_notes(rowid, title, type, tags, content)
    VALUES (new.id, new.title, new.type, new.tags, new.content);
END;

CREATE TRIGGER IF NOT EXISTS notes_ad AFTER DELETE ON notes BEGIN
    INSERT INTO fts_notes(fts_notes, rowid, title, type, tags, content)
    VALUES ('delete', old.id, old.title, old.type, old.tags, old.content);
END;

CREATE TRIGGER IF NOT EXISTS notes_au AFTER UPDATE ON notes BEGIN
    INSERT INTO fts_notes(fts_notes, rowid, title, type, tags, content)
    VALUES ('delete', old.id, old.title, old.type, old.tags, old.content);
    INSERT INTO fts_notes(rowid, title, type, tags, content)
    VALUES (new.id, new.title, new.type, new.tags, new.content);
END;
"#;
