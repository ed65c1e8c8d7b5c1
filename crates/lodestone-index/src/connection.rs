//! SQLite connection management
//!
//! A single connection behind a mutex is enough here: index builds are
//! scan-then-write batch jobs with one writer, and WAL mode lets
//! queries read the previous snapshot while a build commits.

use crate::error::{IndexError, IndexResult};
use crate::schema;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Thread-safe SQLite connection wrapper
#[derive(Clone, Debug)]
pub struct IndexPool {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl IndexPool {
    /// Open (creating if needed) the index database at the given path.
    pub fn open(path: &Path) -> IndexResult<Self> {
        info!(path = ?path, "Opening search index");

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                IndexError::Connection(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let conn = Connection::open(path)?;
        let pool = Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        };
        pool.initialize()?;
        Ok(pool)
    }

    /// Open an existing index for queries. Missing databases surface
    /// as [`IndexError::StoreMissing`] with an actionable message
    /// instead of being silently created empty.
    pub fn open_existing(path: &Path) -> IndexResult<Self> {
        if !path.is_file() {
            return Err(IndexError::StoreMissing(path.display().to_string()));
        }
        Self::open(path)
    }

    /// In-memory pool for tests.
    pub fn memory() -> IndexResult<Self> {
        let conn = Connection::open_in_memory()?;
        let pool = Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        };
        pool.initialize()?;
        Ok(pool)
    }

    /// Execute a closure with the connection.
    pub fn with_connection<F, T>(&self, f: F) -> IndexResult<T>
    where
        F: FnOnce(&Connection) -> IndexResult<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Execute a closure with mutable access (for transactions).
    pub fn with_connection_mut<F, T>(&self, f: F) -> IndexResult<T>
    where
        F: FnOnce(&mut Connection) -> IndexResult<T>,
    {
        let mut conn = self.conn.lock();
        f(&mut conn)
    }

    /// Database size in bytes, from the page count.
    pub fn size_bytes(&self) -> IndexResult<u64> {
        self.with_connection(|conn| {
            let page_count: i64 = conn.query_row("PRAGMA page_count;", [], |row| row.get(0))?;
            let page_size: i64 = conn.query_row("PRAGMA page_size;", [], |row| row.get(0))?;
            Ok((page_count * page_size) as u64)
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn initialize(&self) -> IndexResult<()> {
        self.with_connection(|conn| {
            debug!("Configuring SQLite pragmas");
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA temp_store = MEMORY;",
            )?;
            schema::apply_migrations(conn)?;
            Ok(())
        })
    }
}
