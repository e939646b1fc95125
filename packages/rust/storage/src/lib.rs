//! libSQL storage layer for the docset search index.
//!
//! The [`IndexStore`] owns the `searchIndex` table inside
//! `Contents/Resources/docSet.dsidx`. Every build starts from an empty file.
//!
//! **Write rules:**
//! - All statements go through one connection guarded by an async mutex,
//!   so concurrent document tasks may share an `Arc<IndexStore>`.
//! - Duplicate `(name, type, path)` triples are ignored, never overwritten.

mod schema;

use std::path::{Path, PathBuf};

use libsql::{Connection, Database, params};
use mddocset_shared::{DocsetError, IndexEntry, Result};
use tokio::sync::Mutex;

/// Search index handle wrapping a libSQL database.
pub struct IndexStore {
    #[allow(dead_code)]
    db: Database,
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl IndexStore {
    /// Create a fresh index at `path`, deleting any previous store file first.
    pub async fn open(path: &Path) -> Result<Self> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::info!(?path, "previous search index deleted"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(DocsetError::io(path, e)),
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DocsetError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DocsetError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| DocsetError::Storage(e.to_string()))?;

        conn.execute_batch(schema::SEARCH_INDEX_SCHEMA)
            .await
            .map_err(|e| DocsetError::Storage(format!("schema setup failed: {e}")))?;

        tracing::debug!(?path, "search index created");

        Ok(Self {
            db,
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
        })
    }

    /// Location of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert one row. Returns `false` when the triple already existed.
    pub async fn insert_ignore(&self, name: &str, kind: &str, path: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        let changed = conn
            .execute(schema::INSERT_IGNORE, params![name, kind, path])
            .await
            .map_err(|e| DocsetError::Storage(e.to_string()))?;
        Ok(changed > 0)
    }

    /// Record a batch of entries in one transaction. Returns the number of new rows.
    pub async fn insert_all(&self, entries: &[IndexEntry]) -> Result<usize> {
        let conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| DocsetError::Storage(e.to_string()))?;

        let mut inserted = 0;
        for entry in entries {
            let changed = tx
                .execute(
                    schema::INSERT_IGNORE,
                    params![entry.name.as_str(), entry.kind.as_str(), entry.path.as_str()],
                )
                .await
                .map_err(|e| DocsetError::Storage(e.to_string()))?;
            if changed > 0 {
                inserted += 1;
            }
        }

        tx.commit()
            .await
            .map_err(|e| DocsetError::Storage(e.to_string()))?;
        Ok(inserted)
    }

    /// All rows ordered by id, as `(id, entry)` pairs.
    pub async fn entries(&self) -> Result<Vec<(i64, IndexEntry)>> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query(
                "SELECT id, name, type, path FROM searchIndex ORDER BY id",
                params![],
            )
            .await
            .map_err(|e| DocsetError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DocsetError::Storage(e.to_string()))?
        {
            let id: i64 = row
                .get(0)
                .map_err(|e| DocsetError::Storage(e.to_string()))?;
            let entry = IndexEntry {
                name: row
                    .get::<String>(1)
                    .map_err(|e| DocsetError::Storage(e.to_string()))?,
                kind: row
                    .get::<String>(2)
                    .map_err(|e| DocsetError::Storage(e.to_string()))?,
                path: row
                    .get::<String>(3)
                    .map_err(|e| DocsetError::Storage(e.to_string()))?,
            };
            results.push((id, entry));
        }
        Ok(results)
    }

    /// Number of rows in the index.
    pub async fn count(&self) -> Result<u64> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query("SELECT COUNT(*) FROM searchIndex", params![])
            .await
            .map_err(|e| DocsetError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let count: i64 = row
                    .get(0)
                    .map_err(|e| DocsetError::Storage(e.to_string()))?;
                Ok(count as u64)
            }
            Ok(None) => Ok(0),
            Err(e) => Err(DocsetError::Storage(e.to_string())),
        }
    }
}
