//! SQL schema for the docset search index (`docSet.dsidx`).
//!
//! The index is rebuilt from scratch on every run, so there is exactly one
//! schema and no version tracking.

/// Table plus the unique index that makes duplicate entries a no-op.
pub(crate) const SEARCH_INDEX_SCHEMA: &str = r#"
CREATE TABLE searchIndex(id INTEGER PRIMARY KEY, name TEXT, type TEXT, path TEXT);
CREATE UNIQUE INDEX anchor ON searchIndex (name, type, path);
"#;

/// Insert that silently skips rows violating the `anchor` index.
pub(crate) const INSERT_IGNORE: &str =
    "INSERT OR IGNORE INTO searchIndex(name, type, path) VALUES (?1, ?2, ?3)";
