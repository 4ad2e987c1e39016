//! Store connection management.
//!
//! One writer connection per process; every mutation runs inside a
//! transaction; prepared statements are cached on the connection.

pub mod pragmas;

use std::path::{Path, PathBuf};

use fubber_core::errors::StorageError;
use rusqlite::{Connection, Transaction};

use self::pragmas::apply_pragmas;
use crate::migrations;

/// The process's handle on the SQLite store.
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open (creating the containing directory and file as needed),
    /// apply pragmas and run pending migrations.
    pub fn open(path: &Path) -> Result<Store, StorageError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| StorageError::OpenFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        }
        let conn = Connection::open(path).map_err(|e| StorageError::OpenFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::prepare(conn, Some(path.to_path_buf()))
    }

    /// In-memory store for testing.
    pub fn open_in_memory() -> Result<Store, StorageError> {
        let conn = Connection::open_in_memory().map_err(|e| StorageError::OpenFailed {
            path: ":memory:".to_string(),
            message: e.to_string(),
        })?;
        Self::prepare(conn, None)
    }

    fn prepare(conn: Connection, path: Option<PathBuf>) -> Result<Store, StorageError> {
        apply_pragmas(&conn)?;
        migrations::run_migrations(&conn)?;
        conn.set_prepared_statement_cache_capacity(64);
        Ok(Store { conn, path })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` inside a write transaction; a returned error rolls the
    /// whole transaction back.
    pub fn with_tx<T, F>(&mut self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Transaction) -> Result<T, StorageError>,
    {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| StorageError::Transaction {
                message: e.to_string(),
            })?;
        let out = f(&tx)?;
        tx.commit().map_err(|e| StorageError::Transaction {
            message: e.to_string(),
        })?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_parent_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(".local/fubber/index.db");
        let store = Store::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[test]
    fn failed_transaction_rolls_back() {
        let mut store = Store::open_in_memory().unwrap();
        let result: Result<(), StorageError> = store.with_tx(|tx| {
            tx.execute(
                "INSERT INTO project_roots (project_root, project_name, registered_at)
                 VALUES ('/p', 'p', 0)",
                [],
            )
            .map_err(|e| StorageError::sqlite(e.to_string()))?;
            Err(StorageError::sqlite("forced failure"))
        });
        assert!(result.is_err());

        let count: i64 = store
            .conn()
            .query_row("SELECT COUNT(*) FROM project_roots", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
