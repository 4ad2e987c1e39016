//! PRAGMA configuration applied to every connection.

use fubber_core::errors::StorageError;
use rusqlite::Connection;

/// WAL journal, NORMAL sync, 5s busy_timeout, foreign keys on.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(|e| StorageError::sqlite(e.to_string()))
}
