//! Query modules, one per table plus the FTS search.

pub mod entities;
pub mod file_metadata;
pub mod projects;
pub mod search;

/// Chunk size for `IN (...)` batch deletes.
pub const DELETE_CHUNK: usize = 500;

pub(crate) fn to_sql_err(e: rusqlite::Error) -> fubber_core::errors::StorageError {
    fubber_core::errors::StorageError::sqlite(e.to_string())
}
