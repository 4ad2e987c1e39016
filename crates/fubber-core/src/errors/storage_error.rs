//! Store errors. Fatal per command; the enclosing transaction rolls back.

/// Errors from the SQLite store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to open store at {path}: {message}")]
    OpenFailed { path: String, message: String },

    #[error("Migration to v{version} failed: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("Transaction failed: {message}")]
    Transaction { message: String },
}

impl StorageError {
    /// Wrap a rusqlite-level error message.
    pub fn sqlite(message: impl Into<String>) -> Self {
        StorageError::Sqlite {
            message: message.into(),
        }
    }
}
