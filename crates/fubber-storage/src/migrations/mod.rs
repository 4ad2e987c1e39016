//! Linear schema migrations tracked in the `schema_version` table.

pub mod v001_initial;
pub mod v002_fts_rebuild;
pub mod v003_prune_project_columns;
pub mod v004_update_check;

use fubber_core::errors::StorageError;
use rusqlite::Connection;

use crate::now_epoch;

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    let current = current_version(conn)?;

    let migrations: &[(&str, u32)] = &[
        (v001_initial::MIGRATION_SQL, 1),
        (v002_fts_rebuild::MIGRATION_SQL, 2),
        (v003_prune_project_columns::MIGRATION_SQL, 3),
        (v004_update_check::MIGRATION_SQL, 4),
    ];

    for (sql, version) in migrations {
        if current < *version {
            conn.execute_batch(sql)
                .map_err(|e| StorageError::MigrationFailed {
                    version: *version,
                    message: e.to_string(),
                })?;
            record_version(conn, *version)?;
            tracing::info!(version, "applied migration");
        }
    }
    Ok(())
}

/// The persisted schema version; 0 for a fresh database.
pub fn current_version(conn: &Connection) -> Result<u32, StorageError> {
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
            [],
            |row| row.get::<_, i64>(0).map(|n| n > 0),
        )
        .map_err(|e| StorageError::sqlite(e.to_string()))?;
    if !table_exists {
        return Ok(0);
    }
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get::<_, u32>(0),
    )
    .map_err(|e| StorageError::sqlite(e.to_string()))
}

fn record_version(conn: &Connection, version: u32) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", [])
        .map_err(|e| StorageError::sqlite(e.to_string()))?;
    conn.execute(
        "INSERT INTO schema_version (version, updated_at) VALUES (?1, ?2)",
        rusqlite::params![version, now_epoch()],
    )
    .map_err(|e| StorageError::sqlite(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_migrates_to_latest() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(current_version(&conn).unwrap(), 4);
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(current_version(&conn).unwrap(), 4);
    }

    #[test]
    fn v3_removed_obsolete_columns() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let columns: Vec<String> = conn
            .prepare("SELECT name FROM pragma_table_info('project_roots')")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert!(!columns.contains(&"index_priority".to_string()));
        assert!(!columns.contains(&"file_count".to_string()));
        assert!(columns.contains(&"last_update_check".to_string()));
    }
}
