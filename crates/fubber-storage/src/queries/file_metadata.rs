//! Queries for the file_metadata table.

use fubber_core::errors::StorageError;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{to_sql_err, DELETE_CHUNK};

/// Bookkeeping for one indexed file.
#[derive(Debug, Clone)]
pub struct FileRow {
    pub filename: String,
    pub project_root: String,
    /// mtime observed when the entities were last written.
    pub filetime: i64,
    pub verified_time: i64,
    pub file_hash: String,
    pub entry_count: i64,
    pub language: String,
}

fn parse_row(row: &Row) -> rusqlite::Result<FileRow> {
    Ok(FileRow {
        filename: row.get(0)?,
        project_root: row.get(1)?,
        filetime: row.get(2)?,
        verified_time: row.get(3)?,
        file_hash: row.get(4)?,
        entry_count: row.get(5)?,
        language: row.get(6)?,
    })
}

const COLUMNS: &str =
    "filename, project_root, filetime, verified_time, file_hash, entry_count, language";

pub fn upsert(conn: &Connection, file: &FileRow) -> Result<(), StorageError> {
    conn.prepare_cached(
        "INSERT INTO file_metadata
             (filename, project_root, filetime, verified_time, file_hash, entry_count, language)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(filename) DO UPDATE SET
             project_root = excluded.project_root,
             filetime = excluded.filetime,
             verified_time = excluded.verified_time,
             file_hash = excluded.file_hash,
             entry_count = excluded.entry_count,
             language = excluded.language",
    )
    .map_err(to_sql_err)?
    .execute(params![
        file.filename,
        file.project_root,
        file.filetime,
        file.verified_time,
        file.file_hash,
        file.entry_count,
        file.language,
    ])
    .map_err(to_sql_err)?;
    Ok(())
}

pub fn get(conn: &Connection, filename: &str) -> Result<Option<FileRow>, StorageError> {
    conn.prepare_cached(&format!(
        "SELECT {COLUMNS} FROM file_metadata WHERE filename = ?1"
    ))
    .map_err(to_sql_err)?
    .query_row(params![filename], parse_row)
    .optional()
    .map_err(to_sql_err)
}

pub fn all_for_project(conn: &Connection, root: &str) -> Result<Vec<FileRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM file_metadata WHERE project_root = ?1 ORDER BY filename"
        ))
        .map_err(to_sql_err)?;
    let rows = stmt.query_map(params![root], parse_row).map_err(to_sql_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_sql_err)
}

pub fn filenames_for_project(conn: &Connection, root: &str) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT filename FROM file_metadata WHERE project_root = ?1")
        .map_err(to_sql_err)?;
    let rows = stmt
        .query_map(params![root], |row| row.get(0))
        .map_err(to_sql_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_sql_err)
}

/// Files verified on or after `cutoff`, most recently verified first.
/// The updater's recent sweep walks these.
pub fn recent_first(
    conn: &Connection,
    root: &str,
    cutoff: i64,
) -> Result<Vec<FileRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM file_metadata
             WHERE project_root = ?1 AND verified_time >= ?2
             ORDER BY verified_time DESC"
        ))
        .map_err(to_sql_err)?;
    let rows = stmt
        .query_map(params![root, cutoff], parse_row)
        .map_err(to_sql_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_sql_err)
}

/// Oldest-verified files outside the recency window, for the cold sweep.
pub fn coldest(
    conn: &Connection,
    root: &str,
    cutoff: i64,
    limit: usize,
) -> Result<Vec<FileRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM file_metadata
             WHERE project_root = ?1 AND verified_time < ?2
             ORDER BY verified_time ASC
             LIMIT ?3"
        ))
        .map_err(to_sql_err)?;
    let rows = stmt
        .query_map(params![root, cutoff, limit as i64], parse_row)
        .map_err(to_sql_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_sql_err)
}

pub fn set_verified_time(
    conn: &Connection,
    filename: &str,
    now: i64,
) -> Result<(), StorageError> {
    conn.prepare_cached("UPDATE file_metadata SET verified_time = ?2 WHERE filename = ?1")
        .map_err(to_sql_err)?
        .execute(params![filename, now])
        .map_err(to_sql_err)?;
    Ok(())
}

pub fn count_for_project(conn: &Connection, root: &str) -> Result<i64, StorageError> {
    conn.prepare_cached("SELECT COUNT(*) FROM file_metadata WHERE project_root = ?1")
        .map_err(to_sql_err)?
        .query_row(params![root], |row| row.get(0))
        .map_err(to_sql_err)
}

/// Delete metadata rows in chunks of at most `DELETE_CHUNK` filenames.
pub fn delete_files(conn: &Connection, filenames: &[String]) -> Result<(), StorageError> {
    for chunk in filenames.chunks(DELETE_CHUNK) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!("DELETE FROM file_metadata WHERE filename IN ({placeholders})");
        let mut stmt = conn.prepare_cached(&sql).map_err(to_sql_err)?;
        stmt.execute(rusqlite::params_from_iter(chunk.iter()))
            .map_err(to_sql_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::projects;
    use crate::Store;

    fn seed(store: &Store) {
        projects::register(store.conn(), "/p", "p", 0).unwrap();
    }

    fn row(filename: &str, verified: i64) -> FileRow {
        FileRow {
            filename: filename.to_string(),
            project_root: "/p".to_string(),
            filetime: 1000,
            verified_time: verified,
            file_hash: "abc".to_string(),
            entry_count: 3,
            language: "python".to_string(),
        }
    }

    #[test]
    fn upsert_then_get() {
        let store = Store::open_in_memory().unwrap();
        seed(&store);
        upsert(store.conn(), &row("/p/a.py", 10)).unwrap();
        upsert(store.conn(), &row("/p/a.py", 20)).unwrap();

        let got = get(store.conn(), "/p/a.py").unwrap().unwrap();
        assert_eq!(got.verified_time, 20);
        assert_eq!(count_for_project(store.conn(), "/p").unwrap(), 1);
    }

    #[test]
    fn sweep_ordering() {
        let store = Store::open_in_memory().unwrap();
        seed(&store);
        for (name, verified) in [("/p/old.py", 5), ("/p/mid.py", 50), ("/p/new.py", 90)] {
            upsert(store.conn(), &row(name, verified)).unwrap();
        }

        let recent = recent_first(store.conn(), "/p", 40).unwrap();
        let names: Vec<&str> = recent.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["/p/new.py", "/p/mid.py"]);

        let cold = coldest(store.conn(), "/p", 40, 50).unwrap();
        let names: Vec<&str> = cold.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["/p/old.py"]);
    }

    #[test]
    fn chunked_delete() {
        let store = Store::open_in_memory().unwrap();
        seed(&store);
        let names: Vec<String> = (0..1200).map(|i| format!("/p/f{i}.py")).collect();
        for name in &names {
            upsert(store.conn(), &row(name, 1)).unwrap();
        }
        delete_files(store.conn(), &names).unwrap();
        assert_eq!(count_for_project(store.conn(), "/p").unwrap(), 0);
    }
}
