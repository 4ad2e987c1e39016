//! Queries for the project_roots table.

use fubber_core::errors::StorageError;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::to_sql_err;

/// One registered project root.
#[derive(Debug, Clone)]
pub struct ProjectRow {
    pub project_root: String,
    pub project_name: String,
    pub registered_at: i64,
    pub last_indexed: Option<i64>,
    pub last_accessed: Option<i64>,
    pub last_update_check: Option<i64>,
}

fn parse_row(row: &Row) -> rusqlite::Result<ProjectRow> {
    Ok(ProjectRow {
        project_root: row.get(0)?,
        project_name: row.get(1)?,
        registered_at: row.get(2)?,
        last_indexed: row.get(3)?,
        last_accessed: row.get(4)?,
        last_update_check: row.get(5)?,
    })
}

const COLUMNS: &str =
    "project_root, project_name, registered_at, last_indexed, last_accessed, last_update_check";

/// Register a project root. Re-registering an existing root is a no-op.
pub fn register(
    conn: &Connection,
    root: &str,
    name: &str,
    now: i64,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO project_roots (project_root, project_name, registered_at, last_accessed)
         VALUES (?1, ?2, ?3, ?3)
         ON CONFLICT(project_root) DO NOTHING",
        params![root, name, now],
    )
    .map_err(to_sql_err)?;
    Ok(())
}

pub fn get(conn: &Connection, root: &str) -> Result<Option<ProjectRow>, StorageError> {
    conn.prepare_cached(&format!(
        "SELECT {COLUMNS} FROM project_roots WHERE project_root = ?1"
    ))
    .map_err(to_sql_err)?
    .query_row(params![root], parse_row)
    .optional()
    .map_err(to_sql_err)
}

/// All roots, longest first, for prefix resolution.
pub fn all_roots(conn: &Connection) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT project_root FROM project_roots ORDER BY LENGTH(project_root) DESC",
        )
        .map_err(to_sql_err)?;
    let rows = stmt
        .query_map([], |row| row.get(0))
        .map_err(to_sql_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_sql_err)
}

pub fn list(conn: &Connection) -> Result<Vec<ProjectRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM project_roots ORDER BY project_root"
        ))
        .map_err(to_sql_err)?;
    let rows = stmt.query_map([], parse_row).map_err(to_sql_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(to_sql_err)
}

pub fn touch_accessed(conn: &Connection, root: &str, now: i64) -> Result<(), StorageError> {
    conn.prepare_cached("UPDATE project_roots SET last_accessed = ?2 WHERE project_root = ?1")
        .map_err(to_sql_err)?
        .execute(params![root, now])
        .map_err(to_sql_err)?;
    Ok(())
}

pub fn set_last_indexed(conn: &Connection, root: &str, now: i64) -> Result<(), StorageError> {
    conn.prepare_cached("UPDATE project_roots SET last_indexed = ?2 WHERE project_root = ?1")
        .map_err(to_sql_err)?
        .execute(params![root, now])
        .map_err(to_sql_err)?;
    Ok(())
}

pub fn set_last_update_check(
    conn: &Connection,
    root: &str,
    now: i64,
) -> Result<(), StorageError> {
    conn.prepare_cached(
        "UPDATE project_roots SET last_update_check = ?2 WHERE project_root = ?1",
    )
    .map_err(to_sql_err)?
    .execute(params![root, now])
    .map_err(to_sql_err)?;
    Ok(())
}
