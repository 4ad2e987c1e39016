//! Queries for the code_entities table and its FTS mirror.

use fubber_core::errors::StorageError;
use rusqlite::{params, Connection};

use super::{to_sql_err, DELETE_CHUNK};

/// An entity as persisted: the record's raw fields plus the tokenized
/// columns the FTS mirror indexes.
#[derive(Debug, Clone)]
pub struct IndexedEntity {
    pub preamble: String,
    pub signature: String,
    pub body: String,
    pub namespace: String,
    pub ext: String,
    pub path: String,
    pub preamble_raw: String,
    pub signature_raw: String,
    pub entity_type: String,
    pub name: String,
    pub enclosing: String,
    pub filename: String,
    pub line_start: u32,
    pub line_end: u32,
}

/// Insert entities in discovery order. The insert trigger mirrors each
/// row into code_index.
pub fn insert_all(conn: &Connection, entities: &[IndexedEntity]) -> Result<(), StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO code_entities
                 (preamble, signature, body, namespace, ext, path,
                  preamble_raw, signature_raw, type, name, enclosing,
                  filename, line_start, line_end)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )
        .map_err(to_sql_err)?;
    for e in entities {
        stmt.execute(params![
            e.preamble,
            e.signature,
            e.body,
            e.namespace,
            e.ext,
            e.path,
            e.preamble_raw,
            e.signature_raw,
            e.entity_type,
            e.name,
            e.enclosing,
            e.filename,
            e.line_start,
            e.line_end,
        ])
        .map_err(to_sql_err)?;
    }
    Ok(())
}

/// Purge the entities of the given files in chunks of at most
/// `DELETE_CHUNK` filenames. The delete trigger emits the required
/// per-rowid delete command into the FTS mirror.
pub fn delete_for_files(conn: &Connection, filenames: &[String]) -> Result<(), StorageError> {
    for chunk in filenames.chunks(DELETE_CHUNK) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!("DELETE FROM code_entities WHERE filename IN ({placeholders})");
        let mut stmt = conn.prepare_cached(&sql).map_err(to_sql_err)?;
        stmt.execute(rusqlite::params_from_iter(chunk.iter()))
            .map_err(to_sql_err)?;
    }
    Ok(())
}

pub fn count(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM code_entities", [], |row| row.get(0))
        .map_err(to_sql_err)
}

pub fn count_for_file(conn: &Connection, filename: &str) -> Result<i64, StorageError> {
    conn.prepare_cached("SELECT COUNT(*) FROM code_entities WHERE filename = ?1")
        .map_err(to_sql_err)?
        .query_row(params![filename], |row| row.get(0))
        .map_err(to_sql_err)
}

/// Live rows in the FTS mirror. Equal to `count()` whenever the
/// triggers have kept the mirror coherent.
pub fn count_index(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM code_index", [], |row| row.get(0))
        .map_err(to_sql_err)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::Store;

    pub(crate) fn entity(filename: &str, name: &str, body: &str) -> IndexedEntity {
        IndexedEntity {
            preamble: String::new(),
            signature: format!("def {name}"),
            body: body.to_string(),
            namespace: String::new(),
            ext: "py".to_string(),
            path: "a T2eK py".to_string(),
            preamble_raw: String::new(),
            signature_raw: format!("def {name}():"),
            entity_type: "function".to_string(),
            name: name.to_string(),
            enclosing: String::new(),
            filename: filename.to_string(),
            line_start: 1,
            line_end: 2,
        }
    }

    #[test]
    fn mirror_stays_coherent_through_mutations() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn();

        insert_all(
            conn,
            &[
                entity("/p/a.py", "alpha", "return 1"),
                entity("/p/a.py", "beta", "return 2"),
                entity("/p/b.py", "gamma", "return 3"),
            ],
        )
        .unwrap();
        assert_eq!(count(conn).unwrap(), 3);
        assert_eq!(count_index(conn).unwrap(), 3);

        conn.execute(
            "UPDATE code_entities SET body = 'return 9' WHERE name = 'beta'",
            [],
        )
        .unwrap();
        assert_eq!(count(conn).unwrap(), count_index(conn).unwrap());

        delete_for_files(conn, &["/p/a.py".to_string()]).unwrap();
        assert_eq!(count(conn).unwrap(), 1);
        assert_eq!(count_index(conn).unwrap(), 1);
    }

    #[test]
    fn fts_match_finds_updated_body() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn();
        insert_all(conn, &[entity("/p/a.py", "alpha", "needle here")]).unwrap();

        let hits: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM code_index WHERE code_index MATCH 'needle'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(hits, 1);

        conn.execute(
            "UPDATE code_entities SET body = 'haystack only' WHERE name = 'alpha'",
            [],
        )
        .unwrap();
        let hits: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM code_index WHERE code_index MATCH 'needle'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(hits, 0);
    }
}
