//! FTS5 MATCH queries over the entity index.

use fubber_core::errors::StorageError;
use fubber_core::tokenizer::detokenize_with_markers;
use rusqlite::{params, Connection};

use super::to_sql_err;

/// Highlight markers the FTS snippet wraps around matched tokens; the
/// detokenizer keeps them outside the decoded characters.
pub const SNIPPET_START: &str = "«";
pub const SNIPPET_END: &str = "»";

/// One search result row.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub filename: String,
    pub entity_type: String,
    pub name: String,
    pub namespace: String,
    pub enclosing: String,
    pub line_start: u32,
    pub line_end: u32,
    /// Detokenized body snippet with highlight markers.
    pub snippet: String,
}

/// Run a rewritten MATCH query scoped to one project, best-ranked
/// first. The stored snippet text is detokenized for display.
pub fn search(
    conn: &Connection,
    project_root: &str,
    match_query: &str,
    limit: usize,
) -> Result<Vec<SearchHit>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT ce.filename, ce.type, ce.name, ce.namespace, ce.enclosing,
                    ce.line_start, ce.line_end,
                    snippet(code_index, 2, ?3, ?4, ' Te280a6K ', 24)
             FROM code_index
             JOIN code_entities ce ON ce.id = code_index.rowid
             JOIN file_metadata fm ON fm.filename = ce.filename
             WHERE code_index MATCH ?1 AND fm.project_root = ?2
             ORDER BY rank
             LIMIT ?5",
        )
        .map_err(to_sql_err)?;

    let rows = stmt
        .query_map(
            params![
                match_query,
                project_root,
                SNIPPET_START,
                SNIPPET_END,
                limit as i64
            ],
            |row| {
                let namespace: String = row.get(3)?;
                let raw_snippet: String = row.get(7)?;
                Ok(SearchHit {
                    filename: row.get(0)?,
                    entity_type: row.get(1)?,
                    name: row.get(2)?,
                    namespace: detokenize_with_markers(&namespace, SNIPPET_START, SNIPPET_END),
                    enclosing: row.get(4)?,
                    line_start: row.get(5)?,
                    line_end: row.get(6)?,
                    snippet: detokenize_with_markers(
                        &raw_snippet,
                        SNIPPET_START,
                        SNIPPET_END,
                    ),
                })
            },
        )
        .map_err(to_sql_err)?;

    rows.collect::<Result<Vec<_>, _>>().map_err(to_sql_err)
}
