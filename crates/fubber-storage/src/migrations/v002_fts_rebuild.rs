//! V002: Drop and recreate the FTS mirror.
//! The tokenizer's escape format changed shape; stored token text is
//! stale, so last_indexed is cleared to force reindexing.

pub const MIGRATION_SQL: &str = r#"
DROP TABLE IF EXISTS code_index;

CREATE VIRTUAL TABLE IF NOT EXISTS code_index USING fts5(
    preamble, signature, body, namespace, ext, path,
    content='code_entities',
    content_rowid='id',
    tokenize='unicode61'
);

UPDATE project_roots SET last_indexed = NULL;
"#;
