//! V001: Initial schema.
//! schema_version, project_roots, file_metadata, code_entities and the
//! FTS5 mirror with its coherence triggers.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
) STRICT;

-- Registered project roots. index_priority and file_count date from an
-- abandoned scheduling experiment and are dropped again in v3.
CREATE TABLE IF NOT EXISTS project_roots (
    project_root TEXT PRIMARY KEY,
    project_name TEXT NOT NULL,
    registered_at INTEGER NOT NULL,
    last_indexed INTEGER,
    last_accessed INTEGER,
    index_priority INTEGER NOT NULL DEFAULT 0,
    file_count INTEGER NOT NULL DEFAULT 0
) STRICT;

-- Per-file bookkeeping for incremental updates. filetime is the mtime
-- observed when the file's entities were last written.
CREATE TABLE IF NOT EXISTS file_metadata (
    filename TEXT PRIMARY KEY,
    project_root TEXT NOT NULL REFERENCES project_roots(project_root),
    filetime INTEGER NOT NULL,
    verified_time INTEGER NOT NULL,
    file_hash TEXT NOT NULL,
    entry_count INTEGER NOT NULL DEFAULT 0,
    language TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_file_metadata_project
    ON file_metadata(project_root);
CREATE INDEX IF NOT EXISTS idx_file_metadata_verified
    ON file_metadata(project_root, verified_time);

-- Extracted entities. The starred columns hold tokenized text and are
-- what the FTS mirror indexes; *_raw keep the display forms.
CREATE TABLE IF NOT EXISTS code_entities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    preamble TEXT NOT NULL,
    signature TEXT NOT NULL,
    body TEXT NOT NULL,
    namespace TEXT NOT NULL,
    ext TEXT NOT NULL,
    path TEXT NOT NULL,
    preamble_raw TEXT NOT NULL,
    signature_raw TEXT NOT NULL,
    type TEXT NOT NULL,
    name TEXT NOT NULL,
    enclosing TEXT NOT NULL,
    filename TEXT NOT NULL,
    line_start INTEGER NOT NULL,
    line_end INTEGER NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_code_entities_filename
    ON code_entities(filename);
CREATE INDEX IF NOT EXISTS idx_code_entities_type
    ON code_entities(type);

-- External-content FTS5 mirror. Semantic splitting happened in the
-- tokenizer; unicode61 only separates the emitted tokens.
CREATE VIRTUAL TABLE IF NOT EXISTS code_index USING fts5(
    preamble, signature, body, namespace, ext, path,
    content='code_entities',
    content_rowid='id',
    tokenize='unicode61'
);

CREATE TRIGGER IF NOT EXISTS code_entities_ai AFTER INSERT ON code_entities BEGIN
    INSERT INTO code_index(rowid, preamble, signature, body, namespace, ext, path)
    VALUES (new.id, new.preamble, new.signature, new.body, new.namespace, new.ext, new.path);
END;

CREATE TRIGGER IF NOT EXISTS code_entities_ad AFTER DELETE ON code_entities BEGIN
    INSERT INTO code_index(code_index, rowid, preamble, signature, body, namespace, ext, path)
    VALUES ('delete', old.id, old.preamble, old.signature, old.body, old.namespace, old.ext, old.path);
END;

CREATE TRIGGER IF NOT EXISTS code_entities_au AFTER UPDATE ON code_entities BEGIN
    INSERT INTO code_index(code_index, rowid, preamble, signature, body, namespace, ext, path)
    VALUES ('delete', old.id, old.preamble, old.signature, old.body, old.namespace, old.ext, old.path);
    INSERT INTO code_index(rowid, preamble, signature, body, namespace, ext, path)
    VALUES (new.id, new.preamble, new.signature, new.body, new.namespace, new.ext, new.path);
END;
"#;
