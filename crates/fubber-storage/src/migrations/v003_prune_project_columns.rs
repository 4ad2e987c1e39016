//! V003: Remove the abandoned scheduling columns from project_roots.

pub const MIGRATION_SQL: &str = r#"
ALTER TABLE project_roots DROP COLUMN index_priority;
ALTER TABLE project_roots DROP COLUMN file_count;
"#;
