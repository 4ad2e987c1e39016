//! V004: Track when each project's auto-update throttle last fired.

pub const MIGRATION_SQL: &str = r#"
ALTER TABLE project_roots ADD COLUMN last_update_check INTEGER;
"#;
