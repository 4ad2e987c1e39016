//! Project resolution: which registered root owns a path.

use std::path::{Path, PathBuf};

use fubber_core::config::Settings;
use fubber_core::errors::ConfigError;

use fubber_storage::queries::projects;
use fubber_storage::{ProjectRow, Store};

use crate::errors::EngineError;
use crate::now_epoch;

/// Files whose presence marks a plausible project root.
const ROOT_MARKERS: &[&str] = &[
    ".git",
    "composer.json",
    "package.json",
    "Cargo.toml",
    "go.mod",
    "pyproject.toml",
];

/// Resolve the longest registered project root equal to or prefixing
/// `start`, updating its last_accessed. With no match, the error
/// carries candidate roots found by scanning upward for markers.
pub fn resolve_project(
    store: &Store,
    settings: &Settings,
    start: &Path,
) -> Result<ProjectRow, EngineError> {
    let roots = projects::all_roots(store.conn())?;
    for root in roots {
        // Roots come longest-first, so the first prefix match wins.
        if start == Path::new(&root) || start.starts_with(&root) {
            projects::touch_accessed(store.conn(), &root, now_epoch())?;
            let row = projects::get(store.conn(), &root)?.ok_or_else(|| {
                fubber_core::errors::StorageError::sqlite("project row vanished during resolve")
            })?;
            return Ok(row);
        }
    }

    Err(ConfigError::NoProject {
        path: start.to_path_buf(),
        candidates: candidate_roots(start, &settings.home),
    }
    .into())
}

/// Scan upward from `start` for directories holding a known marker,
/// stopping at the user's home directory when `start` is inside it,
/// otherwise at the filesystem root.
pub fn candidate_roots(start: &Path, home: &Path) -> Vec<PathBuf> {
    let stop: &Path = if start.starts_with(home) {
        home
    } else {
        Path::new("/")
    };

    let mut candidates = Vec::new();
    let mut current = Some(start);
    while let Some(dir) = current {
        if ROOT_MARKERS.iter().any(|m| dir.join(m).exists()) {
            candidates.push(dir.to_path_buf());
        }
        if dir == stop {
            break;
        }
        current = dir.parent();
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn settings_for(home: &Path) -> Settings {
        Settings::with_home(home.to_path_buf())
    }

    #[test]
    fn longest_prefix_wins() {
        let store = Store::open_in_memory().unwrap();
        projects::register(store.conn(), "/work/app", "app", 0).unwrap();
        projects::register(store.conn(), "/work/app/plugins/auth", "auth", 0).unwrap();

        let settings = settings_for(Path::new("/home/dev"));
        let row = resolve_project(
            &store,
            &settings,
            Path::new("/work/app/plugins/auth/src"),
        )
        .unwrap();
        assert_eq!(row.project_root, "/work/app/plugins/auth");

        let row = resolve_project(&store, &settings, Path::new("/work/app/src")).unwrap();
        assert_eq!(row.project_root, "/work/app");
    }

    #[test]
    fn resolution_updates_last_accessed() {
        let store = Store::open_in_memory().unwrap();
        projects::register(store.conn(), "/p", "p", 0).unwrap();
        let settings = settings_for(Path::new("/home/dev"));

        resolve_project(&store, &settings, Path::new("/p/src")).unwrap();
        let row = projects::get(store.conn(), "/p").unwrap().unwrap();
        assert!(row.last_accessed.is_some());
    }

    #[test]
    fn prefix_matching_respects_path_components() {
        let store = Store::open_in_memory().unwrap();
        projects::register(store.conn(), "/work/app", "app", 0).unwrap();
        let settings = settings_for(Path::new("/home/dev"));

        // /work/app2 is not inside /work/app.
        let err = resolve_project(&store, &settings, Path::new("/work/app2/src"));
        assert!(err.is_err());
    }

    #[test]
    fn no_project_reports_candidates() {
        let tmp = tempfile::tempdir().unwrap();
        let home = tmp.path();
        let project = home.join("code/thing");
        fs::create_dir_all(project.join("src")).unwrap();
        fs::write(project.join("Cargo.toml"), "[package]\n").unwrap();

        let store = Store::open_in_memory().unwrap();
        let settings = settings_for(home);
        let err = resolve_project(&store, &settings, &project.join("src")).unwrap_err();
        match err {
            EngineError::Config(ConfigError::NoProject { candidates, .. }) => {
                assert_eq!(candidates, vec![project]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
