//! One function per verb.

use std::path::{Path, PathBuf};

use fubber_core::errors::ConfigError;
use fubber_core::extract::ExtractorRegistry;
use fubber_core::query::rewrite_query;
use fubber_core::scanner::Scanner;
use fubber_core::Settings;

use fubber_engine::{resolve_project, EngineError, Indexer, Updater};
use fubber_storage::queries::{file_metadata, projects, search};
use fubber_storage::{ProjectRow, Store};

use crate::output::{print_hit, print_hit_json, StderrProgress};

/// Register a project root, creating the store if absent.
pub fn init(settings: &Settings, path: &Path) -> Result<(), EngineError> {
    let root = absolutize(path);
    if !root.exists() {
        return Err(ConfigError::RootNotFound { path: root }.into());
    }
    if !root.is_dir() {
        return Err(ConfigError::RootNotDirectory { path: root }.into());
    }
    // Resolution compares against the canonical cwd.
    let root = std::fs::canonicalize(&root).unwrap_or(root);

    let store = Store::open(&settings.store_path())?;
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    projects::register(
        store.conn(),
        &root.to_string_lossy(),
        &name,
        now(),
    )?;
    println!("registered {}", root.display());
    Ok(())
}

/// Resolve the cwd's project and run a full index.
pub fn index(settings: &Settings) -> Result<(), EngineError> {
    let mut store = Store::open(&settings.store_path())?;
    let project = resolve_cwd(&store, settings)?;

    let registry = ExtractorRegistry::with_defaults();
    let indexer = Indexer::new(settings, &registry);
    let mut progress = StderrProgress::new("indexing");
    let outcome = indexer.full(
        &mut store,
        Path::new(&project.project_root),
        &mut progress,
    )?;
    println!(
        "indexed {} files, {} entities",
        outcome.files, outcome.entities
    );
    Ok(())
}

/// Resolve the cwd's project and run the updater.
pub fn update(settings: &Settings) -> Result<(), EngineError> {
    let mut store = Store::open(&settings.store_path())?;
    let project = resolve_cwd(&store, settings)?;

    let registry = ExtractorRegistry::with_defaults();
    let updater = Updater::new(settings, &registry);
    let scanner = Scanner::new(Path::new(&project.project_root));
    let mut progress = StderrProgress::new("updating");
    let outcome = updater.run(&mut store, &project, scanner.matcher(), &mut progress)?;

    if outcome.throttled {
        println!("update throttled; checked recently");
    } else {
        println!(
            "checked {} files: {} reindexed, {} removed",
            outcome.checked, outcome.reindexed, outcome.purged
        );
    }
    Ok(())
}

/// Rewrite and run a query against the cwd's project.
pub fn search(
    settings: &Settings,
    query: &str,
    limit: usize,
    json: bool,
) -> Result<(), EngineError> {
    let mut store = Store::open(&settings.store_path())?;
    let project = resolve_cwd(&store, settings)?;

    if settings.auto_update {
        auto_update(settings, &mut store, &project);
    }

    let rewritten = rewrite_query(query)?;
    tracing::debug!(%rewritten, "running match query");

    let hits = search::search(store.conn(), &project.project_root, &rewritten, limit)?;
    for hit in &hits {
        if json {
            print_hit_json(&project.project_root, hit);
        } else {
            print_hit(&project.project_root, hit);
        }
    }
    Ok(())
}

/// List registered projects with their last-indexed times.
pub fn projects(settings: &Settings) -> Result<(), EngineError> {
    let store = Store::open(&settings.store_path())?;
    for row in projects::list(store.conn())? {
        let files = file_metadata::count_for_project(store.conn(), &row.project_root)?;
        let last = row
            .last_indexed
            .map(format_epoch)
            .unwrap_or_else(|| "never".to_string());
        println!(
            "{}\t{} files\tindexed {}",
            row.project_root, files, last
        );
    }
    Ok(())
}

/// The throttled auto-refresh every command performs after resolving a
/// project. Failures degrade to a warning; the command proceeds on the
/// existing index.
fn auto_update(settings: &Settings, store: &mut Store, project: &ProjectRow) {
    let registry = ExtractorRegistry::with_defaults();
    let updater = Updater::new(settings, &registry);
    let scanner = Scanner::new(Path::new(&project.project_root));
    let mut progress = StderrProgress::new("updating");
    if let Err(err) = updater.run(store, project, scanner.matcher(), &mut progress) {
        tracing::warn!(%err, "auto-update failed, searching stale index");
    }
}

fn resolve_cwd(store: &Store, settings: &Settings) -> Result<ProjectRow, EngineError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::RootNotFound {
        path: PathBuf::from("."),
    })?;
    resolve_project(store, settings, &cwd)
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
    .components()
    .collect()
}

fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn format_epoch(epoch: i64) -> String {
    use std::time::{Duration, UNIX_EPOCH};
    let when = UNIX_EPOCH + Duration::from_secs(epoch.max(0) as u64);
    match when.elapsed() {
        Ok(ago) if ago.as_secs() < 60 => "just now".to_string(),
        Ok(ago) if ago.as_secs() < 3600 => format!("{}m ago", ago.as_secs() / 60),
        Ok(ago) if ago.as_secs() < 86_400 => format!("{}h ago", ago.as_secs() / 3600),
        Ok(ago) => format!("{}d ago", ago.as_secs() / 86_400),
        Err(_) => "just now".to_string(),
    }
}
