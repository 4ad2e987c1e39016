//! Throttled incremental refresh.
//!
//! One run has three phases inside a wall-clock budget: a sweep of
//! recently verified files, a bounded sweep of the coldest files, and
//! a rescan of directories near anything that changed. The queued set
//! is reindexed in one transaction.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fubber_core::config::Settings;
use fubber_core::extract::ExtractorRegistry;
use fubber_core::progress::{NullProgress, ProgressSink};
use fubber_core::scanner::{walker, IgnoreMatcher, SourceFile};

use fubber_storage::queries::{entities, file_metadata, projects};
use fubber_storage::{ProjectRow, Store};

use crate::errors::EngineError;
use crate::indexer::{file_mtime, Indexer};
use crate::now_epoch;

/// Cold-sweep row cap per run.
const COLD_SWEEP_LIMIT: usize = 50;

/// Below this queue size the update stays silent.
const SILENT_QUEUE_LIMIT: usize = 10;

/// What an updater run did.
#[derive(Debug, Default, Clone, Copy)]
pub struct UpdateOutcome {
    /// The throttle suppressed this run entirely.
    pub throttled: bool,
    pub checked: usize,
    pub reindexed: usize,
    pub purged: usize,
}

pub struct Updater<'a> {
    settings: &'a Settings,
    registry: &'a ExtractorRegistry,
}

impl<'a> Updater<'a> {
    pub fn new(settings: &'a Settings, registry: &'a ExtractorRegistry) -> Updater<'a> {
        Updater { settings, registry }
    }

    /// Run one update for a resolved project. The ignore matcher comes
    /// from Discovery so both sides apply identical rules.
    pub fn run(
        &self,
        store: &mut Store,
        project: &ProjectRow,
        matcher: &IgnoreMatcher,
        progress: &mut dyn ProgressSink,
    ) -> Result<UpdateOutcome, EngineError> {
        let now = now_epoch();
        if let Some(last) = project.last_update_check {
            if now - last < self.settings.update_throttle_secs as i64 {
                return Ok(UpdateOutcome {
                    throttled: true,
                    ..UpdateOutcome::default()
                });
            }
        }

        let root = PathBuf::from(&project.project_root);
        let detection = self.detect(store, project, matcher, now)?;

        let outcome = if detection.changed.is_empty() && detection.deleted.is_empty() {
            UpdateOutcome {
                throttled: false,
                checked: detection.checked.len(),
                reindexed: 0,
                purged: 0,
            }
        } else {
            let indexer = Indexer::new(self.settings, self.registry);
            let queue_size = detection.changed.len() + detection.deleted.len();
            let mut silent = NullProgress;
            let sink: &mut dyn ProgressSink = if queue_size > SILENT_QUEUE_LIMIT {
                progress
            } else {
                &mut silent
            };
            let result = indexer.incremental(
                store,
                &root,
                &detection.changed,
                &detection.deleted,
                sink,
            )?;
            UpdateOutcome {
                throttled: false,
                checked: detection.checked.len(),
                reindexed: result.files,
                purged: detection.deleted.len(),
            }
        };

        // Bookkeeping lands even when nothing changed.
        store.with_tx(|tx| {
            for filename in &detection.checked {
                file_metadata::set_verified_time(tx, filename, now)?;
            }
            projects::set_last_update_check(tx, &project.project_root, now)?;
            Ok(())
        })?;

        tracing::debug!(
            root = %project.project_root,
            checked = outcome.checked,
            reindexed = outcome.reindexed,
            purged = outcome.purged,
            "update complete"
        );
        Ok(outcome)
    }

    /// The wall-clock-bounded detection phase: classify known files as
    /// changed / unchanged / deleted and discover new neighbors of
    /// changed files.
    fn detect(
        &self,
        store: &mut Store,
        project: &ProjectRow,
        matcher: &IgnoreMatcher,
        now: i64,
    ) -> Result<Detection, EngineError> {
        let deadline =
            Instant::now() + Duration::from_millis(self.settings.detect_timeout_ms);
        let cutoff = now - self.settings.recent_threshold_secs as i64;
        let root = Path::new(&project.project_root);
        let conn = store.conn();

        let mut detection = Detection::default();

        let recent = file_metadata::recent_first(conn, &project.project_root, cutoff)?;
        self.sweep(&recent, matcher, &deadline, &mut detection);

        if Instant::now() < deadline {
            let cold = file_metadata::coldest(
                conn,
                &project.project_root,
                cutoff,
                COLD_SWEEP_LIMIT,
            )?;
            self.sweep(&cold, matcher, &deadline, &mut detection);
        }

        // Purged rows leave the store immediately so the rescan below
        // and the next run see consistent metadata.
        if !detection.deleted.is_empty() {
            let deleted = detection.deleted.clone();
            store.with_tx(|tx| {
                entities::delete_for_files(tx, &deleted)?;
                file_metadata::delete_files(tx, &deleted)?;
                Ok(())
            })?;
        }

        // Rescan directories around changes for files the index has
        // never seen.
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        let changed_paths: Vec<PathBuf> =
            detection.changed.iter().map(|f| f.path.clone()).collect();
        for path in changed_paths {
            for dir in [path.parent(), path.parent().and_then(Path::parent)]
                .into_iter()
                .flatten()
            {
                if !dir.starts_with(root) || !seen_dirs.insert(dir.to_path_buf()) {
                    continue;
                }
                self.rescan_dir(store.conn(), dir, matcher, &mut detection)?;
            }
        }

        Ok(detection)
    }

    /// Classify one batch of metadata rows, stopping at the deadline.
    /// Every visited file is marked checked; missing or newly ignored
    /// files queue for purge, newer mtimes queue for reindex.
    fn sweep(
        &self,
        rows: &[file_metadata::FileRow],
        matcher: &IgnoreMatcher,
        deadline: &Instant,
        detection: &mut Detection,
    ) {
        for row in rows {
            if Instant::now() >= *deadline {
                break;
            }
            let path = PathBuf::from(&row.filename);
            if !path.exists() || matcher.is_ignored(&path, false) {
                detection.deleted.push(row.filename.clone());
                continue;
            }
            if file_mtime(&path) > row.filetime {
                if let Some(source) = walker::classify(&path) {
                    detection.changed.push(source);
                }
            }
            detection.checked.push(row.filename.clone());
        }
    }

    /// List a directory's immediate children; enqueue classifiable
    /// files the store does not know yet.
    fn rescan_dir(
        &self,
        conn: &rusqlite::Connection,
        dir: &Path,
        matcher: &IgnoreMatcher,
        detection: &mut Detection,
    ) -> Result<(), EngineError> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(()),
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || matcher.is_ignored(&path, false) {
                continue;
            }
            let filename = path.to_string_lossy().into_owned();
            if file_metadata::get(conn, &filename)?.is_some() {
                continue;
            }
            let Some(source) = walker::classify(&path) else {
                continue;
            };
            if self.registry.handles(&source) {
                detection.changed.push(source);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Detection {
    checked: Vec<String>,
    changed: Vec<SourceFile>,
    deleted: Vec<String>,
}
