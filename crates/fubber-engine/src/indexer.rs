//! The indexer: discovery → extraction → tokenization → insertion.
//!
//! Extraction and tokenization happen before the write transaction
//! opens; the transaction then holds only the delete-then-insert of the
//! affected files, so readers observe each file's swap atomically and
//! a failure rolls the whole pass back.

use std::path::Path;

use xxhash_rust::xxh3::xxh3_64;

use fubber_core::config::Settings;
use fubber_core::extract::ExtractorRegistry;
use fubber_core::progress::ProgressSink;
use fubber_core::scanner::{read_source, Scanner, SourceFile};
use fubber_core::tokenizer::tokenize;

use fubber_storage::queries::file_metadata::{self, FileRow};
use fubber_storage::queries::{entities, projects};
use fubber_storage::{IndexedEntity, Store};

use crate::errors::EngineError;
use crate::now_epoch;

/// Progress advances are batched to every N files.
const PROGRESS_STEP: usize = 7;

/// Bodies larger than this are truncated before tokenization. Storage
/// only; line ranges are untouched.
const MAX_BODY_CHARS: usize = 100_000;

/// What an indexing pass did.
#[derive(Debug, Default, Clone, Copy)]
pub struct IndexOutcome {
    pub files: usize,
    pub entities: usize,
    pub deleted_files: usize,
}

pub struct Indexer<'a> {
    settings: &'a Settings,
    registry: &'a ExtractorRegistry,
}

impl<'a> Indexer<'a> {
    pub fn new(settings: &'a Settings, registry: &'a ExtractorRegistry) -> Indexer<'a> {
        Indexer { settings, registry }
    }

    /// Reindex a whole project from scratch: purge everything recorded
    /// for it, then walk, extract and insert.
    pub fn full(
        &self,
        store: &mut Store,
        root: &Path,
        progress: &mut dyn ProgressSink,
    ) -> Result<IndexOutcome, EngineError> {
        let scanner = Scanner::new(root);
        let files = scanner.discover();

        progress.begin(files.len());
        let prepared = self.prepare_files(root, &files, progress)?;
        progress.finish();

        let root_str = root.to_string_lossy().into_owned();
        let now = now_epoch();
        let outcome = store.with_tx(|tx| {
            let stale = file_metadata::filenames_for_project(tx, &root_str)?;
            entities::delete_for_files(tx, &stale)?;
            file_metadata::delete_files(tx, &stale)?;

            let mut total_entities = 0;
            for (file_row, rows) in &prepared {
                entities::insert_all(tx, rows)?;
                file_metadata::upsert(tx, file_row)?;
                total_entities += rows.len();
            }
            projects::set_last_indexed(tx, &root_str, now)?;
            Ok(IndexOutcome {
                files: prepared.len(),
                entities: total_entities,
                deleted_files: stale.len(),
            })
        })?;

        tracing::info!(
            root = %root.display(),
            files = outcome.files,
            entities = outcome.entities,
            "full index complete"
        );
        Ok(outcome)
    }

    /// Reindex a changed subset and drop deleted files, in one
    /// transaction. Whole files are re-extracted; there is no
    /// diff-level patching.
    pub fn incremental(
        &self,
        store: &mut Store,
        root: &Path,
        changed: &[SourceFile],
        deleted: &[String],
        progress: &mut dyn ProgressSink,
    ) -> Result<IndexOutcome, EngineError> {
        progress.begin(changed.len());
        let prepared = self.prepare_files(root, changed, progress)?;
        progress.finish();

        let stale: Vec<String> = prepared
            .iter()
            .map(|(row, _)| row.filename.clone())
            .chain(deleted.iter().cloned())
            .collect();

        let outcome = store.with_tx(|tx| {
            entities::delete_for_files(tx, &stale)?;
            file_metadata::delete_files(tx, deleted)?;

            let mut total_entities = 0;
            for (file_row, rows) in &prepared {
                entities::insert_all(tx, rows)?;
                file_metadata::upsert(tx, file_row)?;
                total_entities += rows.len();
            }
            Ok(IndexOutcome {
                files: prepared.len(),
                entities: total_entities,
                deleted_files: deleted.len(),
            })
        })?;
        Ok(outcome)
    }

    /// Read, extract and tokenize a set of files. Unreadable and binary
    /// files are skipped; extraction failures follow the registry's
    /// production/developer policy.
    fn prepare_files(
        &self,
        root: &Path,
        files: &[SourceFile],
        progress: &mut dyn ProgressSink,
    ) -> Result<Vec<(FileRow, Vec<IndexedEntity>)>, EngineError> {
        let mut prepared = Vec::with_capacity(files.len());
        for (done, file) in files.iter().enumerate() {
            if let Some(item) = self.prepare_one(root, file)? {
                prepared.push(item);
            }
            if (done + 1) % PROGRESS_STEP == 0 {
                progress.advance(done + 1);
            }
        }
        progress.advance(files.len());
        Ok(prepared)
    }

    fn prepare_one(
        &self,
        root: &Path,
        file: &SourceFile,
    ) -> Result<Option<(FileRow, Vec<IndexedEntity>)>, EngineError> {
        let content = match read_source(&file.path) {
            Ok(Some(content)) => content,
            Ok(None) => return Ok(None),
            Err(err) => {
                tracing::warn!(%err, "skipping unreadable file");
                return Ok(None);
            }
        };

        let records = self
            .registry
            .extract_file(file, &content, self.settings.dev_mode)?;
        if records.is_empty() {
            tracing::warn!(
                path = %file.path.display(),
                "extractor produced no records, not even the file itself"
            );
        }

        let filename = file.path.to_string_lossy().into_owned();
        let rel_path = file
            .path
            .strip_prefix(root)
            .unwrap_or(&file.path)
            .to_string_lossy()
            .into_owned();
        let ext = file
            .path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        let path_tokens = tokenize(&rel_path);
        let ext_tokens = tokenize(&ext);

        let rows: Vec<IndexedEntity> = records
            .iter()
            .map(|r| {
                let body = truncate_chars(&r.body_raw, MAX_BODY_CHARS);
                IndexedEntity {
                    preamble: tokenize(&r.preamble_raw),
                    signature: tokenize(&r.signature_raw),
                    body: tokenize(body),
                    namespace: tokenize(&r.namespace),
                    ext: ext_tokens.clone(),
                    path: path_tokens.clone(),
                    preamble_raw: r.preamble_raw.clone(),
                    signature_raw: r.signature_raw.clone(),
                    entity_type: r.entity_type.as_str().to_string(),
                    name: r.name.clone(),
                    enclosing: r.enclosing.clone(),
                    filename: filename.clone(),
                    line_start: r.line_start,
                    line_end: r.line_end,
                }
            })
            .collect();

        let mtime = file_mtime(&file.path);
        let file_row = FileRow {
            filename,
            project_root: root.to_string_lossy().into_owned(),
            filetime: mtime,
            verified_time: now_epoch(),
            file_hash: format!("{:016x}", xxh3_64(content.as_bytes())),
            entry_count: rows.len() as i64,
            language: file.tag.clone(),
        };
        Ok(Some((file_row, rows)))
    }
}

/// Truncate to at most `max` characters on a char boundary.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// A file's mtime as epoch seconds, 0 when unavailable.
pub(crate) fn file_mtime(path: &Path) -> i64 {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        let s = "ééééé";
        assert_eq!(truncate_chars(s, 3), "ééé");
        assert_eq!(truncate_chars(s, 10), s);
    }
}
