//! Iterative project walker.
//!
//! Walks a project root with an explicit directory stack (deep trees
//! must not exhaust the call stack), applying the inheritable ignore
//! rules and classifying candidates by extension or shebang.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::ignores::IgnoreMatcher;
use super::language::{interpreter_tag, Language};
use super::types::SourceFile;
use crate::errors::ScanError;

/// Bytes inspected for the binary (NUL) check and the shebang.
const SNIFF_BYTES: usize = 8192;

/// Single-threaded file discovery for one project root.
pub struct Scanner {
    root: PathBuf,
    matcher: IgnoreMatcher,
}

impl Scanner {
    pub fn new(root: &Path) -> Scanner {
        Scanner {
            root: root.to_path_buf(),
            matcher: IgnoreMatcher::new(root),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The ignore rules in effect, for callers that need to re-test
    /// paths outside a walk (the updater).
    pub fn matcher(&self) -> &IgnoreMatcher {
        &self.matcher
    }

    pub fn into_matcher(self) -> IgnoreMatcher {
        self.matcher
    }

    /// Walk the tree and return classified candidates in a stable
    /// (depth-first, name-sorted) order. Unreadable directories are
    /// skipped silently.
    pub fn discover(&self) -> Vec<SourceFile> {
        let mut found = Vec::new();
        let mut stack = vec![self.root.clone()];

        while let Some(dir) = stack.pop() {
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(_) => continue,
            };

            let mut names: Vec<PathBuf> = entries
                .filter_map(|e| e.ok().map(|e| e.path()))
                .collect();
            names.sort();

            let mut subdirs = Vec::new();
            for path in names {
                let file_type = match path.symlink_metadata() {
                    Ok(meta) => meta.file_type(),
                    Err(_) => continue,
                };
                if file_type.is_dir() {
                    if !self.matcher.is_ignored(&path, true) {
                        subdirs.push(path);
                    }
                } else if file_type.is_file() && !self.matcher.is_ignored(&path, false) {
                    if let Some(source) = classify(&path) {
                        found.push(source);
                    }
                }
            }
            // LIFO stack: push reversed so subdirectories walk in name order.
            for sub in subdirs.into_iter().rev() {
                stack.push(sub);
            }
        }
        found
    }
}

/// Classify a candidate file, or None when it is not indexable.
pub fn classify(path: &Path) -> Option<SourceFile> {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        let language = Language::from_extension(ext)?;
        return Some(SourceFile {
            path: path.to_path_buf(),
            language,
            tag: language.tag().to_string(),
        });
    }
    classify_script(path)
}

/// Extension-less files index only when executable, non-binary and
/// shebang-led; the language tag comes from the interpreter.
fn classify_script(path: &Path) -> Option<SourceFile> {
    if !is_executable(path) {
        return None;
    }
    let head = read_head(path, SNIFF_BYTES).ok()?;
    if head.contains(&0) || !head.starts_with(b"#!") {
        return None;
    }
    let text = String::from_utf8_lossy(&head);
    let first_line = text.lines().next().unwrap_or("");
    Some(SourceFile {
        path: path.to_path_buf(),
        language: Language::Script,
        tag: interpreter_tag(first_line),
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    false
}

fn read_head(path: &Path, limit: usize) -> std::io::Result<Vec<u8>> {
    let mut file = fs::File::open(path)?;
    let mut buf = vec![0u8; limit];
    let mut filled = 0;
    loop {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
        if filled == buf.len() {
            break;
        }
    }
    buf.truncate(filled);
    Ok(buf)
}

/// Read a source file as text.
///
/// Returns Ok(None) for binary content (NUL in the first 8 KiB).
/// Malformed UTF-8 falls back to an ISO-8859-1 transcode, which is
/// total over bytes, so hostile encodings degrade instead of failing.
pub fn read_source(path: &Path) -> Result<Option<String>, ScanError> {
    let bytes = fs::read(path).map_err(|e| ScanError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let sniff = &bytes[..bytes.len().min(SNIFF_BYTES)];
    if sniff.contains(&0) {
        return Ok(None);
    }

    match String::from_utf8(bytes) {
        Ok(text) => Ok(Some(text)),
        Err(err) => {
            tracing::debug!(path = %path.display(), "transcoding non-UTF-8 source");
            Ok(Some(latin1_to_string(&err.into_bytes())))
        }
    }
}

fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
