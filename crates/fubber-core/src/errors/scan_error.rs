//! Discovery and file-reading errors.

use std::path::PathBuf;

/// Errors that can occur while walking a project or reading a file.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("IO error scanning {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported encoding in {path}")]
    UnsupportedEncoding { path: PathBuf },

    #[error("Invalid ignore pattern {pattern:?} in {dir}: {message}")]
    BadIgnorePattern {
        dir: PathBuf,
        pattern: String,
        message: String,
    },
}
