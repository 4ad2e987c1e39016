//! Entity extraction errors.

use std::path::PathBuf;

/// An extractor failed on one file. In production mode the failure is
/// logged and the file yields zero entities; developer mode re-raises.
#[derive(Debug, thiserror::Error)]
#[error("Extraction failed for {path} ({language}): {message}")]
pub struct ExtractionError {
    pub path: PathBuf,
    pub language: String,
    pub message: String,
}
