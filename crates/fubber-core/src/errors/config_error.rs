//! Configuration and project-resolution errors.

use std::path::PathBuf;

/// Errors raised while resolving configuration or project roots.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("HOME is not set; cannot locate the index store")]
    HomeNotSet,

    #[error("Project root does not exist: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Project root is not a directory: {path}")]
    RootNotDirectory { path: PathBuf },

    #[error("No registered project contains {path}")]
    NoProject {
        path: PathBuf,
        /// Plausible roots found by scanning upward for project markers.
        candidates: Vec<PathBuf>,
    },
}
