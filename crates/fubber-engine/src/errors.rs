//! Engine-level error: the union of the subsystem errors a command can
//! surface.

use fubber_core::errors::{ConfigError, ExtractionError, QueryParseError, ScanError, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Query(#[from] QueryParseError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
