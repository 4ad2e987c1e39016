//! fubber-storage: SQLite persistence.
//!
//! One store file holds every project: registered roots, per-file
//! metadata and the extracted entities, mirrored into an FTS5
//! external-content index kept coherent by triggers.

pub mod connection;
pub mod migrations;
pub mod queries;

pub use connection::Store;
pub use queries::entities::IndexedEntity;
pub use queries::projects::ProjectRow;
pub use queries::search::SearchHit;

/// Current unix time in seconds.
pub(crate) fn now_epoch() -> i64 {
    chrono::Utc::now().timestamp()
}
