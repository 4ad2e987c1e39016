//! Progress reporting seam between the core and the output layer.
//!
//! The core never prints. Callers pass a `ProgressSink`; the indexer and
//! updater advance it in coarse steps so terminal implementations are not
//! redrawn per file.

/// Receives progress events from long-running operations.
pub trait ProgressSink {
    /// A new operation with `total` units of work is starting.
    fn begin(&mut self, total: usize);
    /// `done` units are now complete (cumulative, not a delta).
    fn advance(&mut self, done: usize);
    /// The operation finished.
    fn finish(&mut self);
}

/// A sink that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn begin(&mut self, _total: usize) {}
    fn advance(&mut self, _done: usize) {}
    fn finish(&mut self) {}
}
