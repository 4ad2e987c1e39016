//! User query parse errors.

/// A malformed user query. Carries the byte offset where parsing stopped
/// and the construct the parser expected there.
#[derive(Debug, thiserror::Error)]
#[error("Query parse error at offset {offset}: expected {expected}")]
pub struct QueryParseError {
    pub offset: usize,
    pub expected: &'static str,
}
