//! fubber-core: the code-search engine core.
//!
//! This crate provides everything that happens before a row reaches the
//! store and after it comes back out:
//! - Tokenizer: symmetric code tokenization with hex-escaped punctuation
//! - Query: user query parsing and rewriting into FTS5 MATCH syntax
//! - Scanner: project discovery with inheritable ignore rules
//! - Extract: per-language entity extraction behind one record contract
//! - Config: environment-driven settings
//! - Errors: one error enum per subsystem

pub mod config;
pub mod errors;
pub mod extract;
pub mod progress;
pub mod query;
pub mod scanner;
pub mod tokenizer;

pub use config::Settings;
pub use errors::{ConfigError, ExtractionError, QueryParseError, ScanError, StorageError};
pub use extract::{EntityRecord, EntityType, ExtractorRegistry};
pub use progress::{NullProgress, ProgressSink};
pub use query::rewrite_query;
pub use scanner::{IgnoreMatcher, Language, Scanner, SourceFile};
pub use tokenizer::{detokenize, detokenize_with_markers, tokenize};
