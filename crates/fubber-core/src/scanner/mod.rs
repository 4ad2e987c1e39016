//! Project discovery: directory walking, inheritable ignore rules and
//! language classification.
//!
//! The walk is iterative (explicit stack keyed on directory path) and
//! single-threaded. Ignore rules compile once per directory and memoize;
//! the resulting `IgnoreMatcher` is a first-class value the updater
//! reuses to re-test stored paths against current rules.

pub mod ignores;
pub mod language;
pub mod types;
pub mod walker;

pub use ignores::IgnoreMatcher;
pub use language::{interpreter_tag, Language};
pub use types::SourceFile;
pub use walker::{read_source, Scanner};
