//! Discovery data types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::language::Language;

/// A discovered, classified candidate file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub language: Language,
    /// Display tag: the language name, refined from the shebang
    /// interpreter for executable scripts.
    pub tag: String,
}
