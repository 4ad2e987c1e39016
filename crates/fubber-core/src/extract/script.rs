//! Executable script extraction.
//!
//! Classification already verified the executable bit, the shebang and
//! the absence of NUL bytes; here the file-level record carries the
//! interpreter-derived language and the shebang as its signature.

use std::path::Path;

use crate::errors::ExtractionError;
use crate::scanner::{interpreter_tag, Language, SourceFile};

use super::registry::Extractor;
use super::text::file_record;
use super::types::{EntityRecord, EntityType};

pub struct ScriptExtractor;

impl Extractor for ScriptExtractor {
    fn name(&self) -> &'static str {
        "script"
    }

    fn matches(&self, file: &SourceFile) -> bool {
        file.language == Language::Script
    }

    fn priority(&self) -> u32 {
        10
    }

    fn extract(&self, path: &Path, content: &str) -> Result<Vec<EntityRecord>, ExtractionError> {
        let shebang = content.lines().next().unwrap_or("");
        let tag = interpreter_tag(shebang);

        let mut record = file_record(path, content, &tag);
        record.entity_type = EntityType::Script;
        record.signature_raw = shebang.trim().to_string();
        Ok(vec![record])
    }
}
