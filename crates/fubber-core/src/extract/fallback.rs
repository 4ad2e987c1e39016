//! Fallback extractor: the bare file-level record.
//!
//! Classified languages without a structural extractor still get their
//! paths and bodies indexed.

use std::path::Path;

use crate::errors::ExtractionError;
use crate::scanner::{Language, SourceFile};

use super::registry::Extractor;
use super::text::file_record;
use super::types::EntityRecord;

pub struct FileExtractor;

impl Extractor for FileExtractor {
    fn name(&self) -> &'static str {
        "file"
    }

    fn matches(&self, _file: &SourceFile) -> bool {
        true
    }

    fn extract(&self, path: &Path, content: &str) -> Result<Vec<EntityRecord>, ExtractionError> {
        let tag = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Language::from_extension)
            .map(|l| l.tag().to_string())
            .unwrap_or_else(|| "text".to_string());
        Ok(vec![file_record(path, content, &tag)])
    }
}
