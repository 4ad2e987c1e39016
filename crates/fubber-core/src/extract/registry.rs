//! Extractor registry and dispatch.

use std::path::Path;

use crate::errors::ExtractionError;
use crate::scanner::SourceFile;

use super::types::EntityRecord;

/// One per-language extractor.
pub trait Extractor {
    fn name(&self) -> &'static str;

    /// Whether this extractor handles the classified file.
    fn matches(&self, file: &SourceFile) -> bool;

    /// Dispatch ties break toward the higher priority.
    fn priority(&self) -> u32 {
        0
    }

    /// Produce the ordered entity records for one file. Must emit at
    /// least the file-level record when the content is readable.
    fn extract(&self, path: &Path, content: &str) -> Result<Vec<EntityRecord>, ExtractionError>;
}

/// Routes files to extractors.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// The registry with all built-in extractors.
    pub fn with_defaults() -> ExtractorRegistry {
        ExtractorRegistry {
            extractors: vec![
                Box::new(super::php::PhpExtractor),
                Box::new(super::python::PythonExtractor),
                Box::new(super::javascript::JsExtractor),
                Box::new(super::css::CssExtractor),
                Box::new(super::markdown::MarkdownExtractor),
                Box::new(super::script::ScriptExtractor),
                Box::new(super::fallback::FileExtractor),
            ],
        }
    }

    /// The highest-priority extractor matching the file, if any.
    pub fn find(&self, file: &SourceFile) -> Option<&dyn Extractor> {
        self.extractors
            .iter()
            .filter(|e| e.matches(file))
            .max_by_key(|e| e.priority())
            .map(|e| e.as_ref())
    }

    /// Whether any extractor would handle the file. The updater uses
    /// this to decide if a newly appeared path is worth enqueueing.
    pub fn handles(&self, file: &SourceFile) -> bool {
        self.find(file).is_some()
    }

    /// Run extraction with the production/developer failure policy:
    /// production absorbs the error (warn, zero entities), developer
    /// mode re-raises.
    pub fn extract_file(
        &self,
        file: &SourceFile,
        content: &str,
        dev_mode: bool,
    ) -> Result<Vec<EntityRecord>, ExtractionError> {
        let extractor = match self.find(file) {
            Some(e) => e,
            None => return Ok(Vec::new()),
        };
        match extractor.extract(&file.path, content) {
            Ok(records) => Ok(records),
            Err(err) if dev_mode => Err(err),
            Err(err) => {
                tracing::warn!(
                    extractor = extractor.name(),
                    path = %file.path.display(),
                    %err,
                    "extraction failed; file yields no entities"
                );
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Language;
    use std::path::PathBuf;

    fn file(path: &str, language: Language) -> SourceFile {
        SourceFile {
            path: PathBuf::from(path),
            language,
            tag: language.tag().to_string(),
        }
    }

    #[test]
    fn structural_extractor_beats_fallback() {
        let registry = ExtractorRegistry::with_defaults();
        let py = file("a.py", Language::Python);
        assert_eq!(registry.find(&py).unwrap().name(), "python");
    }

    #[test]
    fn unhandled_languages_fall_back_to_file_records() {
        let registry = ExtractorRegistry::with_defaults();
        let rs = file("main.rs", Language::Rust);
        assert_eq!(registry.find(&rs).unwrap().name(), "file");
    }
}
