//! Markdown extraction: the file plus one record per top-level heading.

use std::path::Path;

use crate::errors::ExtractionError;
use crate::scanner::{Language, SourceFile};

use super::registry::Extractor;
use super::text::file_record;
use super::types::{EntityRecord, EntityType};

pub struct MarkdownExtractor;

impl Extractor for MarkdownExtractor {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn matches(&self, file: &SourceFile) -> bool {
        file.language == Language::Markdown
    }

    fn priority(&self) -> u32 {
        10
    }

    fn extract(&self, path: &Path, content: &str) -> Result<Vec<EntityRecord>, ExtractionError> {
        let mut records = vec![file_record(path, content, "markdown")];
        let lines: Vec<&str> = content.lines().collect();

        let mut headings: Vec<(usize, String)> = Vec::new();
        let mut in_fence = false;
        for (idx, line) in lines.iter().enumerate() {
            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
                continue;
            }
            if !in_fence && line.starts_with("# ") {
                headings.push((idx, line[2..].trim().to_string()));
            }
        }

        for (i, (line_idx, title)) in headings.iter().enumerate() {
            let end_idx = headings
                .get(i + 1)
                .map(|(next, _)| next - 1)
                .unwrap_or(lines.len().saturating_sub(1));

            let mut record = EntityRecord::new(EntityType::MdHeading1, title.clone(), "markdown");
            record.signature_raw = format!("# {title}");
            record.body_raw = lines[*line_idx..=end_idx].join("\n");
            record.line_start = *line_idx as u32 + 1;
            record.line_end = end_idx as u32 + 1;
            records.push(record);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn extract(content: &str) -> Vec<EntityRecord> {
        MarkdownExtractor
            .extract(&PathBuf::from("README.md"), content)
            .unwrap()
    }

    #[test]
    fn heading_sections_span_to_next_heading() {
        let content = "\
# Install

Run the installer.

# Usage

Call it.
";
        let records = extract(content);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].name, "Install");
        assert_eq!((records[1].line_start, records[1].line_end), (1, 4));
        assert_eq!(records[2].name, "Usage");
        assert_eq!((records[2].line_start, records[2].line_end), (5, 7));
    }

    #[test]
    fn subheadings_are_not_records() {
        let records = extract("# Top\n## Sub\ntext\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "Top");
    }

    #[test]
    fn hash_inside_code_fence_ignored() {
        let records = extract("# Real\n```sh\n# comment, not a heading\n```\n");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn file_record_always_present() {
        let records = extract("no headings here\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entity_type, EntityType::File);
    }
}
