//! CSS extraction: one record per selector-block pair.
//!
//! `@media` blocks are walked recursively so the rules inside them are
//! records of their own; `@keyframes` bodies are kept whole.

use std::path::Path;

use crate::errors::ExtractionError;
use crate::scanner::{Language, SourceFile};

use super::registry::Extractor;
use super::text::{collapse_ws, file_record, match_brace, LineIndex};
use super::types::{EntityRecord, EntityType};

pub struct CssExtractor;

impl Extractor for CssExtractor {
    fn name(&self) -> &'static str {
        "css"
    }

    fn matches(&self, file: &SourceFile) -> bool {
        file.language == Language::Css
    }

    fn priority(&self) -> u32 {
        10
    }

    fn extract(&self, path: &Path, content: &str) -> Result<Vec<EntityRecord>, ExtractionError> {
        let index = LineIndex::new(content);
        let mut records = vec![file_record(path, content, "css")];
        scan_region(content, 0, content.len(), &index, &mut records);
        Ok(records)
    }
}

fn scan_region(
    content: &str,
    start: usize,
    end: usize,
    index: &LineIndex,
    records: &mut Vec<EntityRecord>,
) {
    let bytes = content.as_bytes();
    let mut i = start;
    let mut selector_start = start;

    while i < end {
        match bytes[i] {
            b'/' if i + 1 < end && bytes[i + 1] == b'*' => {
                i += 2;
                while i + 1 < end && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i = (i + 2).min(end);
                selector_start = i;
            }
            b';' => {
                // Block-less at-rule (@import, @charset) or stray.
                i += 1;
                selector_start = i;
            }
            b'{' => {
                let Some(close) = match_brace(content, i, false) else {
                    return;
                };
                let selector = collapse_ws(&content[selector_start..i]);
                if !selector.is_empty() {
                    let sel_offset = selector_start
                        + content[selector_start..i]
                            .find(|c: char| !c.is_whitespace())
                            .unwrap_or(0);
                    let mut record =
                        EntityRecord::new(rule_type(&selector), selector.clone(), "css");
                    record.signature_raw = selector.clone();
                    record.body_raw = content[sel_offset..=close].to_string();
                    record.line_start = index.line_of(sel_offset);
                    record.line_end = index.line_of(close);
                    records.push(record);

                    if selector.starts_with("@media") || selector.starts_with("@supports") {
                        scan_region(content, i + 1, close, index, records);
                    }
                }
                i = close + 1;
                selector_start = i;
            }
            _ => i += 1,
        }
    }
}

fn rule_type(selector: &str) -> EntityType {
    if selector.starts_with("@media") {
        EntityType::CssMediaQuery
    } else if selector.starts_with("@keyframes") || selector.starts_with("@-") {
        EntityType::CssKeyframes
    } else if selector.starts_with('@') {
        EntityType::CssAtRule
    } else {
        EntityType::CssRule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn extract(content: &str) -> Vec<EntityRecord> {
        CssExtractor
            .extract(&PathBuf::from("style.css"), content)
            .unwrap()
    }

    #[test]
    fn plain_rules() {
        let content = "\
body { margin: 0; }

.nav a:hover,
.nav a:focus {
  color: #fff;
}
";
        let records = extract(content);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].entity_type, EntityType::CssRule);
        assert_eq!(records[1].name, "body");
        assert_eq!(records[2].name, ".nav a:hover, .nav a:focus");
        assert_eq!((records[2].line_start, records[2].line_end), (3, 6));
    }

    #[test]
    fn at_rule_tagging() {
        let content = "\
@media (max-width: 600px) {
  .sidebar { display: none; }
}
@keyframes spin {
  from { transform: rotate(0); }
  to { transform: rotate(360deg); }
}
@font-face {
  font-family: 'Inter';
}
";
        let records = extract(content);
        let kinds: Vec<EntityType> = records[1..].iter().map(|r| r.entity_type).collect();
        assert_eq!(
            kinds,
            vec![
                EntityType::CssMediaQuery,
                EntityType::CssRule,
                EntityType::CssKeyframes,
                EntityType::CssAtRule,
            ]
        );
        // The rule inside the media query is its own record.
        assert_eq!(records[2].name, ".sidebar");
    }

    #[test]
    fn comments_do_not_become_selectors() {
        let content = "/* header { } */\nh1 { font-size: 2rem; }\n";
        let records = extract(content);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "h1");
    }

    #[test]
    fn hex_colors_do_not_end_blocks() {
        let content = ".a { color: #abcdef; }\n.b { color: red; }\n";
        let records = extract(content);
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn import_statements_skipped() {
        let content = "@import url('x.css');\nbody { margin: 0; }\n";
        let records = extract(content);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "body");
    }
}
