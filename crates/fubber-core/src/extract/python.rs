//! Python extraction: indentation-driven block detection.
//!
//! `def`/`class` headers are located by regex; a block extends over the
//! following lines with deeper indentation. The preamble is the run of
//! decorator and comment lines immediately above the header (stopping
//! at a blank line) plus the docstring opening the block body.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::ExtractionError;
use crate::scanner::{Language, SourceFile};

use super::registry::Extractor;
use super::text::{collapse_ws, file_record, preceding_run};
use super::types::{EntityRecord, EntityType};

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)(?:(class)\s+([A-Za-z_][A-Za-z0-9_]*)|(?:async\s+)?(def)\s+([A-Za-z_][A-Za-z0-9_]*))")
        .unwrap()
});

static DOCSTRING_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*[rRbBuU]{0,2}("""|''')"#).unwrap());

#[derive(Debug, Clone, Copy, PartialEq)]
enum HeaderKind {
    Class,
    Def,
}

#[derive(Debug)]
struct Header {
    kind: HeaderKind,
    name: String,
    indent: usize,
    line_idx: usize,
    /// Last line of the header itself (multi-line signatures).
    sig_end_idx: usize,
    end_idx: usize,
}

pub struct PythonExtractor;

impl Extractor for PythonExtractor {
    fn name(&self) -> &'static str {
        "python"
    }

    fn matches(&self, file: &SourceFile) -> bool {
        file.language == Language::Python
    }

    fn priority(&self) -> u32 {
        10
    }

    fn extract(&self, path: &Path, content: &str) -> Result<Vec<EntityRecord>, ExtractionError> {
        let mut records = vec![file_record(path, content, "python")];
        let lines: Vec<&str> = content.lines().collect();

        let headers = find_headers(&lines);
        for (i, header) in headers.iter().enumerate() {
            let mut record = EntityRecord::new(
                match header.kind {
                    HeaderKind::Class => EntityType::Class,
                    HeaderKind::Def => EntityType::Function,
                },
                header.name.clone(),
                "python",
            );
            record.line_start = header.line_idx as u32 + 1;
            record.line_end = header.end_idx as u32 + 1;
            record.signature_raw = signature_of(&lines, header);
            record.body_raw = lines[header.line_idx..=header.end_idx].join("\n");
            record.visibility = visibility_of(&header.name).to_string();

            let mut preamble = preceding_run(&lines, header.line_idx, |line| {
                line.starts_with('@') || line.starts_with('#')
            });
            if let Some(doc) = docstring_of(&lines, header) {
                if preamble.is_empty() {
                    preamble = doc;
                } else {
                    preamble.push('\n');
                    preamble.push_str(&doc);
                }
            }
            record.preamble_raw = preamble;

            if header.kind == HeaderKind::Def {
                if let Some(owner) = enclosing_class(&headers[..i], header) {
                    record.entity_type = EntityType::Method;
                    record.enclosing = owner;
                }
            }
            records.push(record);
        }

        Ok(records)
    }
}

fn find_headers(lines: &[&str]) -> Vec<Header> {
    let mut headers = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if let Some(caps) = HEADER_RE.captures(line) {
            let indent = caps[1].len();
            let (kind, name) = if caps.get(2).is_some() {
                (HeaderKind::Class, caps[3].to_string())
            } else {
                (HeaderKind::Def, caps[5].to_string())
            };
            let sig_end_idx = signature_extent(lines, idx);
            headers.push(Header {
                kind,
                name,
                indent,
                line_idx: idx,
                sig_end_idx,
                end_idx: block_end(lines, idx, sig_end_idx, indent),
            });
        }
    }
    headers
}

/// Last line of the header declaration: the line carrying the colon
/// that closes it at bracket depth zero.
fn signature_extent(lines: &[&str], header_idx: usize) -> usize {
    let mut depth = 0i32;
    for (offset, line) in lines[header_idx..].iter().enumerate() {
        for c in line.chars() {
            match c {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                ':' if depth == 0 => return header_idx + offset,
                _ => {}
            }
        }
    }
    header_idx
}

/// Last line of the indentation block: the final non-blank line after
/// the header's signature indented deeper than the header.
fn block_end(lines: &[&str], header_idx: usize, sig_end_idx: usize, header_indent: usize) -> usize {
    let mut end = sig_end_idx.max(header_idx);
    for (offset, line) in lines[sig_end_idx + 1..].iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let indent = line.len() - line.trim_start().len();
        if indent <= header_indent {
            break;
        }
        end = sig_end_idx + 1 + offset;
    }
    end
}

/// The header declaration up to its terminating colon, collapsed.
fn signature_of(lines: &[&str], header: &Header) -> String {
    let mut collected = String::new();
    let mut depth = 0i32;
    'outer: for line in &lines[header.line_idx..=header.sig_end_idx] {
        for (i, c) in line.char_indices() {
            match c {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                ':' if depth == 0 => {
                    collected.push_str(&line[..=i]);
                    break 'outer;
                }
                _ => {}
            }
        }
        collected.push_str(line);
        collected.push(' ');
    }
    collapse_ws(&collected)
}

/// The first triple-quoted string at the start of the block body.
fn docstring_of(lines: &[&str], header: &Header) -> Option<String> {
    // A one-line def has no separate body.
    let mut idx = header.sig_end_idx + 1;
    while idx <= header.end_idx && lines[idx].trim().is_empty() {
        idx += 1;
    }
    if idx > header.end_idx {
        return None;
    }
    let caps = DOCSTRING_OPEN.captures(lines[idx])?;
    let delim = caps[1].to_string();

    let first = lines[idx];
    let after_open = &first[first.find(&delim)? + delim.len()..];
    if after_open.contains(&delim) {
        return Some(first.trim().to_string());
    }
    let mut doc = vec![*lines.get(idx)?];
    for &line in &lines[idx + 1..=header.end_idx.min(lines.len() - 1)] {
        doc.push(line);
        if line.contains(&delim) {
            break;
        }
    }
    Some(doc.join("\n").trim().to_string())
}

/// Naming-derived visibility: `__x` (not dunder) private, `_x` protected.
fn visibility_of(name: &str) -> &'static str {
    if name.starts_with("__") && !name.ends_with("__") {
        "private"
    } else if name.starts_with('_') {
        "protected"
    } else {
        "public"
    }
}

/// The innermost earlier class whose block contains this def.
fn enclosing_class(earlier: &[Header], def: &Header) -> Option<String> {
    earlier
        .iter()
        .filter(|h| {
            h.kind == HeaderKind::Class
                && h.line_idx < def.line_idx
                && def.line_idx <= h.end_idx
                && h.indent < def.indent
        })
        .max_by_key(|h| h.indent)
        .map(|h| h.name.clone())
}
