//! Shared text scanning utilities for the extractors.

use std::path::Path;

use super::types::{EntityRecord, EntityType};

/// Collapse every whitespace run to a single space and trim.
pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Number of lines in a text, counting a trailing partial line. Empty
/// text is one (empty) line so ranges stay 1-indexed and inclusive.
pub fn line_count(text: &str) -> u32 {
    if text.is_empty() {
        return 1;
    }
    let mut count = text.bytes().filter(|&b| b == b'\n').count() as u32;
    if !text.ends_with('\n') {
        count += 1;
    }
    count.max(1)
}

/// Byte offset → 1-indexed line number lookup.
pub struct LineIndex {
    /// Byte offset of each line start.
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> LineIndex {
        let mut starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        LineIndex { starts }
    }

    pub fn line_of(&self, offset: usize) -> u32 {
        match self.starts.binary_search(&offset) {
            Ok(idx) => idx as u32 + 1,
            Err(idx) => idx as u32,
        }
    }
}

/// The file-level record every extractor emits first.
pub fn file_record(path: &Path, content: &str, language: &str) -> EntityRecord {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut record = EntityRecord::new(EntityType::File, name, language);
    record.body_raw = content.to_string();
    record.line_start = 1;
    record.line_end = line_count(content);
    record
}

/// Find the byte offset of the `}` matching the `{` at `open`, honoring
/// line comments, block comments and quoted strings with backslash
/// escapes. `hash_comments` additionally treats `#` as a line comment
/// (PHP); it must stay off for CSS (`#fff`) and JS (`#private`).
/// Returns None when the text ends first.
pub fn match_brace(text: &str, open: usize, hash_comments: bool) -> Option<usize> {
    match_delimiter(text, open, b'{', b'}', hash_comments)
}

/// As `match_brace`, for parentheses.
pub fn match_paren(text: &str, open: usize) -> Option<usize> {
    match_delimiter(text, open, b'(', b')', false)
}

fn match_delimiter(
    text: &str,
    open: usize,
    open_byte: u8,
    close_byte: u8,
    hash_comments: bool,
) -> Option<usize> {
    let bytes = text.as_bytes();
    debug_assert_eq!(bytes.get(open), Some(&open_byte));

    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        if b == open_byte {
            depth += 1;
            i += 1;
            continue;
        }
        if b == close_byte {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
            i += 1;
            continue;
        }
        match b {
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'/' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'*' => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 2;
            }
            b'#' if hash_comments => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            quote @ (b'\'' | b'"' | b'`') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

/// Blank a byte range in place, preserving newlines so line numbers of
/// later matches stay valid.
pub fn blank_range(text: &mut String, start: usize, end: usize) {
    let blanked: String = text[start..end]
        .chars()
        .map(|c| if c == '\n' { '\n' } else { ' ' })
        .collect();
    text.replace_range(start..end, &blanked);
}

/// The contiguous run of comment/decorator/attribute lines immediately
/// above `line_idx` (0-indexed into `lines`), stopping at the first
/// blank line. `is_preamble` decides which line shapes belong.
pub fn preceding_run<F>(lines: &[&str], line_idx: usize, is_preamble: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut first = line_idx;
    while first > 0 {
        let above = lines[first - 1].trim();
        if above.is_empty() || !is_preamble(above) {
            break;
        }
        first -= 1;
    }
    if first == line_idx {
        return String::new();
    }
    lines[first..line_idx].join("\n")
}
