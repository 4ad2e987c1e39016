//! JavaScript/TypeScript extraction.
//!
//! A hybrid scan: regexes locate signature openings (`class`,
//! `function`, arrow-assigned bindings), a manual brace matcher that
//! honors comments and quoted strings consumes the body. Class bodies
//! are blanked before the free-function pass so methods are not counted
//! twice.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::ExtractionError;
use crate::scanner::{Language, SourceFile};

use super::registry::Extractor;
use super::text::{
    blank_range, collapse_ws, file_record, match_brace, match_paren, preceding_run, LineIndex,
};
use super::types::{EntityRecord, EntityType};

static NAMESPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[^\S\n]*(?:export\s+)?(?:declare\s+)?(namespace|module)\s+([A-Za-z_$][\w$.]*)\s*\{").unwrap()
});

static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[^\S\n]*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)").unwrap()
});

static FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[^\S\n]*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)\s*\(").unwrap()
});

static ARROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[^\S\n]*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)[^=\n]*=\s*(?:async\s+)?(?:\([^()\n]*\)|[A-Za-z_$][\w$]*)\s*=>",
    )
    .unwrap()
});

static METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[^\S\n]*(?:(public|private|protected)\s+)?(?:static\s+)?(?:async\s+)?(?:get\s+|set\s+)?(?:\*\s*)?([A-Za-z_$#][\w$]*)\s*\(",
    )
    .unwrap()
});

/// Control keywords a method-shaped match must not be.
const NOT_METHODS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "function", "new", "typeof", "do", "else",
];

pub struct JsExtractor;

impl Extractor for JsExtractor {
    fn name(&self) -> &'static str {
        "javascript"
    }

    fn matches(&self, file: &SourceFile) -> bool {
        matches!(file.language, Language::JavaScript | Language::TypeScript)
    }

    fn priority(&self) -> u32 {
        10
    }

    fn extract(&self, path: &Path, content: &str) -> Result<Vec<EntityRecord>, ExtractionError> {
        let tag = if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("ts") || e.eq_ignore_ascii_case("tsx"))
        {
            "typescript"
        } else {
            "javascript"
        };

        let index = LineIndex::new(content);
        let lines: Vec<&str> = content.lines().collect();
        let mut records = vec![file_record(path, content, tag)];

        let namespaces = find_namespaces(content);
        for ns in &namespaces {
            let mut record = EntityRecord::new(ns.entity_type, ns.name.clone(), tag);
            record.signature_raw = collapse_ws(&content[ns.sig_start..ns.body_open]);
            record.body_raw = content[ns.sig_start..=ns.body_close].to_string();
            record.line_start = index.line_of(ns.sig_start);
            record.line_end = index.line_of(ns.body_close);
            records.push(record);
        }

        let mut working = content.to_string();
        for caps in CLASS_RE.captures_iter(content) {
            let m = caps.get(0).unwrap();
            let name = caps[1].to_string();
            let Some(open) = content[m.end()..].find('{').map(|i| m.end() + i) else {
                continue;
            };
            let Some(close) = match_brace(content, open, false) else {
                continue;
            };

            let sig_start = m.start() + leading_ws(&content[m.start()..]);
            let mut record = EntityRecord::new(EntityType::Class, name.clone(), tag);
            record.signature_raw = collapse_ws(&content[sig_start..open]);
            record.preamble_raw = preamble_at(&lines, index.line_of(sig_start));
            record.body_raw = content[sig_start..=close].to_string();
            record.line_start = index.line_of(sig_start);
            record.line_end = index.line_of(close);
            record.namespace = namespace_at(&namespaces, sig_start);
            records.push(record);

            extract_methods(
                content,
                open + 1,
                close,
                &name,
                tag,
                &index,
                &lines,
                &namespaces,
                &mut records,
            );

            // Hide the body from the free-function pass.
            blank_range(&mut working, open, close + 1);
        }

        for caps in FUNCTION_RE.captures_iter(&working) {
            let m = caps.get(0).unwrap();
            let name = caps[1].to_string();
            let sig_start = m.start() + leading_ws(&working[m.start()..]);
            if let Some(mut record) =
                function_record(&working, content, sig_start, m.end() - 1, &index, &lines)
            {
                record.name = name;
                record.entity_type = EntityType::Function;
                record.language = tag.to_string();
                record.namespace = namespace_at(&namespaces, sig_start);
                records.push(record);
            }
        }

        for caps in ARROW_RE.captures_iter(&working) {
            let m = caps.get(0).unwrap();
            let name = caps[1].to_string();
            let sig_start = m.start() + leading_ws(&working[m.start()..]);
            let body_end = arrow_end(&working, m.end());

            let mut record = EntityRecord::new(EntityType::ArrowFunction, name, tag);
            record.signature_raw = collapse_ws(&working[sig_start..m.end()]);
            record.preamble_raw = preamble_at(&lines, index.line_of(sig_start));
            record.body_raw = content[sig_start..body_end].to_string();
            record.line_start = index.line_of(sig_start);
            record.line_end = index.line_of(body_end.saturating_sub(1));
            record.namespace = namespace_at(&namespaces, sig_start);
            records.push(record);
        }

        records[1..].sort_by_key(|r| (r.line_start, u32::MAX - r.line_end));
        Ok(records)
    }
}

struct NamespaceSpan {
    entity_type: EntityType,
    name: String,
    sig_start: usize,
    body_open: usize,
    body_close: usize,
}

fn find_namespaces(content: &str) -> Vec<NamespaceSpan> {
    let mut spans = Vec::new();
    for caps in NAMESPACE_RE.captures_iter(content) {
        let m = caps.get(0).unwrap();
        let open = m.end() - 1;
        let Some(close) = match_brace(content, open, false) else {
            continue;
        };
        let entity_type = if &caps[1] == "namespace" {
            EntityType::Namespace
        } else {
            EntityType::Module
        };
        spans.push(NamespaceSpan {
            entity_type,
            name: caps[2].to_string(),
            sig_start: m.start() + leading_ws(&content[m.start()..]),
            body_open: open,
            body_close: close,
        });
    }
    spans
}

/// The innermost namespace whose body contains `offset`.
fn namespace_at(namespaces: &[NamespaceSpan], offset: usize) -> String {
    namespaces
        .iter()
        .filter(|ns| ns.body_open < offset && offset < ns.body_close)
        .max_by_key(|ns| ns.body_open)
        .map(|ns| ns.name.clone())
        .unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn extract_methods(
    content: &str,
    body_start: usize,
    body_end: usize,
    class_name: &str,
    tag: &str,
    index: &LineIndex,
    lines: &[&str],
    namespaces: &[NamespaceSpan],
    records: &mut Vec<EntityRecord>,
) {
    let body = &content[body_start..body_end];
    for caps in METHOD_RE.captures_iter(body) {
        let name = caps[2].to_string();
        if NOT_METHODS.contains(&name.as_str()) {
            continue;
        }
        let m = caps.get(0).unwrap();
        let paren_open = body_start + m.end() - 1;
        let Some(paren_close) = match_paren(content, paren_open) else {
            continue;
        };
        // Methods have a block; a call expression at line start does not.
        let Some(brace_open) = next_significant(content, paren_close + 1, body_end) else {
            continue;
        };
        if content.as_bytes()[brace_open] != b'{' {
            continue;
        }
        let Some(brace_close) = match_brace(content, brace_open, false) else {
            continue;
        };

        let sig_start = body_start + m.start() + leading_ws(&body[m.start()..]);
        let mut record = EntityRecord::new(EntityType::Method, name, tag);
        record.enclosing = class_name.to_string();
        record.signature_raw = collapse_ws(&content[sig_start..brace_open]);
        record.preamble_raw = preamble_at(lines, index.line_of(sig_start));
        record.body_raw = content[sig_start..=brace_close].to_string();
        record.line_start = index.line_of(sig_start);
        record.line_end = index.line_of(brace_close);
        record.namespace = namespace_at(namespaces, sig_start);
        record.visibility = caps.get(1).map(|v| v.as_str().to_string()).unwrap_or_default();
        records.push(record);
    }
}

/// Build a function record: body is the braced block, or up to the `;`
/// for declaration-only signatures.
fn function_record(
    working: &str,
    content: &str,
    sig_start: usize,
    paren_open: usize,
    index: &LineIndex,
    lines: &[&str],
) -> Option<EntityRecord> {
    let paren_close = match_paren(working, paren_open)?;
    let mut record = EntityRecord::new(EntityType::Function, "", "");
    record.preamble_raw = preamble_at(lines, index.line_of(sig_start));
    record.line_start = index.line_of(sig_start);

    let after = next_significant(working, paren_close + 1, working.len());
    match after {
        Some(pos) if working.as_bytes()[pos] == b'{' => {
            let close = match_brace(working, pos, false)?;
            record.signature_raw = collapse_ws(&working[sig_start..pos]);
            record.body_raw = content[sig_start..=close].to_string();
            record.line_end = index.line_of(close);
        }
        _ => {
            // Declaration-only (TS overloads, `declare function`).
            let end = working[paren_close..]
                .find(';')
                .map(|i| paren_close + i)
                .unwrap_or(paren_close);
            record.signature_raw = collapse_ws(&working[sig_start..=end]);
            record.body_raw = content[sig_start..=end].to_string();
            record.line_end = index.line_of(end);
        }
    }
    Some(record)
}

/// Where an arrow function's body ends: the matching brace for a block
/// body, otherwise the end of the statement line.
fn arrow_end(text: &str, after_arrow: usize) -> usize {
    match next_significant(text, after_arrow, text.len()) {
        Some(pos) if text.as_bytes()[pos] == b'{' => match_brace(text, pos, false)
            .map(|c| c + 1)
            .unwrap_or(text.len()),
        _ => text[after_arrow..]
            .find(|c| c == ';' || c == '\n')
            .map(|i| after_arrow + i + 1)
            .unwrap_or(text.len()),
    }
}

/// First non-whitespace byte at or after `from`, below `limit`.
fn next_significant(text: &str, from: usize, limit: usize) -> Option<usize> {
    text[from..limit.min(text.len())]
        .bytes()
        .position(|b| !b.is_ascii_whitespace())
        .map(|i| from + i)
}

fn leading_ws(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

/// Comment/decorator lines immediately above a 1-indexed line.
fn preamble_at(lines: &[&str], line: u32) -> String {
    let idx = line.saturating_sub(1) as usize;
    if idx >= lines.len() {
        return String::new();
    }
    preceding_run(lines, idx, |l| {
        l.starts_with("//") || l.starts_with("/*") || l.starts_with('*') || l.starts_with('@')
    })
}
