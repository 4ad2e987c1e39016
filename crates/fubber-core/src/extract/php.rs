//! PHP extraction.
//!
//! Namespaces wrap the types and functions they enclose; types come
//! first, then their methods, then free functions found after type
//! bodies are blanked out of the working text.

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

static NAMESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[^\S\n]*namespace\s+([\w\\]+)\s*([;{])").unwrap());

static TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[^\S\n]*((?:(?:abstract|final|readonly)\s+)*)(class|interface|trait|enum)\s+(\w+)")
        .unwrap()
});

static METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[^\S\n]*((?:(?:public|protected|private|static|abstract|final)\s+)*)function\s+&?(\w+)\s*\(")
        .unwrap()
});

static FUNCTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[^\S\n]*function\s+&?(\w+)\s*\(").unwrap());

pub struct PhpExtractor;

impl Extractor for PhpExtractor {
    fn name(&self) -> &'static str {
        "php"
    }

    fn matches(&self, file: &SourceFile) -> bool {
        file.language == Language::Php
    }

    fn priority(&self) -> u32 {
        10
    }

    fn extract(&self, path: &Path, content: &str) -> Result<Vec<EntityRecord>, ExtractionError> {
        let index = LineIndex::new(content);
        let lines: Vec<&str> = content.lines().collect();
        let mut records = vec![file_record(path, content, "php")];

        let namespaces = find_namespaces(content);
        for ns in &namespaces {
            let mut record = EntityRecord::new(EntityType::Namespace, ns.name.clone(), "php");
            record.signature_raw = format!("namespace {}", ns.name);
            record.body_raw = content[ns.decl_start..ns.span_end].to_string();
            record.line_start = index.line_of(ns.decl_start);
            record.line_end = index.line_of(ns.span_end.saturating_sub(1));
            records.push(record);
        }

        let mut working = content.to_string();
        for caps in TYPE_RE.captures_iter(content) {
            let m = caps.get(0).unwrap();
            let name = caps[3].to_string();
            let entity_type = match &caps[2] {
                "class" => EntityType::Class,
                "interface" => EntityType::Interface,
                "trait" => EntityType::Trait,
                _ => EntityType::Enum,
            };
            let Some(open) = content[m.end()..].find('{').map(|i| m.end() + i) else {
                continue;
            };
            let Some(close) = match_brace(content, open, true) else {
                continue;
            };

            let sig_start = m.start() + leading_ws(&content[m.start()..]);
            let mut record = EntityRecord::new(entity_type, name.clone(), "php");
            record.signature_raw = collapse_ws(&content[sig_start..open]);
            record.preamble_raw = preamble_at(&lines, index.line_of(sig_start));
            record.body_raw = content[sig_start..=close].to_string();
            record.line_start = index.line_of(sig_start);
            record.line_end = index.line_of(close);
            record.namespace = namespace_at(&namespaces, sig_start);
            records.push(record);

            extract_methods(content, open + 1, close, &name, &index, &lines, &namespaces, &mut records);

            blank_range(&mut working, open, close + 1);
        }

        for caps in FUNCTION_RE.captures_iter(&working) {
            let m = caps.get(0).unwrap();
            let sig_start = m.start() + leading_ws(&working[m.start()..]);
            let Some(mut record) =
                callable_record(content, sig_start, m.end() - 1, &index, &lines)
            else {
                continue;
            };
            record.entity_type = EntityType::Function;
            record.name = caps[1].to_string();
            record.namespace = namespace_at(&namespaces, sig_start);
            records.push(record);
        }

        records[1..].sort_by_key(|r| (r.line_start, u32::MAX - r.line_end));
        Ok(records)
    }
}

struct NamespaceSpan {
    name: String,
    decl_start: usize,
    /// Start of the enclosed region (after `;` or `{`).
    body_start: usize,
    span_end: usize,
}

/// Both namespace forms: `namespace A\B;` extends to the next
/// declaration (or EOF); `namespace A\B { ... }` is brace-delimited.
fn find_namespaces(content: &str) -> Vec<NamespaceSpan> {
    let mut spans: Vec<NamespaceSpan> = Vec::new();
    for caps in NAMESPACE_RE.captures_iter(content) {
        let m = caps.get(0).unwrap();
        let decl_start = m.start() + leading_ws(&content[m.start()..]);
        if let Some(prev) = spans.last_mut() {
            if prev.span_end == content.len() {
                prev.span_end = m.start();
            }
        }
        if &caps[2] == "{" {
            let open = m.end() - 1;
            let close = match_brace(content, open, true).unwrap_or(content.len() - 1);
            spans.push(NamespaceSpan {
                name: caps[1].to_string(),
                decl_start,
                body_start: open + 1,
                span_end: close + 1,
            });
        } else {
            spans.push(NamespaceSpan {
                name: caps[1].to_string(),
                decl_start,
                body_start: m.end(),
                span_end: content.len(),
            });
        }
    }
    spans
}

fn namespace_at(namespaces: &[NamespaceSpan], offset: usize) -> String {
    namespaces
        .iter()
        .filter(|ns| ns.body_start <= offset && offset < ns.span_end)
        .max_by_key(|ns| ns.body_start)
        .map(|ns| ns.name.clone())
        .unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn extract_methods(
    content: &str,
    body_start: usize,
    body_end: usize,
    class_name: &str,
    index: &LineIndex,
    lines: &[&str],
    namespaces: &[NamespaceSpan],
    records: &mut Vec<EntityRecord>,
) {
    let body = &content[body_start..body_end];
    for caps in METHOD_RE.captures_iter(body) {
        let m = caps.get(0).unwrap();
        let sig_start = body_start + m.start() + leading_ws(&body[m.start()..]);
        let Some(mut record) =
            callable_record(content, sig_start, body_start + m.end() - 1, index, lines)
        else {
            continue;
        };
        record.entity_type = EntityType::Method;
        record.name = caps[2].to_string();
        record.enclosing = class_name.to_string();
        record.namespace = namespace_at(namespaces, sig_start);
        record.visibility = visibility_of(&caps[1]);
        records.push(record);
    }
}

/// Shared function/method record: signature runs to the body brace (or
/// the `;` of a body-less declaration), the body is the braced block.
fn callable_record(
    content: &str,
    sig_start: usize,
    paren_open: usize,
    index: &LineIndex,
    lines: &[&str],
) -> Option<EntityRecord> {
    let paren_close = match_paren(content, paren_open)?;
    let bytes = content.as_bytes();

    // Skip a return type between `)` and the body.
    let mut pos = paren_close + 1;
    while pos < bytes.len() && bytes[pos] != b'{' && bytes[pos] != b';' {
        pos += 1;
    }
    if pos >= bytes.len() {
        return None;
    }

    let mut record = EntityRecord::new(EntityType::Function, "", "php");
    record.preamble_raw = preamble_at(lines, index.line_of(sig_start));
    record.line_start = index.line_of(sig_start);

    if bytes[pos] == b'{' {
        let close = match_brace(content, pos, true)?;
        record.signature_raw = collapse_ws(&content[sig_start..pos]);
        record.body_raw = content[sig_start..=close].to_string();
        record.line_end = index.line_of(close);
    } else {
        // Abstract or interface declaration.
        record.signature_raw = collapse_ws(content[sig_start..pos].trim_end());
        record.body_raw = content[sig_start..=pos].to_string();
        record.line_end = index.line_of(pos);
    }
    Some(record)
}

fn visibility_of(modifiers: &str) -> String {
    for vis in ["public", "protected", "private"] {
        if modifiers.split_whitespace().any(|m| m == vis) {
            return vis.to_string();
        }
    }
    "public".to_string()
}

fn leading_ws(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

fn preamble_at(lines: &[&str], line: u32) -> String {
    let idx = line.saturating_sub(1) as usize;
    if idx >= lines.len() {
        return String::new();
    }
    preceding_run(lines, idx, |l| {
        l.starts_with("//")
            || l.starts_with('#')
            || l.starts_with("/*")
            || l.starts_with('*')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn extract(content: &str) -> Vec<EntityRecord> {
        PhpExtractor
            .extract(&PathBuf::from("User.php"), content)
            .unwrap()
    }

    #[test]
    fn namespace_class_and_methods() {
        let content = "\
<?php
namespace App\\Models;

/**
 * A user.
 */
class User
{
    private $id;

    public function getId(): int
    {
        return $this->id;
    }

    protected static function table(): string
    {
        return 'users';
    }
}
";
        let records = extract(content);

        let ns = records
            .iter()
            .find(|r| r.entity_type == EntityType::Namespace)
            .unwrap();
        assert_eq!(ns.name, "App\\Models");

        let class = records
            .iter()
            .find(|r| r.entity_type == EntityType::Class)
            .unwrap();
        assert_eq!(class.name, "User");
        assert_eq!(class.namespace, "App\\Models");
        assert!(class.preamble_raw.contains("A user."));
        assert_eq!(class.signature_raw, "class User");

        let methods: Vec<(&str, &str)> = records
            .iter()
            .filter(|r| r.entity_type == EntityType::Method)
            .map(|r| (r.name.as_str(), r.visibility.as_str()))
            .collect();
        assert_eq!(methods, vec![("getId", "public"), ("table", "protected")]);

        let get_id = records.iter().find(|r| r.name == "getId").unwrap();
        assert_eq!(get_id.enclosing, "User");
        assert_eq!(get_id.namespace, "App\\Models");
        assert_eq!(get_id.signature_raw, "public function getId(): int");
    }

    #[test]
    fn free_functions_not_confused_with_methods() {
        let content = "\
<?php
class Greeter
{
    public function hello(): string { return 'hi'; }
}

function shout(string $word): string
{
    return strtoupper($word);
}
";
        let records = extract(content);
        let functions: Vec<&str> = records
            .iter()
            .filter(|r| r.entity_type == EntityType::Function)
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(functions, vec!["shout"]);
        assert!(records.iter().any(|r| r.name == "hello" && r.entity_type == EntityType::Method));
    }

    #[test]
    fn interface_and_trait_and_enum() {
        let content = "\
<?php
interface Jsonable
{
    public function toJson(): string;
}

trait HasTimestamps
{
    public function touch(): void {}
}

enum Status
{
    case Active;
    case Disabled;
}
";
        let records = extract(content);
        let kinds: Vec<(EntityType, &str)> = records[1..]
            .iter()
            .map(|r| (r.entity_type, r.name.as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (EntityType::Interface, "Jsonable"),
                (EntityType::Method, "toJson"),
                (EntityType::Trait, "HasTimestamps"),
                (EntityType::Method, "touch"),
                (EntityType::Enum, "Status"),
            ]
        );
        // Body-less interface method ends at its semicolon.
        let to_json = records.iter().find(|r| r.name == "toJson").unwrap();
        assert_eq!(to_json.signature_raw, "public function toJson(): string");
        assert_eq!((to_json.line_start, to_json.line_end), (4, 4));
    }

    #[test]
    fn default_visibility_is_public() {
        let content = "\
<?php
class C
{
    function plain() { return 1; }
}
";
        let records = extract(content);
        let plain = records.iter().find(|r| r.name == "plain").unwrap();
        assert_eq!(plain.visibility, "public");
    }
}
