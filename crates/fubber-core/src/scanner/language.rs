//! Language classification from file extensions and shebang lines.

use serde::{Deserialize, Serialize};

/// Languages the extractors understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Php,
    Css,
    JavaScript,
    TypeScript,
    Markdown,
    Html,
    Python,
    Ruby,
    Go,
    Rust,
    /// Extension-less executable starting with `#!`.
    Script,
}

impl Language {
    /// Classify a file extension.
    pub fn from_extension(ext: &str) -> Option<Language> {
        match ext.to_ascii_lowercase().as_str() {
            "php" | "phtml" => Some(Language::Php),
            "css" | "scss" | "sass" | "less" => Some(Language::Css),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "ts" | "tsx" => Some(Language::TypeScript),
            "md" | "markdown" => Some(Language::Markdown),
            "html" | "htm" => Some(Language::Html),
            "py" => Some(Language::Python),
            "rb" => Some(Language::Ruby),
            "go" => Some(Language::Go),
            "rs" => Some(Language::Rust),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Language::Php => "php",
            Language::Css => "css",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Markdown => "markdown",
            Language::Html => "html",
            Language::Python => "python",
            Language::Ruby => "ruby",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Script => "script",
        }
    }
}

/// Refine a language tag from a shebang line (`#!/usr/bin/env python3`).
pub fn interpreter_tag(shebang_line: &str) -> String {
    let rest = shebang_line.trim_start_matches("#!").trim();
    let mut words = rest.split_whitespace();
    let mut interpreter = words.next().unwrap_or("");
    if let Some(name) = interpreter.rsplit('/').next() {
        interpreter = name;
    }
    if interpreter == "env" {
        interpreter = words.next().unwrap_or("");
        if let Some(name) = interpreter.rsplit('/').next() {
            interpreter = name;
        }
    }

    for known in ["python", "bash", "node", "ruby", "php", "perl", "sh"] {
        if interpreter.contains(known) {
            return known.to_string();
        }
    }
    if interpreter.is_empty() {
        "script".to_string()
    } else {
        interpreter.to_string()
    }
}
