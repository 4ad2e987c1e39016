//! Inheritable ignore rules.
//!
//! Every directory owns a rule set: the project root carries the global
//! excludes (dot-directories and well-known build/dependency segments),
//! each descendant adds the lines of its `.gitignore`. A child inherits
//! its parent's compiled rules by reference; compiled sets are memoized
//! per directory path so the walk and the updater share one cache.
//!
//! `!`-prefixed lines are re-include guards: a path matching one is kept
//! even when the combined exclude set matches it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use regex::Regex;

use crate::errors::ScanError;

/// One compiled ignore line.
#[derive(Debug)]
pub struct IgnoreRule {
    pub regex: Regex,
    pub negate: bool,
}

/// Compiled rules for one directory, chained to the parent's.
#[derive(Debug)]
pub struct DirRules {
    dir: PathBuf,
    parent: Option<Rc<DirRules>>,
    rules: Vec<IgnoreRule>,
}

/// Ignore decisions for one project root.
#[derive(Debug)]
pub struct IgnoreMatcher {
    root: PathBuf,
    cache: RefCell<HashMap<PathBuf, Rc<DirRules>>>,
}

impl IgnoreMatcher {
    /// Build the matcher for a project root: global excludes plus the
    /// root's own `.gitignore`.
    pub fn new(root: &Path) -> IgnoreMatcher {
        let mut rules = default_rules();
        rules.extend(load_gitignore(root));
        let node = Rc::new(DirRules {
            dir: root.to_path_buf(),
            parent: None,
            rules,
        });
        let mut cache = HashMap::new();
        cache.insert(root.to_path_buf(), node);
        IgnoreMatcher {
            root: root.to_path_buf(),
            cache: RefCell::new(cache),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `path` (absolute, under the root) is excluded. Directory
    /// paths must be flagged so trailing-slash patterns apply.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        let parent = match path.parent() {
            Some(p) => p,
            None => return false,
        };
        let node = match self.rules_for(parent) {
            Some(n) => n,
            None => return false,
        };

        let mut excluded = false;
        let mut reincluded = false;
        let mut current: Option<&Rc<DirRules>> = Some(&node);
        while let Some(n) = current {
            if let Ok(rel) = path.strip_prefix(&n.dir) {
                let mut probe = rel.to_string_lossy().replace('\\', "/");
                if is_dir {
                    probe.push('/');
                }
                for rule in &n.rules {
                    if rule.regex.is_match(&probe) {
                        if rule.negate {
                            reincluded = true;
                        } else {
                            excluded = true;
                        }
                    }
                }
            }
            current = n.parent.as_ref();
        }
        excluded && !reincluded
    }

    /// The rule chain applying to entries of `dir`, building and
    /// memoizing any missing levels between the root and `dir`.
    fn rules_for(&self, dir: &Path) -> Option<Rc<DirRules>> {
        if let Some(node) = self.cache.borrow().get(dir) {
            return Some(node.clone());
        }
        let rel = dir.strip_prefix(&self.root).ok()?.to_path_buf();

        let mut current = self.cache.borrow().get(&self.root)?.clone();
        let mut acc = self.root.clone();
        for component in rel.components() {
            acc.push(component);
            let cached = self.cache.borrow().get(&acc).cloned();
            current = match cached {
                Some(node) => node,
                None => {
                    let node = Rc::new(DirRules {
                        dir: acc.clone(),
                        parent: Some(current.clone()),
                        rules: load_gitignore(&acc),
                    });
                    self.cache.borrow_mut().insert(acc.clone(), node.clone());
                    node
                }
            };
        }
        Some(current)
    }
}

/// Segments excluded everywhere, regardless of gitignores.
const EXCLUDED_SEGMENTS: &str = "node_modules|vendor|__pycache__|dist|build|coverage";

fn default_rules() -> Vec<IgnoreRule> {
    let sources = [
        // Any dot-directory.
        r"(^|/)\.[^/]+/".to_string(),
        format!(r"(^|/)({EXCLUDED_SEGMENTS})($|/)"),
    ];
    sources
        .into_iter()
        .map(|src| IgnoreRule {
            regex: Regex::new(&src).expect("default ignore pattern"),
            negate: false,
        })
        .collect()
}

/// Compile the `.gitignore` of `dir`, if any. Bad lines are skipped
/// with a warning.
fn load_gitignore(dir: &Path) -> Vec<IgnoreRule> {
    let path = dir.join(".gitignore");
    let contents = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let mut rules = Vec::new();
    for line in contents.lines() {
        match compile_line(dir, line) {
            Ok(Some(rule)) => rules.push(rule),
            Ok(None) => {}
            Err(err) => tracing::warn!(%err, "skipping ignore pattern"),
        }
    }
    rules
}

fn compile_line(dir: &Path, line: &str) -> Result<Option<IgnoreRule>, ScanError> {
    let (source, negate) = match pattern_to_regex(line) {
        Some(parts) => parts,
        None => return Ok(None),
    };
    let regex = Regex::new(&source).map_err(|e| ScanError::BadIgnorePattern {
        dir: dir.to_path_buf(),
        pattern: line.to_string(),
        message: e.to_string(),
    })?;
    Ok(Some(IgnoreRule { regex, negate }))
}

/// Convert one gitignore line into regex source. Returns None for
/// blanks and comments; the bool is the `!` re-include flag.
///
/// Glob translation: `**` → `.*` (consuming an optional trailing `/`),
/// `*` → `[^/]*`, `?` → `[^/]`, `[...]` with `!`/`^` negation. A
/// leading or interior `/` anchors the pattern to the owning directory;
/// otherwise it matches in any subdirectory. A trailing `/` restricts
/// the match to directories (directory paths are tested with a trailing
/// slash appended).
pub fn pattern_to_regex(line: &str) -> Option<(String, bool)> {
    let mut pattern = line.trim();
    if pattern.is_empty() || pattern.starts_with('#') {
        return None;
    }
    let negate = pattern.starts_with('!');
    if negate {
        pattern = &pattern[1..];
    }

    let leading_slash = pattern.starts_with('/');
    let core = pattern.strip_prefix('/').unwrap_or(pattern);
    let anchored = leading_slash || core.trim_end_matches('/').contains('/');
    let dir_only = core.ends_with('/');

    let chars: Vec<char> = core.chars().collect();
    let mut body = String::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                if i + 1 < chars.len() && chars[i + 1] == '*' {
                    body.push_str(".*");
                    i += 2;
                    if i < chars.len() && chars[i] == '/' {
                        i += 1;
                    }
                } else {
                    body.push_str("[^/]*");
                    i += 1;
                }
            }
            '?' => {
                body.push_str("[^/]");
                i += 1;
            }
            '[' => {
                body.push('[');
                i += 1;
                if i < chars.len() && (chars[i] == '!' || chars[i] == '^') {
                    body.push('^');
                    i += 1;
                }
                while i < chars.len() && chars[i] != ']' {
                    body.push(chars[i]);
                    i += 1;
                }
                if i < chars.len() {
                    body.push(']');
                    i += 1;
                }
            }
            c => {
                body.push_str(&regex::escape(&c.to_string()));
                i += 1;
            }
        }
    }

    let prefix = if anchored { "^" } else { "(^|/)" };
    let suffix = if dir_only { "" } else { "($|/)" };
    Some((format!("{prefix}{body}{suffix}"), negate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, path: &str) -> bool {
        let (source, negate) = pattern_to_regex(pattern).expect("pattern compiles");
        assert!(!negate);
        Regex::new(&source).unwrap().is_match(path)
    }

    #[test]
    fn star_does_not_cross_separators() {
        assert!(matches("*.log", "debug.log"));
        assert!(matches("*.log", "logs/debug.log"));
        assert!(!matches("a*.log", "a/b.log"));
    }

    #[test]
    fn leading_slash_anchors() {
        assert!(matches("/todo.txt", "todo.txt"));
        assert!(!matches("/todo.txt", "sub/todo.txt"));
    }

    #[test]
    fn trailing_slash_restricts_to_directories() {
        assert!(matches("build/", "build/"));
        assert!(matches("build/", "build/out.js"));
        assert!(!matches("build/", "build"));
    }

    #[test]
    fn interior_slash_anchors() {
        assert!(matches("doc/*.md", "doc/readme.md"));
        assert!(!matches("doc/*.md", "x/doc/readme.md"));
    }

    #[test]
    fn double_star_crosses_directories() {
        assert!(matches("**/temp", "a/b/temp"));
        assert!(matches("**/temp", "temp"));
    }

    #[test]
    fn question_mark_is_one_character() {
        assert!(matches("?.js", "a.js"));
        assert!(!matches("?.js", "ab.js"));
    }

    #[test]
    fn bracket_classes() {
        assert!(matches("[abc].txt", "b.txt"));
        assert!(!matches("[abc].txt", "d.txt"));
        assert!(matches("[!abc].txt", "d.txt"));
        assert!(!matches("[!abc].txt", "a.txt"));
    }

    #[test]
    fn comments_and_blanks_skipped() {
        assert!(pattern_to_regex("# a comment").is_none());
        assert!(pattern_to_regex("   ").is_none());
    }

    #[test]
    fn negation_flag() {
        let (_, negate) = pattern_to_regex("!keep.log").unwrap();
        assert!(negate);
    }

    #[test]
    fn default_rules_exclude_dot_dirs_and_segments() {
        let rules = default_rules();
        let hit = |probe: &str| rules.iter().any(|r| r.regex.is_match(probe));
        assert!(hit(".git/"));
        assert!(hit("src/.cache/file"));
        assert!(hit("node_modules/"));
        assert!(hit("a/vendor/lib.php"));
        assert!(hit("__pycache__/"));
        assert!(!hit("src/main.py"));
        assert!(!hit("builder/x.js"));
    }
}
