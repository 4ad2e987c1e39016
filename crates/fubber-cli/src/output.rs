//! Row output and progress. The core emits through the ProgressSink
//! seam; this is the terminal side of it.

use std::io::Write;
use std::path::Path;

use fubber_core::progress::ProgressSink;
use fubber_storage::SearchHit;

/// Counter progress on stderr, redrawn only on the indexer's batched
/// advances.
pub struct StderrProgress {
    label: &'static str,
    total: usize,
    active: bool,
}

impl StderrProgress {
    pub fn new(label: &'static str) -> StderrProgress {
        StderrProgress {
            label,
            total: 0,
            active: false,
        }
    }
}

impl ProgressSink for StderrProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        self.active = total > 0;
    }

    fn advance(&mut self, done: usize) {
        if !self.active {
            return;
        }
        eprint!("\r{} {}/{}", self.label, done.min(self.total), self.total);
        let _ = std::io::stderr().flush();
    }

    fn finish(&mut self) {
        if self.active {
            eprintln!();
        }
        self.active = false;
    }
}

fn relative<'a>(project_root: &str, filename: &'a str) -> &'a str {
    Path::new(filename)
        .strip_prefix(project_root)
        .ok()
        .and_then(|p| p.to_str())
        .unwrap_or(filename)
}

/// One human-readable result row.
pub fn print_hit(project_root: &str, hit: &SearchHit) {
    let mut qualified = String::new();
    if !hit.namespace.is_empty() {
        qualified.push_str(&hit.namespace);
        qualified.push('.');
    }
    if !hit.enclosing.is_empty() {
        qualified.push_str(&hit.enclosing);
        qualified.push_str("::");
    }
    qualified.push_str(&hit.name);

    println!(
        "{}:{}-{}\t{} {}\t{}",
        relative(project_root, &hit.filename),
        hit.line_start,
        hit.line_end,
        hit.entity_type,
        qualified,
        hit.snippet
    );
}

/// One JSON object per hit, matching the output contract field names.
pub fn print_hit_json(project_root: &str, hit: &SearchHit) {
    let row = serde_json::json!({
        "project_relative_path": relative(project_root, &hit.filename),
        "line_start": hit.line_start,
        "line_end": hit.line_end,
        "type": hit.entity_type,
        "namespace": hit.namespace,
        "enclosing": hit.enclosing,
        "name": hit.name,
        "snippet_detokenized": hit.snippet,
    });
    println!("{row}");
}
