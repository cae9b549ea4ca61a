//! CLI output formatting for `check` and `build`.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Sitemap
//! subfolder/
//!     subsubfolder/
//!         test3 Test Three
//!             Source: subfolder/subsubfolder/test3.yaml.md
//!     test2 Test Two
//!         Source: subfolder/test2.json.md
//!         Template: alternate.html
//! test1 Test One
//!     Source: test1.md
//!
//! Data
//! nav/
//!     main (list, 2 items)
//! site (mapping, 3 keys)
//!
//! Templates
//!     alternate.html
//!     index.html
//!
//! Errors (1)
//!     14:02:11 data/broken.json does not contain valid data: ...
//! ```
//!
//! ## Build
//!
//! ```text
//! Built 4 pages, skipped 1 in 0.042s
//!
//! Errors (1)
//!     14:02:11 data/broken.json does not contain valid data: ...
//! ```
//!
//! # Architecture
//!
//! Each section has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::content::{ContentMetadata, SiteMap};
use crate::data::SharedData;
use crate::report::{BuildReport, LogEntry};
use crate::tree::Node;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn relative_display(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

/// One-line summary of a data value.
///
/// ```text
/// (mapping, 3 keys)
/// (list, 2 items)
/// "My Site"
/// ```
fn describe_value(value: &Value) -> String {
    match value {
        Value::Object(map) => format!("(mapping, {} keys)", map.len()),
        Value::Array(items) => format!("(list, {} items)", items.len()),
        other => other.to_string(),
    }
}

fn walk_branch<V>(
    children: &BTreeMap<String, Node<V>>,
    depth: usize,
    lines: &mut Vec<String>,
    leaf: &impl Fn(&str, &V, usize, &mut Vec<String>),
) {
    for (key, child) in children {
        match child {
            Node::Leaf(value) => leaf(key, value, depth, lines),
            Node::Branch(grandchildren) => {
                lines.push(format!("{}{}/", indent(depth), key));
                walk_branch(grandchildren, depth + 1, lines, leaf);
            }
        }
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format the sitemap as an indented tree, sources relative to `content_root`.
pub fn format_sitemap(sitemap: &SiteMap, content_root: &Path) -> Vec<String> {
    let mut lines = vec!["Sitemap".to_string()];
    if let Node::Branch(children) = sitemap.root() {
        let page = |key: &str, meta: &ContentMetadata, depth: usize, lines: &mut Vec<String>| {
            if meta.title.is_empty() {
                lines.push(format!("{}{}", indent(depth), key));
            } else {
                lines.push(format!("{}{} {}", indent(depth), key, meta.title));
            }
            let source = relative_display(Path::new(&meta.filepath), content_root);
            lines.push(format!("{}Source: {}", indent(depth + 1), source));
            if let Some(template) = &meta.template {
                lines.push(format!("{}Template: {}", indent(depth + 1), template));
            }
        };
        walk_branch(children, 0, &mut lines, &page);
    }
    lines
}

/// Format the shared data tree with a one-line summary per file.
pub fn format_data(data: &SharedData) -> Vec<String> {
    let mut lines = vec!["Data".to_string()];
    if let Node::Branch(children) = data.root() {
        let entry = |key: &str, value: &Value, depth: usize, lines: &mut Vec<String>| {
            lines.push(format!("{}{} {}", indent(depth), key, describe_value(value)));
        };
        walk_branch(children, 0, &mut lines, &entry);
    }
    lines
}

/// Format the template list relative to the templates directory.
pub fn format_templates(templates: &[PathBuf], templates_root: &Path) -> Vec<String> {
    let mut lines = vec!["Templates".to_string()];
    for template in templates {
        lines.push(format!("{}{}", indent(1), relative_display(template, templates_root)));
    }
    lines
}

/// Format log entries. Empty when there are none.
pub fn format_errors(entries: &[LogEntry]) -> Vec<String> {
    if entries.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!("Errors ({})", entries.len())];
    for entry in entries {
        lines.push(format!(
            "{}{} {}",
            indent(1),
            entry.timestamp.format("%H:%M:%S"),
            entry.message
        ));
    }
    lines
}

// ============================================================================
// Build output
// ============================================================================

/// Format a build report: counts, elapsed time, then errors.
pub fn format_report(report: &BuildReport) -> Vec<String> {
    let millis = report.build_time().num_milliseconds().max(0);
    let mut lines = vec![format!(
        "Built {} {}, skipped {} in {}.{:03}s",
        report.pages_built,
        if report.pages_built == 1 { "page" } else { "pages" },
        report.pages_skipped,
        millis / 1000,
        millis % 1000
    )];
    let errors = format_errors(&report.errors);
    if !errors.is_empty() {
        lines.push(String::new());
        lines.extend(errors);
    }
    lines
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

/// Print the check output: sitemap, data, templates, errors.
pub fn print_check(site: &crate::site::Site) {
    let mut sections = vec![
        format_sitemap(site.sitemap(), site.content_root()),
        format_data(site.data()),
        format_templates(site.templates(), site.templates_root()),
    ];
    let errors = format_errors(site.log().entries());
    if !errors.is_empty() {
        sections.push(errors);
    }
    print_lines(sections.join(&String::new()));
}

/// Print a build report to stdout.
pub fn print_report(report: &BuildReport) {
    print_lines(format_report(report));
}

// ============================================================================
// Tests
// ============================================================================
