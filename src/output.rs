//! CLI output formatting for all commands.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every article is its title and positional index, with filesystem
//! paths shown as secondary context via indented `Source:` lines.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Articles
//! 001 Title
//!     Source: test_01/test_01.md
//!     Date: 2022-09-18
//!     Tags: CSS
//! 002 Second article
//!     Source: test_02/test_02.md
//!     Date: 2023-01-05
//!     Updated: 2023-02-11
//!     Tags: HTML, CSS, Grid
//!     Series: html-lesson
//! 003 Code samples (draft)
//!     Source: test_03/test_03.md
//!
//! 3 articles, 1 draft
//! ```
//!
//! ## Batch commands
//!
//! ```text
//! 001 test_01/test_01.md → test_01/index.html
//! 002 test_02/test_02.md → test_02/index.html
//!
//! Failed
//! 001 broken/broken.md
//!     Reason: invalid front matter in …
//!
//! Generated 2 pages, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::site::{BatchReport, Site};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `path` relative to `base` with `/` separators, or unchanged if outside it.
fn relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{n} {}", if n == 1 { one } else { many })
}

// ============================================================================
// Check
// ============================================================================

/// Format the article inventory shown by `check`.
pub fn format_site_output(site: &Site) -> Vec<String> {
    let mut lines = vec!["Articles".to_string()];
    let mut drafts = 0;
    for (idx, article) in site.articles().iter().enumerate() {
        let title = article.title().unwrap_or_else(|| article.stem());
        let mut header = format!("{} {}", format_index(idx + 1), truncate_desc(&title, 60));
        if !article.metadata.published() {
            header.push_str(" (draft)");
            drafts += 1;
        }
        if site.is_damaged(article) {
            header.push_str(" (front matter ignored)");
        }
        lines.push(header);
        lines.push(format!(
            "{}Source: {}",
            indent(1),
            relative(article.source_path(), site.root())
        ));
        if let Some(date) = article.metadata.date() {
            lines.push(format!("{}Date: {date}", indent(1)));
        }
        if let Some(update) = article.metadata.update() {
            lines.push(format!("{}Updated: {update}", indent(1)));
        }
        let tags = article.metadata.tags();
        if !tags.is_empty() {
            lines.push(format!("{}Tags: {}", indent(1), tags.join(", ")));
        }
        if let Some(related) = article.metadata.related_id() {
            lines.push(format!("{}Series: {related}", indent(1)));
        }
    }
    lines.push(String::new());
    lines.push(format!(
        "{}, {}",
        plural(site.articles().len(), "article", "articles"),
        plural(drafts, "draft", "drafts")
    ));
    lines
}

pub fn print_site_output(site: &Site) {
    for line in format_site_output(site) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch reports
// ============================================================================

/// Format a batch report.
///
/// Sources are shown relative to `source_root`, targets relative to
/// `target_root`. `noun` names what one entry produced (`page`, `digest`).
pub fn format_report(
    report: &BatchReport,
    source_root: &Path,
    target_root: &Path,
    verb: &str,
    noun: (&str, &str),
) -> Vec<String> {
    let mut lines = Vec::new();
    for (idx, entry) in report.entries.iter().enumerate() {
        let source = relative(&entry.source, source_root);
        let target = relative(&entry.target, target_root);
        if source == target {
            lines.push(format!("{} {}", format_index(idx + 1), source));
        } else {
            lines.push(format!(
                "{} {} \u{2192} {}",
                format_index(idx + 1),
                source,
                target
            ));
        }
    }

    if !report.failures.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Failed".to_string());
        for (idx, failure) in report.failures.iter().enumerate() {
            lines.push(format!(
                "{} {}",
                format_index(idx + 1),
                relative(&failure.path, source_root)
            ));
            lines.push(format!("{}Reason: {}", indent(1), failure.reason));
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    let mut summary = format!(
        "{verb} {}",
        plural(report.entries.len(), noun.0, noun.1)
    );
    if !report.failures.is_empty() {
        summary.push_str(&format!(", {} failed", report.failures.len()));
    }
    lines.push(summary);
    lines
}

pub fn print_report(
    report: &BatchReport,
    source_root: &Path,
    target_root: &Path,
    verb: &str,
    noun: (&str, &str),
) {
    for line in format_report(report, source_root, target_root, verb, noun) {
        println!("{}", line);
    }
}

// ============================================================================
// Keys
// ============================================================================

/// One metadata key per line.
pub fn format_keys(keys: &[String]) -> Vec<String> {
    keys.to_vec()
}

pub fn print_keys(keys: &[String]) {
    for line in format_keys(keys) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
