//! CLI output formatting for `--check` and builds.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Every project leads
//! with its positional index and title; the directory it came from and its
//! file counts are shown as indented context lines.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Site
//!     Title: Home
//!     Description: A portfolio of things I made
//!     Logo: media/logo.svg
//!
//! Projects
//! 001 Robot Arm (3 files, 2 images)
//!     Source: work/robot/
//!     Description: Six axis arm built from...
//! 002 zeta (0 files, 0 images)
//!     Source: zeta/
//! ```
//!
//! ## Build
//!
//! ```text
//! Home → index.html
//! Page → pages/about.html
//! Copied 2 static files
//! Logo → logo.svg
//! 001 robot → robot/index.html (3 files)
//!
//! Built 1 project into dist
//! ```
//!
//! # Architecture
//!
//! Each mode has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::generate::GenerateSummary;
use crate::types::{DESCRIPTION, ProjectContext, SiteContext};
use serde_yaml::Value;
use std::path::Path;

const DESCRIPTION_WIDTH: usize = 40;

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

/// Strip HTML tags from a string (simple angle-bracket stripping).
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// One-line plain-text preview of a (markdown-rendered) description.
fn description_preview(value: Option<&Value>) -> Option<String> {
    let html = value.and_then(Value::as_str)?;
    let flat = strip_html_tags(html)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    (!flat.is_empty()).then(|| truncate_desc(&flat, DESCRIPTION_WIDTH))
}

fn field_text(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Project header: index + title, falling back to the project name.
///
/// ```text
/// 001 Robot Arm (3 files, 2 images)
/// ```
fn project_header(index: usize, project: &ProjectContext) -> String {
    let title = field_text(project.get("title")).unwrap_or(&project.name);
    format!(
        "{} {} ({}, {})",
        format_index(index),
        title,
        plural(project.project_files().len(), "file"),
        plural(project.gallery_images().len(), "image"),
    )
}

// ============================================================================
// Check output
// ============================================================================

/// Format the assembled context for `--check`.
pub fn format_context_output(ctx: &SiteContext) -> Vec<String> {
    let mut lines = vec!["Site".to_string()];
    if let Some(title) = field_text(ctx.get("title")) {
        lines.push(format!("{}Title: {}", indent(1), title));
    }
    if let Some(desc) = description_preview(ctx.get(DESCRIPTION)) {
        lines.push(format!("{}Description: {}", indent(1), desc));
    }
    if let Some(logo) = ctx.logo() {
        lines.push(format!("{}Logo: {}", indent(1), logo));
    }

    lines.push(String::new());
    lines.push("Projects".to_string());
    if ctx.projects.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, project) in ctx.projects.values().enumerate() {
        lines.push(project_header(i + 1, project));
        lines.push(format!(
            "{}Source: {}/",
            indent(1),
            crate::naming::slash_path(&project.dir)
        ));
        if let Some(desc) = description_preview(project.get(DESCRIPTION)) {
            lines.push(format!("{}Description: {}", indent(1), desc));
        }
    }
    lines
}

/// Print `--check` output to stdout.
pub fn print_context_output(ctx: &SiteContext) {
    for line in format_context_output(ctx) {
        println!("{}", line);
    }
}

/// The full context as pretty JSON, exactly as templates see it.
pub fn format_context_json(ctx: &SiteContext) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(ctx)
}

// ============================================================================
// Build output
// ============================================================================

/// Format a build summary.
pub fn format_build_output(summary: &GenerateSummary, output_dir: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    for rendered in &summary.rendered {
        let label = if rendered == crate::naming::SITE_PAGE {
            "Home"
        } else {
            "Page"
        };
        lines.push(format!("{} \u{2192} {}", label, rendered));
    }
    if !summary.copied.is_empty() {
        lines.push(format!(
            "Copied {}",
            plural(summary.copied.len(), "static file")
        ));
    }
    if let Some(logo) = &summary.logo {
        lines.push(format!("Logo \u{2192} {}", logo));
    }
    for (i, project) in summary.projects.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {} ({})",
            format_index(i + 1),
            project.name,
            project.page,
            plural(project.files.len(), "file")
        ));
    }

    lines.push(String::new());
    let dir = output_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| output_dir.display().to_string());
    lines.push(format!(
        "Built {} into {}",
        plural(summary.projects.len(), "project"),
        dir
    ));
    lines
}

/// Print build output to stdout.
pub fn print_build_output(summary: &GenerateSummary, output_dir: &Path) {
    for line in format_build_output(summary, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
