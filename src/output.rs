//! CLI output formatting for all commands.
//!
//! # Information-First Display
//!
//! Output leads with what a reader recognises, the note title, and shows
//! paths and ids as secondary context. Positions are 1-based and
//! zero-padded per sibling level so the listing reads like the sidebar.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! public
//! 001 DIP/
//!     001 1. Basics
//!     002 demo.mp4
//! 002 Drafts/ (empty)
//! 003 Intro
//!
//! 3 files, 2 folders → tree.json
//! ```
//!
//! ## Toc
//!
//! ```text
//! 1. Basics
//! Pixels #pixels
//!     Sampling #sampling
//! ```
//!
//! ## Check
//!
//! ```text
//! DIP/1. Basics.md:12 formula-spacing: insert a blank line before the $$ formula
//!
//! 1 problem in 1 file
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::lint::Diagnostic;
use crate::markdown::RenderedNote;
use crate::naming::display_stem;
use crate::session::View;
use crate::toc;
use crate::types::{TocNode, TreeNode};
use std::collections::BTreeSet;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Markdown files are listed by title; anything else keeps its extension
/// so media stands out.
fn file_label(name: &str) -> &str {
    if name.to_lowercase().ends_with(".md") {
        display_stem(name)
    } else {
        name
    }
}

// ============================================================================
// Scan
// ============================================================================

/// Format scan output: the tree as it will appear in the sidebar, then
/// a count line.
pub fn format_scan_output(tree: &TreeNode, output: &Path) -> Vec<String> {
    let mut lines = vec![tree.name().to_string()];
    let mut counts = (0, 0);
    walk_tree(tree.children(), 0, &mut lines, &mut counts);
    if tree.children().is_empty() {
        lines.push(format!("{}(no content)", indent(1)));
    }
    lines.push(String::new());
    lines.push(format!(
        "{}, {} → {}",
        plural(counts.0, "file"),
        plural(counts.1, "folder"),
        output.display()
    ));
    lines
}

fn walk_tree(
    nodes: &[TreeNode],
    depth: usize,
    lines: &mut Vec<String>,
    counts: &mut (usize, usize),
) {
    for (i, node) in nodes.iter().enumerate() {
        let prefix = format!("{}{}", indent(depth), format_index(i + 1));
        match node {
            TreeNode::File(file) => {
                counts.0 += 1;
                lines.push(format!("{prefix} {}", file_label(&file.name)));
            }
            TreeNode::Folder(folder) => {
                counts.1 += 1;
                if folder.children.is_empty() {
                    lines.push(format!("{prefix} {}/ (empty)", folder.name));
                } else {
                    lines.push(format!("{prefix} {}/", folder.name));
                    walk_tree(&folder.children, depth + 1, lines, counts);
                }
            }
        }
    }
}

pub fn print_scan_output(tree: &TreeNode, output: &Path) {
    for line in format_scan_output(tree, output) {
        println!("{}", line);
    }
}

// ============================================================================
// Toc
// ============================================================================

/// Format the heading outline of a rendered note.
pub fn format_toc_output(note: &RenderedNote) -> Vec<String> {
    let mut lines = vec![note.title.clone()];
    if note.toc.is_empty() {
        lines.push(format!("{}(no headings)", indent(1)));
    }
    walk_toc(&note.toc, 0, &mut lines);
    lines
}

fn walk_toc(nodes: &[TocNode], depth: usize, lines: &mut Vec<String>) {
    for node in nodes {
        lines.push(format!("{}{} #{}", indent(depth), node.text, node.id));
        walk_toc(&node.children, depth + 1, lines);
    }
}

pub fn print_toc_output(note: &RenderedNote) {
    for line in format_toc_output(note) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(diagnostics: &[Diagnostic]) -> Vec<String> {
    if diagnostics.is_empty() {
        return vec!["No problems found".to_string()];
    }
    let mut lines: Vec<String> = diagnostics
        .iter()
        .map(|d| {
            let location = if d.line == 0 {
                d.path.clone()
            } else {
                format!("{}:{}", d.path, d.line)
            };
            format!("{location} {}: {}", d.kind, d.message)
        })
        .collect();
    let files: BTreeSet<&str> = diagnostics.iter().map(|d| d.path.as_str()).collect();
    lines.push(String::new());
    lines.push(format!(
        "{} in {}",
        plural(diagnostics.len(), "problem"),
        plural(files.len(), "file")
    ));
    lines
}

pub fn print_check_output(diagnostics: &[Diagnostic]) {
    for line in format_check_output(diagnostics) {
        println!("{}", line);
    }
}

// ============================================================================
// Render
// ============================================================================

/// One-line summary of what `notesite render` produced.
pub fn format_render_summary(view: &View, destination: &Path) -> String {
    let what = match view {
        View::About => "About".to_string(),
        View::Note { note, .. } => {
            format!("{} ({})", note.title, plural(toc::count(&note.toc), "heading"))
        }
        View::Image { name, .. } | View::Video { name, .. } | View::Unsupported { name, .. } => {
            name.clone()
        }
        View::Loading { path } => format!("{path} (not loaded)"),
        View::FetchFailed { path, .. } => format!("{path} (could not load)"),
        View::RenderFailed { path, .. } => format!("{path} (render failed)"),
    };
    format!("{what} → {}", destination.display())
}

// ============================================================================
// Tests
// ============================================================================
