//! Read-only content checks for `notesite check`.
//!
//! Reports markdown that renders differently from what the author meant.
//! Nothing is rewritten.
//!
//! - **formula-spacing**: a `$$` block (or a one-line `$$..$$`) directly
//!   after a non-blank line is glued to the preceding paragraph.
//! - **legacy-image-size**: `![alt](img.png =400x300)` is not understood;
//!   the supported form is `![alt|400x300](img.png)`.
//!
//! Lines inside fenced code blocks are skipped.

use crate::nav::NavigationIndex;
use crate::source::ContentSource;
use crate::types::TreeNode;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LintKind {
    FormulaSpacing,
    LegacyImageSize,
    Unreadable,
}

impl fmt::Display for LintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LintKind::FormulaSpacing => "formula-spacing",
            LintKind::LegacyImageSize => "legacy-image-size",
            LintKind::Unreadable => "unreadable",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub path: String,
    /// 1-based; 0 when the whole file is affected.
    pub line: usize,
    pub kind: LintKind,
    pub message: String,
}

static LEGACY_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[([^\]]*)\]\(([^)\s]+)\s+=(\d+)x(\d*)\)").expect("valid regex")
});

/// Check one note.
pub fn check_note(path: &str, text: &str) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut in_fence = false;
    let mut in_formula = false;
    let mut previous_blank = true;

    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        let line_no = i + 1;

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            previous_blank = false;
            continue;
        }
        if in_fence {
            continue;
        }

        if trimmed == "$$" {
            if !in_formula && !previous_blank {
                diagnostics.push(formula_spacing(path, line_no));
            }
            in_formula = !in_formula;
        } else if !in_formula && is_one_line_formula(trimmed) && !previous_blank {
            diagnostics.push(formula_spacing(path, line_no));
        }

        for caps in LEGACY_SIZE.captures_iter(line) {
            let size = if caps[4].is_empty() {
                caps[3].to_string()
            } else {
                format!("{}x{}", &caps[3], &caps[4])
            };
            diagnostics.push(Diagnostic {
                path: path.to_string(),
                line: line_no,
                kind: LintKind::LegacyImageSize,
                message: format!(
                    "write {} as ![{}|{size}]({})",
                    &caps[0], &caps[1], &caps[2]
                ),
            });
        }

        previous_blank = trimmed.is_empty();
    }
    diagnostics
}

fn is_one_line_formula(trimmed: &str) -> bool {
    trimmed
        .strip_prefix("$$")
        .is_some_and(|rest| rest.contains("$$"))
}

fn formula_spacing(path: &str, line: usize) -> Diagnostic {
    Diagnostic {
        path: path.to_string(),
        line,
        kind: LintKind::FormulaSpacing,
        message: "insert a blank line before the $$ formula".to_string(),
    }
}

/// Check every markdown file of the index, reading it from `source`.
pub fn check_index(index: &NavigationIndex, source: &dyn ContentSource) -> Vec<Diagnostic> {
    let mut paths = Vec::new();
    collect_markdown(index.root(), &mut paths);

    let mut diagnostics = Vec::new();
    for path in paths {
        let text = source
            .read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| String::from_utf8(bytes).map_err(|e| e.to_string()));
        match text {
            Ok(text) => diagnostics.extend(check_note(path, &text)),
            Err(message) => diagnostics.push(Diagnostic {
                path: path.to_string(),
                line: 0,
                kind: LintKind::Unreadable,
                message,
            }),
        }
    }
    diagnostics
}

fn collect_markdown<'a>(node: &'a TreeNode, out: &mut Vec<&'a str>) {
    match node {
        TreeNode::File(file) if file.extension == "md" => out.push(&file.path),
        TreeNode::File(_) => {}
        TreeNode::Folder(folder) => {
            for child in &folder.children {
                collect_markdown(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn kinds(text: &str) -> Vec<(usize, LintKind)> {
        check_note("n.md", text)
            .into_iter()
            .map(|d| (d.line, d.kind))
            .collect()
    }

    #[test]
    fn clean_note_has_no_diagnostics() {
        let text = "Intro\n\n$$\nx = 1\n$$\n\n![a|200](a.png)\n";
        assert!(kinds(text).is_empty());
    }

    #[test]
    fn block_formula_after_text_is_flagged() {
        let text = "Intro\n$$\nx = 1\n$$\nafter";
        assert_eq!(kinds(text), vec![(2, LintKind::FormulaSpacing)]);
    }

    #[test]
    fn closing_delimiter_is_not_flagged() {
        let text = "\n$$\nx = 1\ny = 2\n$$\n";
        assert!(kinds(text).is_empty());
    }

    #[test]
    fn one_line_formula_after_text_is_flagged() {
        let text = "Intro\n$$ x = 1 $$\n\n$$ y $$";
        assert_eq!(kinds(text), vec![(2, LintKind::FormulaSpacing)]);
    }

    #[test]
    fn formula_on_first_line_is_fine() {
        assert!(kinds("$$\nx\n$$").is_empty());
    }

    #[test]
    fn legacy_image_size_is_flagged_with_fix() {
        let diagnostics = check_note("n.md", "see ![Plot](img/p.png =400x300) here");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, LintKind::LegacyImageSize);
        assert!(diagnostics[0].message.ends_with("![Plot|400x300](img/p.png)"));
    }

    #[test]
    fn legacy_width_only() {
        let diagnostics = check_note("n.md", "![P](p.png =250x)");
        assert!(diagnostics[0].message.ends_with("![P|250](p.png)"));
    }

    #[test]
    fn fenced_code_is_skipped() {
        let text = "```\ntext\n$$\n![a](b.png =1x2)\n```\n";
        assert!(kinds(text).is_empty());
    }

    #[test]
    fn check_index_reads_markdown_only() {
        let index = sample_index();
        let source = MemorySource::new(&[
            ("DIP/1. Basics.md", "text\n$$\nx\n$$"),
            ("a.md", "fine"),
        ]);
        let diagnostics = check_index(&index, &source);
        // z.md is missing from the source
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].path, "DIP/1. Basics.md");
        assert_eq!(diagnostics[0].kind, LintKind::FormulaSpacing);
        assert_eq!(diagnostics[1].path, "z.md");
        assert_eq!(diagnostics[1].kind, LintKind::Unreadable);
    }
}
