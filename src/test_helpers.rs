//! Shared test utilities for the notesite test suite.
//!
//! Provides content-tree fixtures, tree lookups that panic with a useful
//! message, and stand-ins for the two collaborators the renderer talks to
//! (formula renderer and content source).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = content_dir(&["DIP/1. Basics.md", "Drafts/", "a.md"]);
//! let tree = scan(tmp.path(), &ScanConfig::default()).unwrap();
//!
//! assert_eq!(child_names(&tree), vec!["a.md", "DIP", "Drafts"]);
//! assert!(find_node(&tree, "DIP/1. Basics.md").is_file());
//! ```

use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

use crate::math::{FormulaError, FormulaRenderer, MathMode};
use crate::nav::NavigationIndex;
use crate::naming::display_stem;
use crate::source::{ContentSource, FetchError};
use crate::types::TreeNode;

// =========================================================================
// Fixture setup
// =========================================================================

/// Create a temp content directory.
///
/// Entries ending in `/` become (possibly empty) directories; everything
/// else becomes a file, with parents created as needed. Markdown files get
/// a `# <stem>` heading so they render to something.
pub fn content_dir(entries: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for entry in entries {
        let path = tmp.path().join(entry);
        if entry.ends_with('/') {
            fs::create_dir_all(&path).unwrap();
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let body = if entry.ends_with(".md") {
            format!("# {}\n", display_stem(entry))
        } else {
            String::new()
        };
        fs::write(&path, body).unwrap();
    }
    tmp
}

/// Navigation index used by session and page tests.
///
/// ```text
/// DIP/
///     1. Basics.md
///     demo.mp4
/// Empty/
/// a.md
/// pic.png
/// z.md
/// ```
pub fn sample_index() -> NavigationIndex {
    NavigationIndex::from_json(
        r#"{"type": "folder", "name": "public", "path": "", "children": [
            {"type": "folder", "name": "DIP", "path": "DIP", "children": [
                {"type": "file", "name": "1. Basics.md", "path": "DIP/1. Basics.md", "ext": "md"},
                {"type": "file", "name": "demo.mp4", "path": "DIP/demo.mp4", "ext": "mp4"}
            ]},
            {"type": "folder", "name": "Empty", "path": "Empty", "children": []},
            {"type": "file", "name": "a.md", "path": "a.md", "ext": "md"},
            {"type": "file", "name": "pic.png", "path": "pic.png", "ext": "png"},
            {"type": "file", "name": "z.md", "path": "z.md", "ext": "md"}
        ]}"#,
    )
    .unwrap()
}

// =========================================================================
// Tree lookups — panics with a clear message on miss
// =========================================================================

/// Find a node by path anywhere below `root`. Panics if not found.
pub fn find_node<'a>(root: &'a TreeNode, path: &str) -> &'a TreeNode {
    fn walk<'a>(node: &'a TreeNode, path: &str) -> Option<&'a TreeNode> {
        if node.path() == path {
            return Some(node);
        }
        node.children().iter().find_map(|c| walk(c, path))
    }
    walk(root, path).unwrap_or_else(|| {
        panic!("node '{path}' not found. Available: {:?}", all_paths(root))
    })
}

/// Names of the direct children, in tree order.
pub fn child_names(node: &TreeNode) -> Vec<&str> {
    node.children().iter().map(TreeNode::name).collect()
}

/// Every path below `root`, pre-order.
pub fn all_paths(root: &TreeNode) -> Vec<&str> {
    let mut paths = Vec::new();
    for child in root.children() {
        paths.push(child.path());
        paths.extend(all_paths(child));
    }
    paths
}

// =========================================================================
// Collaborator stand-ins
// =========================================================================

/// Renders `tex` as `<m i>tex</m>` / `<m d>tex</m>`. Rejects anything
/// containing `\fail`.
pub struct StubRenderer;

impl FormulaRenderer for StubRenderer {
    fn render(&self, tex: &str, mode: MathMode) -> Result<String, FormulaError> {
        if tex.contains("\\fail") {
            return Err(FormulaError::Rejected(tex.to_string()));
        }
        let tag = match mode {
            MathMode::Inline => "i",
            MathMode::Display => "d",
        };
        Ok(format!("<m {tag}>{tex}</m>"))
    }
}

/// Rejects every formula.
pub struct FailingRenderer;

impl FormulaRenderer for FailingRenderer {
    fn render(&self, tex: &str, _mode: MathMode) -> Result<String, FormulaError> {
        Err(FormulaError::Rejected(tex.to_string()))
    }
}

/// Panics on every formula.
pub struct PanickingRenderer;

impl FormulaRenderer for PanickingRenderer {
    fn render(&self, _tex: &str, _mode: MathMode) -> Result<String, FormulaError> {
        panic!("formula renderer exploded")
    }
}

/// In-memory [`ContentSource`].
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new(files: &[(&str, &str)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(path, body)| (path.to_string(), body.as_bytes().to_vec()))
                .collect(),
        }
    }
}

impl ContentSource for MemorySource {
    fn read(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }
}
