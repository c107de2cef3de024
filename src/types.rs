//! Shared types used across the scan and render stages.
//!
//! [`TreeNode`] is the navigation document: written by `notesite scan`,
//! read back by [`crate::nav::NavigationIndex`]. [`Heading`] and [`TocNode`]
//! only live for the duration of one markdown render.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One entry of the navigation document.
///
/// Serialized with an internal `"type"` tag so the document reads as
/// `{"type": "folder", "name": ..., "children": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    File(FileNode),
    Folder(FolderNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    /// Original filename, extension included.
    pub name: String,
    /// Slash-separated path relative to the content root.
    pub path: String,
    /// Lower-cased extension without the dot. Empty when the file has none.
    #[serde(rename = "ext", default)]
    pub extension: String,
    #[serde(
        rename = "mtime",
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub modified_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderNode {
    pub name: String,
    /// Empty for the root folder.
    pub path: String,
    /// Natural-sorted by name. Empty folders are kept.
    #[serde(default)]
    pub children: Vec<TreeNode>,
    #[serde(
        rename = "mtime",
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub modified_at: Option<OffsetDateTime>,
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::File(f) => &f.name,
            TreeNode::Folder(f) => &f.name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            TreeNode::File(f) => &f.path,
            TreeNode::Folder(f) => &f.path,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, TreeNode::File(_))
    }

    /// Children of a folder; files have none.
    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::File(_) => &[],
            TreeNode::Folder(f) => &f.children,
        }
    }
}

impl FolderNode {
    /// An empty folder with the given name, used for the root.
    pub fn empty_root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: String::new(),
            children: Vec::new(),
            modified_at: None,
        }
    }
}

/// A heading collected while rendering markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// 1–6
    pub level: u8,
    /// Plain text with inline markup flattened away.
    pub text: String,
    /// Unique anchor id within the rendered document.
    pub id: String,
}

/// Node of the table-of-contents forest built from [`Heading`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocNode {
    pub level: u8,
    pub text: String,
    pub id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocNode>,
}

impl From<&Heading> for TocNode {
    fn from(heading: &Heading) -> Self {
        Self {
            level: heading.level,
            text: heading.text.clone(),
            id: heading.id.clone(),
            children: Vec::new(),
        }
    }
}
