//! Runtime navigation index.
//!
//! Loaded once from the document written by `notesite scan`. Two document
//! shapes are accepted:
//!
//! ```json
//! {"type": "folder", "name": "public", "path": "", "children": [...]}
//! ```
//!
//! or a bare array of nodes, taken as the root's children. A document that
//! cannot be read or parsed leaves the site usable: [`NavigationIndex::load`]
//! logs a warning and returns an empty index.

use crate::types::{FolderNode, TreeNode};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid navigation document: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NavDocument {
    Tree(TreeNode),
    Nodes(Vec<TreeNode>),
}

#[derive(Debug, Clone)]
pub struct NavigationIndex {
    root: TreeNode,
    first_file: Option<String>,
}

impl NavigationIndex {
    pub fn new(root: TreeNode) -> Self {
        let first_file = first_file_in(&root).map(str::to_string);
        Self { root, first_file }
    }

    pub fn empty() -> Self {
        Self::new(TreeNode::Folder(FolderNode::empty_root("")))
    }

    pub fn from_json(json: &str) -> Result<Self, NavError> {
        let root = match serde_json::from_str(json)? {
            NavDocument::Tree(node @ TreeNode::Folder(_)) => node,
            // A lone file still gets a folder around it
            NavDocument::Tree(file) => wrap_children(vec![file]),
            NavDocument::Nodes(children) => wrap_children(children),
        };
        Ok(Self::new(root))
    }

    pub fn try_load(path: &Path) -> Result<Self, NavError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load the navigation document, falling back to an empty index.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(index) => {
                log::debug!("Loaded navigation from {}", path.display());
                index
            }
            Err(e) => {
                log::warn!("Cannot load navigation from {}: {e}", path.display());
                Self::empty()
            }
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.children().is_empty()
    }

    /// Path of the first file in pre-order, if any.
    pub fn first_file(&self) -> Option<&str> {
        self.first_file.as_deref()
    }

    pub fn find(&self, path: &str) -> Option<&TreeNode> {
        find_in(&self.root, path)
    }

    pub fn contains_file(&self, path: &str) -> bool {
        self.find(path).is_some_and(TreeNode::is_file)
    }
}

fn wrap_children(children: Vec<TreeNode>) -> TreeNode {
    let mut root = FolderNode::empty_root("");
    root.children = children;
    TreeNode::Folder(root)
}

fn first_file_in(node: &TreeNode) -> Option<&str> {
    match node {
        TreeNode::File(file) => Some(file.path.as_str()),
        TreeNode::Folder(folder) => folder.children.iter().find_map(first_file_in),
    }
}

fn find_in<'a>(node: &'a TreeNode, path: &str) -> Option<&'a TreeNode> {
    if node.path() == path {
        return Some(node);
    }
    node.children()
        .iter()
        .find_map(|child| find_in(child, path))
}
