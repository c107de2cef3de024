//! Filesystem scanning and navigation document generation.
//!
//! Stage 1 of the notesite pipeline. Walks the content directory and produces
//! the [`TreeNode`] hierarchy that the renderer loads at startup.
//!
//! ## Directory Structure
//!
//! ```text
//! public/                          # Content root (becomes the root folder)
//! ├── 1. Start.md                  # File node
//! ├── 2. Intro.md
//! ├── 10. Advanced.md              # Natural order: after "2. Intro"
//! ├── DIP/                         # Folder node
//! │   ├── 1. Basics.md
//! │   ├── diagram.png              # Excluded: image extension
//! │   └── demo.mp4                 # Kept: videos are browsable
//! ├── Drafts/                      # Empty folders are kept
//! ├── images/                      # Excluded: ignored path
//! └── .DS_Store                    # Excluded: hidden / ignored name
//! ```
//!
//! ## Filtering
//!
//! An entry is skipped when any of these hold:
//! - its name starts with `.`
//! - its name is in `scan.ignored_names`
//! - its relative path equals, or lies below, an entry of `scan.ignored_paths`
//! - it is a file whose lower-cased extension is in `scan.excluded_extensions`
//!
//! ## Errors
//!
//! Only a missing, non-directory or unreadable root fails the scan. Anything
//! that goes wrong for a single entry below the root is logged and the entry
//! is left out.
//!
//! ## Symbolic links
//!
//! Links are followed. A link that resolves to a folder already open on the
//! current descent (the folder itself or one of its ancestors) would make the
//! tree infinite, so it is reported and skipped.

use crate::config::ScanConfig;
use crate::naming::{extension_of, natural_cmp};
use crate::types::{FileNode, FolderNode, TreeNode};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("content directory does not exist: {0}")]
    MissingRoot(PathBuf),
    #[error("content path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Scan `root` into a navigation tree.
///
/// The result is always a [`TreeNode::Folder`] named after `root`, with an
/// empty path.
pub fn scan(root: &Path, rules: &ScanConfig) -> Result<TreeNode, ScanError> {
    let meta = fs::metadata(root).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ScanError::MissingRoot(root.to_path_buf()),
        _ => ScanError::Io(e),
    })?;
    if !meta.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let filter = EntryFilter::new(rules);
    let mut open_dirs = vec![fs::canonicalize(root)?];
    let children = scan_directory(root, "", &filter, &mut open_dirs)?;
    if children.is_empty() {
        log::warn!("No content found in {}", root.display());
    }

    Ok(TreeNode::Folder(FolderNode {
        name: root_name(root),
        path: String::new(),
        children,
        modified_at: modified_at(&meta),
    }))
}

/// Serialize `tree` as pretty JSON to `output`, creating parent directories.
pub fn write_tree(tree: &TreeNode, output: &Path) -> Result<(), ScanError> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(tree)?;
    fs::write(output, json)?;
    Ok(())
}

/// Name of the scanned directory, resolving `.` and trailing separators.
fn root_name(root: &Path) -> String {
    fs::canonicalize(root)
        .ok()
        .as_deref()
        .unwrap_or(root)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string())
}

fn modified_at(meta: &fs::Metadata) -> Option<OffsetDateTime> {
    meta.modified().ok().map(OffsetDateTime::from)
}

/// Scan one directory. `rel` is its path relative to the content root.
/// `open_dirs` holds the canonical paths of `dir` and its ancestors.
///
/// Failing to list `dir` itself is returned to the caller; failures on
/// individual entries are logged and skipped.
fn scan_directory(
    dir: &Path,
    rel: &str,
    filter: &EntryFilter,
    open_dirs: &mut Vec<PathBuf>,
) -> io::Result<Vec<TreeNode>> {
    let mut children = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {e}", dir.display());
                continue;
            }
        };
        let Ok(name) = entry.file_name().into_string() else {
            log::warn!("Skipping non UTF-8 name: {}", entry.path().display());
            continue;
        };
        let path = if rel.is_empty() {
            name.clone()
        } else {
            format!("{rel}/{name}")
        };
        if filter.skips_name(&name) || filter.skips_path(&path) {
            continue;
        }

        // fs::metadata follows symlinks
        let meta = match fs::metadata(entry.path()) {
            Ok(meta) => meta,
            Err(e) => {
                log::warn!("Skipping {path}: {e}");
                continue;
            }
        };

        if meta.is_dir() {
            let canonical = match fs::canonicalize(entry.path()) {
                Ok(canonical) => canonical,
                Err(e) => {
                    log::warn!("Skipping folder {path}: {e}");
                    continue;
                }
            };
            if open_dirs.contains(&canonical) {
                log::warn!("Skipping folder {path}: links back to {}", canonical.display());
                continue;
            }
            open_dirs.push(canonical);
            let scanned = scan_directory(&entry.path(), &path, filter, open_dirs);
            open_dirs.pop();
            match scanned {
                Ok(grandchildren) => children.push(TreeNode::Folder(FolderNode {
                    name,
                    path,
                    children: grandchildren,
                    modified_at: modified_at(&meta),
                })),
                Err(e) => log::warn!("Skipping folder {path}: {e}"),
            }
        } else if meta.is_file() {
            let extension = extension_of(&name);
            if filter.skips_extension(&extension) {
                continue;
            }
            children.push(TreeNode::File(FileNode {
                name,
                path,
                extension,
                modified_at: modified_at(&meta),
            }));
        } else {
            log::debug!("Skipping special file {path}");
        }
    }

    children.sort_by(|a, b| natural_cmp(a.name(), b.name()));
    Ok(children)
}

/// Compiled form of [`ScanConfig`].
struct EntryFilter<'a> {
    names: &'a [String],
    /// Normalized: no leading or trailing slashes.
    paths: Vec<&'a str>,
    extensions: &'a [String],
}

impl<'a> EntryFilter<'a> {
    fn new(rules: &'a ScanConfig) -> Self {
        Self {
            names: &rules.ignored_names,
            paths: rules
                .ignored_paths
                .iter()
                .map(|p| p.trim_matches('/'))
                .filter(|p| !p.is_empty())
                .collect(),
            extensions: &rules.excluded_extensions,
        }
    }

    fn skips_name(&self, name: &str) -> bool {
        name.starts_with('.') || self.names.iter().any(|n| n == name)
    }

    fn skips_path(&self, path: &str) -> bool {
        self.paths.iter().any(|prefix| {
            path.strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }

    fn skips_extension(&self, extension: &str) -> bool {
        !extension.is_empty() && self.extensions.iter().any(|e| e == extension)
    }
}
