//! Site configuration module.
//!
//! Handles loading, validating, and merging `notesite.toml`. Stock defaults
//! are overridden by the user file; any key may be omitted.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_prefix = "/public"   # URL prefix content paths are served under
//!
//! [site]
//! title = "Notes"
//!
//! [about]
//! heading = "Welcome"
//! intro = "Personal notes, skill trees and projects."
//! contacts = []
//!
//! [scan]
//! ignored_names = [".DS_Store", ".gitkeep", ".git", ".hg", ".svn", "Thumbs.db"]
//! ignored_paths = ["images"]
//! excluded_extensions = ["jpg", "jpeg", "png", "gif", "svg", "webp", "bmp"]
//!
//! [media]
//! image_extensions = ["jpg", "jpeg", "png", "gif", "svg", "webp", "bmp"]
//! video_extensions = ["mp4", "webm", "ogg", "mov"]
//!
//! [markdown]
//! math_plugin = true           # false = regex fallback for formulas
//! error_excerpt_chars = 200
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `notesite.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// URL prefix under which content files are reachable (`/public/a.md`).
    #[serde(default = "default_content_prefix")]
    pub content_prefix: String,
    pub site: SiteInfo,
    /// Informational view shown for the empty fragment and `#about`.
    pub about: AboutConfig,
    pub scan: ScanConfig,
    pub media: MediaConfig,
    pub markdown: MarkdownConfig,
}

fn default_content_prefix() -> String {
    "/public".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_prefix: default_content_prefix(),
            site: SiteInfo::default(),
            about: AboutConfig::default(),
            scan: ScanConfig::default(),
            media: MediaConfig::default(),
            markdown: MarkdownConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.content_prefix.starts_with('/') {
            return Err(ConfigError::Validation(
                "content_prefix must start with '/'".into(),
            ));
        }
        if self.markdown.error_excerpt_chars == 0 {
            return Err(ConfigError::Validation(
                "markdown.error_excerpt_chars must be greater than 0".into(),
            ));
        }
        let extension_lists = [
            ("scan.excluded_extensions", &self.scan.excluded_extensions),
            ("media.image_extensions", &self.media.image_extensions),
            ("media.video_extensions", &self.media.video_extensions),
        ];
        for (key, list) in extension_lists {
            for ext in list {
                if ext.is_empty() || ext.starts_with('.') || *ext != ext.to_lowercase() {
                    return Err(ConfigError::Validation(format!(
                        "{key}: extension {ext:?} must be lower-case and written without a dot"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    /// Appended to every document title (`"Intro - Notes"`).
    pub title: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "Notes".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AboutConfig {
    pub heading: String,
    pub intro: String,
    /// One line each, rendered as a list.
    pub contacts: Vec<String>,
}

impl Default for AboutConfig {
    fn default() -> Self {
        Self {
            heading: "Welcome".to_string(),
            intro: "Personal notes, skill trees and projects.".to_string(),
            contacts: Vec::new(),
        }
    }
}

/// Filtering rules for the tree scanner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Exact entry names that are never indexed.
    pub ignored_names: Vec<String>,
    /// Paths relative to the content root; the path and everything below it
    /// is skipped. A leading `/` is accepted.
    pub ignored_paths: Vec<String>,
    /// File extensions left out of the navigation tree (images are linked
    /// from notes, not browsed).
    pub excluded_extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignored_names: [".DS_Store", ".gitkeep", ".git", ".hg", ".svn", "Thumbs.db"]
                .map(String::from)
                .to_vec(),
            ignored_paths: vec!["images".to_string()],
            excluded_extensions: default_image_extensions(),
        }
    }
}

fn default_image_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "gif", "svg", "webp", "bmp"]
        .map(String::from)
        .to_vec()
}

/// Extension sets used to classify content for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MediaConfig {
    pub image_extensions: Vec<String>,
    pub video_extensions: Vec<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            image_extensions: default_image_extensions(),
            video_extensions: ["mp4", "webm", "ogg", "mov"].map(String::from).to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// Render formulas through the parser's math extension. When false the
    /// regex fallback substitutes formulas before parsing.
    pub math_plugin: bool,
    /// Characters of raw source shown when a note fails to render.
    pub error_excerpt_chars: usize,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            math_plugin: true,
            error_excerpt_chars: 200,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value. `Ok(None)` if it does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file, falling back to stock defaults when
/// the file is absent.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    if overlay.is_some() {
        log::debug!("Loaded config from {}", path.display());
    }
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `notesite.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# notesite configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# URL prefix under which the content directory is served. Image and video
# links, and relative image references inside notes, are resolved under it.
content_prefix = "/public"

[site]
# Appended to the document title of every note ("Intro - Notes").
title = "Notes"

# ---------------------------------------------------------------------------
# Informational view (empty fragment or #about)
# ---------------------------------------------------------------------------
[about]
heading = "Welcome"
intro = "Personal notes, skill trees and projects."
# One entry per line, e.g. ["Mail: me@example.com"]
contacts = []

# ---------------------------------------------------------------------------
# Tree scanner
# ---------------------------------------------------------------------------
[scan]
# Exact names that are never indexed (hidden dot-entries are always skipped).
ignored_names = [".DS_Store", ".gitkeep", ".git", ".hg", ".svn", "Thumbs.db"]
# Paths relative to the content root. The path and everything below it is skipped.
ignored_paths = ["images"]
# File types left out of the navigation tree. Lower-case, without the dot.
excluded_extensions = ["jpg", "jpeg", "png", "gif", "svg", "webp", "bmp"]

# ---------------------------------------------------------------------------
# Content classification
# ---------------------------------------------------------------------------
[media]
image_extensions = ["jpg", "jpeg", "png", "gif", "svg", "webp", "bmp"]
video_extensions = ["mp4", "webm", "ogg", "mov"]

# ---------------------------------------------------------------------------
# Markdown rendering
# ---------------------------------------------------------------------------
[markdown]
# true: formulas are recognised by the markdown parser ($$, \[ \], $, \( \)).
# false: formulas are substituted by pattern before parsing.
math_plugin = true
# Characters of raw source shown when a note fails to render.
error_excerpt_chars = 200
"##
}
