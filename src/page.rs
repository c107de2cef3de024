//! HTML page rendering with maud.
//!
//! Turns a [`Session`] into a complete, self-contained HTML document: the
//! file tree sidebar, the current view and the table-of-contents panel.
//!
//! ## Layout
//!
//! ```text
//! body.homepage | body.note-page
//! ├── aside.sidebar        file tree, active file marked
//! ├── main.viewer          about / note / media / error view
//! └── aside.toc-panel      toc-level-N links, or a placeholder
//! ```
//!
//! Tree links point at `#<encoded path>` fragments, so the page is driven
//! by the same routing as [`crate::route`].

use crate::config::SiteConfig;
use crate::naming::display_stem;
use crate::route::fragment_for;
use crate::session::{Session, View};
use crate::types::{TocNode, TreeNode};
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS: &str = include_str!("../static/style.css");

/// Shown in the TOC panel when the current view has no headings.
pub const EMPTY_TOC_MESSAGE: &str = "No headings in this note";

/// Render the full page for the session's current state.
pub fn render_page(session: &Session, config: &SiteConfig) -> Markup {
    let body_class = if session.is_home() {
        "homepage"
    } else {
        "note-page"
    };
    let content = html! {
        aside.sidebar {
            header.sidebar-header {
                a.site-title href="#" { (config.site.title) }
            }
            nav.file-tree {
                (render_tree(session.index().root().children(), session.active_path()))
            }
        }
        main.viewer {
            (render_view(session, config))
        }
        aside.toc-panel {
            h2 { "Contents" }
            div id="tocContent" {
                (render_toc(session.toc()))
            }
        }
    };
    base_document(&document_title(session, config), body_class, content)
}

/// `<stem> - <site title>` for content views, the site title otherwise.
pub fn document_title(session: &Session, config: &SiteConfig) -> String {
    let site = &config.site.title;
    match session.view() {
        View::About => site.clone(),
        View::Note { note, .. } => format!("{} - {site}", note.title),
        _ => format!("{} - {site}", display_stem(&session.route().path)),
    }
}

fn base_document(title: &str, body_class: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body class=(body_class) {
                (content)
            }
        }
    }
}

// ============================================================================
// File tree
// ============================================================================

/// Render folder contents as a nested list. Files are shown without their
/// extension; empty folders get an explicit marker.
pub fn render_tree(nodes: &[TreeNode], active: Option<&str>) -> Markup {
    html! {
        ul.tree {
            @for node in nodes {
                (render_tree_item(node, active))
            }
        }
    }
}

fn render_tree_item(node: &TreeNode, active: Option<&str>) -> Markup {
    match node {
        TreeNode::File(file) => {
            let is_active = active == Some(file.path.as_str());
            html! {
                li.file {
                    a.item.active[is_active] href={ "#" (fragment_for(&file.path)) }
                        data-path=(file.path) data-type="file" {
                        (display_stem(&file.name))
                    }
                }
            }
        }
        TreeNode::Folder(folder) => html! {
            li.folder {
                div.item data-path=(folder.path) data-type="folder" { (folder.name) }
                @if folder.children.is_empty() {
                    ul { li.empty-folder { "Empty folder" } }
                } @else {
                    (render_tree(&folder.children, active))
                }
            }
        },
    }
}

// ============================================================================
// Table of contents
// ============================================================================

pub fn render_toc(toc: &[TocNode]) -> Markup {
    html! {
        @if toc.is_empty() {
            p.toc-empty { (EMPTY_TOC_MESSAGE) }
        } @else {
            (render_toc_list(toc))
        }
    }
}

fn render_toc_list(nodes: &[TocNode]) -> Markup {
    html! {
        ul {
            @for node in nodes {
                li {
                    a href={ "#" (node.id) } class={ "toc-level-" (node.level) } { (node.text) }
                    @if !node.children.is_empty() {
                        (render_toc_list(&node.children))
                    }
                }
            }
        }
    }
}

// ============================================================================
// Views
// ============================================================================

fn render_view(session: &Session, config: &SiteConfig) -> Markup {
    match session.view() {
        View::About => render_about(config, session.index().first_file()),
        View::Loading { path } => html! {
            div.loading { "Loading " (display_stem(path)) "…" }
        },
        View::Note { note, .. } => html! {
            article.markdown-body { (PreEscaped(&note.html)) }
        },
        View::Image { src, name } => html! {
            div.image-preview {
                img src=(src) alt=(name);
                p { a href=(src) target="_blank" rel="noopener" { "Open original" } }
            }
        },
        View::Video { src, name } => html! {
            div.video-player {
                video controls src=(src) {
                    "Your browser does not support video playback."
                }
                p { a href=(src) download { "Download " (name) } }
            }
        },
        View::Unsupported {
            src,
            name,
            extension,
        } => html! {
            div.unsupported {
                p {
                    @if extension.is_empty() {
                        "This file cannot be previewed."
                    } @else {
                        "Preview is not available for ." (extension) " files."
                    }
                }
                a href=(src) download { "Download " (name) }
            }
        },
        View::FetchFailed { path, message } => html! {
            div.error {
                h2 { "Could not load " (display_stem(path)) }
                p { (message) }
            }
        },
        View::RenderFailed {
            path,
            message,
            excerpt,
        } => html! {
            div.error {
                h2 { "Could not render " (display_stem(path)) }
                p { (message) }
                pre.error-excerpt { (excerpt) }
            }
        },
    }
}

/// Informational view shown for the empty fragment and `#about`.
fn render_about(config: &SiteConfig, first_file: Option<&str>) -> Markup {
    let about = &config.about;
    html! {
        div.markdown-body.homepage {
            h1 { (about.heading) }
            blockquote { p { (about.intro) } }
            h3 { "Start browsing" }
            div.homepage-links {
                @if let Some(first) = first_file {
                    a.nav-link.primary-link href={ "#" (fragment_for(first)) } { "Browse notes" }
                } @else {
                    p { "No notes yet." }
                }
            }
            @if !about.contacts.is_empty() {
                h3 { "Contact" }
                ul {
                    @for line in &about.contacts {
                        li { (line) }
                    }
                }
            }
        }
    }
}
