//! Navigation session: route → view.
//!
//! A [`Session`] owns everything that changes while a reader moves through
//! the site: the current route, the active file, the view being shown and
//! a generation counter for in-flight fetches.
//!
//! ## Fetch protocol
//!
//! ```text
//! navigate("#a.md")  → Fetch(ticket #1)      view: Loading
//! navigate("#b.md")  → Fetch(ticket #2)      view: Loading
//! complete(#1, ..)   → false (stale, dropped)
//! complete(#2, ..)   → true                  view: Note / FetchFailed / RenderFailed
//! ```
//!
//! Only markdown needs a fetch. Images, videos and other files are linked
//! straight from their content URL, and Home/About show the informational
//! view, so those navigations settle immediately.

use crate::classify::{ContentKind, classify};
use crate::config::{MediaConfig, SiteConfig};
use crate::markdown::{MarkdownPipeline, RenderError, RenderedNote, error_excerpt};
use crate::naming::{extension_of, file_name};
use crate::nav::NavigationIndex;
use crate::route::{self, RouteMode, RouteState};
use crate::source::{ContentSource, FetchError};
use crate::types::TocNode;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Informational view for Home and About.
    About,
    Image {
        src: String,
        name: String,
    },
    Video {
        src: String,
        name: String,
    },
    Unsupported {
        src: String,
        name: String,
        extension: String,
    },
    Loading {
        path: String,
    },
    Note {
        path: String,
        note: RenderedNote,
    },
    FetchFailed {
        path: String,
        message: String,
    },
    RenderFailed {
        path: String,
        message: String,
        /// Raw source prefix, not yet escaped.
        excerpt: String,
    },
}

/// A markdown fetch the caller must perform and hand back to
/// [`Session::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub token: u64,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Settled,
    Fetch(FetchTicket),
}

pub struct Session {
    index: NavigationIndex,
    media: MediaConfig,
    content_prefix: String,
    excerpt_chars: usize,
    route: RouteState,
    active: Option<String>,
    generation: u64,
    view: View,
}

impl Session {
    /// A session showing the informational view.
    pub fn new(index: NavigationIndex, config: &SiteConfig) -> Self {
        Self {
            index,
            media: config.media.clone(),
            content_prefix: config.content_prefix.clone(),
            excerpt_chars: config.markdown.error_excerpt_chars,
            route: route::resolve(""),
            active: None,
            generation: 0,
            view: View::About,
        }
    }

    /// Apply a fragment change.
    ///
    /// Clears the active selection, marks the matching file active (if the
    /// index has one) and invalidates any fetch still in flight.
    pub fn navigate(&mut self, fragment: &str) -> Navigation {
        let route = route::resolve(fragment);
        self.generation += 1;
        self.active = None;

        let navigation = match &route.mode {
            RouteMode::Home | RouteMode::About => {
                self.view = View::About;
                Navigation::Settled
            }
            RouteMode::Content(path) => {
                if self.index.contains_file(path) {
                    self.active = Some(path.clone());
                }
                self.dispatch(path)
            }
        };
        self.route = route;
        navigation
    }

    fn dispatch(&mut self, path: &str) -> Navigation {
        let name = file_name(path).to_string();
        let src = route::content_url(&self.content_prefix, path);
        let kind = classify(path, &self.media);
        log::debug!("{path}: {kind:?}");

        let view = match kind {
            ContentKind::Image => View::Image { src, name },
            ContentKind::Video => View::Video { src, name },
            ContentKind::Unsupported => View::Unsupported {
                src,
                name,
                extension: extension_of(path),
            },
            ContentKind::Markdown => {
                self.view = View::Loading {
                    path: path.to_string(),
                };
                return Navigation::Fetch(FetchTicket {
                    token: self.generation,
                    path: path.to_string(),
                });
            }
        };
        self.view = view;
        Navigation::Settled
    }

    /// Deliver the result of a fetch. Returns `false` when the ticket is
    /// stale and the result was discarded.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<u8>, FetchError>,
        pipeline: &MarkdownPipeline,
    ) -> bool {
        if ticket.token != self.generation {
            log::debug!(
                "Discarding stale response for {} (token {}, current {})",
                ticket.path,
                ticket.token,
                self.generation
            );
            return false;
        }

        let path = ticket.path.clone();
        self.view = match result {
            Err(e) => {
                log::warn!("Failed to load {path}: {e}");
                View::FetchFailed {
                    path,
                    message: e.to_string(),
                }
            }
            Ok(bytes) => match render_guarded(pipeline, &bytes, &path) {
                Ok(note) => View::Note { path, note },
                Err(e) => {
                    log::warn!("Failed to render {path}: {e}");
                    View::RenderFailed {
                        path,
                        message: e.to_string(),
                        excerpt: error_excerpt(&bytes, self.excerpt_chars),
                    }
                }
            },
        };
        true
    }

    /// Navigate and, when a fetch is needed, perform it synchronously.
    pub fn open(
        &mut self,
        fragment: &str,
        source: &dyn ContentSource,
        pipeline: &MarkdownPipeline,
    ) -> &View {
        if let Navigation::Fetch(ticket) = self.navigate(fragment) {
            let result = source.read(&ticket.path);
            self.complete(&ticket, result, pipeline);
        }
        &self.view
    }

    pub fn index(&self) -> &NavigationIndex {
        &self.index
    }

    pub fn route(&self) -> &RouteState {
        &self.route
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    /// True while the informational view is shown.
    pub fn is_home(&self) -> bool {
        self.route.is_informational()
    }

    pub fn active_path(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// TOC of the rendered note; empty for every other view.
    pub fn toc(&self) -> &[TocNode] {
        match &self.view {
            View::Note { note, .. } => &note.toc,
            _ => &[],
        }
    }
}

/// Render, turning a panic inside the markdown stack into an error.
fn render_guarded(
    pipeline: &MarkdownPipeline,
    bytes: &[u8],
    path: &str,
) -> Result<RenderedNote, RenderError> {
    panic::catch_unwind(AssertUnwindSafe(|| pipeline.render_bytes(bytes, path)))
        .unwrap_or_else(|payload| Err(RenderError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
