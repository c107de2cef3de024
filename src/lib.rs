//! # notesite
//!
//! Navigation index builder and markdown renderer for a personal notes site.
//! The content directory is the data source: folders become sections of the
//! sidebar, markdown files become notes, images and videos are linked
//! straight from disk.
//!
//! # Architecture: Scan, Then Render
//!
//! ```text
//! 1. Scan     public/      →  tree.json   (filesystem → navigation document)
//! 2. Render   #fragment    →  HTML page   (route → view → markup)
//! ```
//!
//! The scan runs offline whenever content changes. Rendering only needs the
//! navigation document and a way to read content bytes, so the same code
//! backs the `render` command and any server or static export built on top.
//!
//! Rendering a note runs entirely inside [`markdown`]: pulldown-cmark parses
//! the text, headings get unique ids from [`slug`], the heading list becomes
//! a table of contents in [`toc`], and formulas go through [`math`].
//! A [`session::Session`] ties routing, classification and fetching
//! together, and [`page`] turns its state into HTML.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the content directory, produces the navigation tree |
//! | [`nav`] | Loaded navigation tree: lookup, first file |
//! | [`route`] | URL fragment → route; path ↔ fragment encoding |
//! | [`classify`] | Extension → image / video / markdown / unsupported |
//! | [`session`] | Route → view, fetch tickets, stale response handling |
//! | [`source`] | Read content bytes by path |
//! | [`markdown`] | Note rendering: ids, TOC, math, image paths and sizes |
//! | [`math`] | Formula strategies and the LaTeX → MathML renderer |
//! | [`slug`] | Heading text → unique anchor id |
//! | [`toc`] | Flat heading list → nested table of contents |
//! | [`page`] | Full HTML page with Maud |
//! | [`lint`] | Read-only content checks |
//! | [`config`] | `notesite.toml` loading, validation, merging |
//! | [`types`] | Navigation document and heading types |
//! | [`naming`] | Natural ordering and filename helpers |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Events, Not Markup
//!
//! Heading ids, image paths and size hints are applied to pulldown-cmark
//! events before serialization. Nothing re-parses generated HTML, so raw
//! HTML written by the author is never rewritten by accident.
//!
//! ## Explicit Session State
//!
//! Active file, current route and the in-flight request live in a
//! [`session::Session`] value. Every navigation bumps a generation counter;
//! a fetch result carrying an older token is dropped, so a slow response
//! can never replace the note the reader moved on to.
//!
//! ## Failures Stay Local
//!
//! A missing navigation document gives an empty sidebar, a failed fetch or
//! render gives an inline error view, a bad formula keeps its source text.
//! Only the scanner fails hard, and only when the content root itself is
//! unusable.

pub mod classify;
pub mod config;
pub mod lint;
pub mod markdown;
pub mod math;
pub mod naming;
pub mod nav;
pub mod output;
pub mod page;
pub mod route;
pub mod scan;
pub mod session;
pub mod slug;
pub mod source;
pub mod toc;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
