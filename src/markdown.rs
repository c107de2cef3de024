//! Markdown note rendering.
//!
//! One call to [`MarkdownPipeline::render`] turns a note into HTML and its
//! table of contents:
//!
//! 1. Formulas are prepared according to the selected [`MathStrategy`].
//! 2. pulldown-cmark parses the text (tables, strikethrough, task lists,
//!    smart punctuation; raw HTML passes through).
//! 3. Headings get unique anchor ids and are collected for the TOC.
//! 4. Inline events are rewritten: soft breaks become `<br>`, bare URLs
//!    become links, math events become markup, images get their `src`
//!    resolved and their `alt|WxH` size hint applied.
//! 5. The body is wrapped in a title block named after the file.
//!
//! ## Image paths
//!
//! Relative image sources are resolved against the note's directory under
//! the content prefix, so `![](img/a.png)` in `DIP/1. Basics.md` becomes
//! `/public/DIP/img/a.png`. Sources starting with `http://`, `https://`,
//! `data:` or `/` are left alone. Images written as raw `<img>` tags are
//! not touched.
//!
//! ## Image size hint
//!
//! ```markdown
//! ![Diagram|400](d.png)        → width="400", alt="Diagram"
//! ![Diagram|400x300](d.png)    → width="400" height="300"
//! ![a|b](d.png)                → alt="a|b" (not a size, left as is)
//! ```

use crate::config::SiteConfig;
use crate::math::{self, FormulaRenderer, MathMode, MathStrategy};
use crate::naming::{display_stem, parent_dir};
use crate::slug::SlugCounter;
use crate::toc;
use crate::types::{Heading, TocNode};
use maud::{Markup, PreEscaped, html};
use pulldown_cmark::{
    CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd, html as cmark_html,
};
use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("note is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("markdown renderer panicked: {0}")]
    Panicked(String),
}

/// A rendered note, ready to be placed in the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedNote {
    /// File name without extension.
    pub title: String,
    /// Title block plus body.
    pub html: String,
    pub toc: Vec<TocNode>,
    /// Flat heading list in document order.
    pub headings: Vec<Heading>,
}

pub struct MarkdownPipeline {
    renderer: Option<Box<dyn FormulaRenderer>>,
    math_plugin: bool,
    /// Without trailing slash.
    content_prefix: String,
}

impl MarkdownPipeline {
    /// Pipeline configured from `config`, using the formula renderer
    /// compiled into this build.
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            renderer: math::default_renderer(),
            math_plugin: config.markdown.math_plugin,
            content_prefix: config.content_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Replace the formula renderer. `None` leaves formulas as source text.
    pub fn with_renderer(mut self, renderer: Option<Box<dyn FormulaRenderer>>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn strategy(&self) -> MathStrategy {
        MathStrategy::select(self.renderer.is_some(), self.math_plugin)
    }

    /// Render raw note bytes. Fails only when they are not UTF-8.
    pub fn render_bytes(&self, bytes: &[u8], path: &str) -> Result<RenderedNote, RenderError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(self.render(text, path))
    }

    /// Render `text`, the content of the note at `path` (relative to the
    /// content root).
    pub fn render(&self, text: &str, path: &str) -> RenderedNote {
        let strategy = self.strategy();
        log::debug!("Rendering {path} ({strategy:?} math)");

        let base_options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION;
        let mut originals = BTreeMap::new();
        let source: Cow<str> = match (strategy, self.renderer.as_deref()) {
            (MathStrategy::Fallback, Some(renderer)) => Cow::Owned(math::substitute_formulas(
                text,
                &code_ranges(text, base_options),
                renderer,
            )),
            (MathStrategy::Plugin, _) => {
                let normalized =
                    math::normalize_delimiters(text, &code_ranges(text, base_options));
                originals = normalized.originals;
                Cow::Owned(normalized.text)
            }
            _ => Cow::Borrowed(text),
        };

        let mut options = base_options;
        if strategy == MathStrategy::Plugin {
            options |= Options::ENABLE_MATH;
        }

        // Formula source as written, one entry per math event in order.
        let mut formula_sources = Vec::new();
        let events: Vec<Event> = Parser::new_ext(&source, options)
            .into_offset_iter()
            .inspect(|(event, range)| {
                if matches!(event, Event::InlineMath(_) | Event::DisplayMath(_)) {
                    let written = originals
                        .get(&range.start)
                        .cloned()
                        .unwrap_or_else(|| source[range.clone()].to_string());
                    formula_sources.push(written);
                }
            })
            .map(|(event, _)| event)
            .collect();
        let (events, headings) = assign_heading_ids(events);
        let events = InlineRewriter {
            renderer: self.renderer.as_deref(),
            doc_dir: parent_dir(path),
            content_prefix: &self.content_prefix,
            formula_sources: formula_sources.into_iter(),
        }
        .rewrite(events);

        let mut body = String::with_capacity(text.len() * 3 / 2);
        cmark_html::push_html(&mut body, events.into_iter());

        let title = display_stem(path).to_string();
        RenderedNote {
            html: title_block(&title, &body).into_string(),
            toc: toc::build(&headings),
            title,
            headings,
        }
    }
}

/// Byte ranges of code spans, code blocks and raw HTML in `text`. Formula
/// rewriting leaves them alone.
fn code_ranges(text: &str, options: Options) -> Vec<Range<usize>> {
    Parser::new_ext(text, options)
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(_) | Tag::HtmlBlock) | Event::Code(_) => Some(range),
            _ => None,
        })
        .collect()
}

fn title_block(title: &str, body: &str) -> Markup {
    html! {
        h1.note-title { (title) }
        div.note-content { (PreEscaped(body)) }
    }
}

/// Escaped-on-render prefix of a note that failed to render.
pub fn error_excerpt(bytes: &[u8], max_chars: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    let mut excerpt: String = text.chars().take(max_chars).collect();
    excerpt.push_str("...");
    excerpt
}

// ============================================================================
// Headings
// ============================================================================

struct PendingHeading<'a> {
    level: HeadingLevel,
    classes: Vec<CowStr<'a>>,
    attrs: Vec<(CowStr<'a>, Option<CowStr<'a>>)>,
    inner: Vec<Event<'a>>,
    text: String,
}

/// Buffer each heading, derive its plain text and attach a unique id.
fn assign_heading_ids(events: Vec<Event<'_>>) -> (Vec<Event<'_>>, Vec<Heading>) {
    let mut slugs = SlugCounter::new();
    let mut out = Vec::with_capacity(events.len());
    let mut headings = Vec::new();
    let mut pending: Option<PendingHeading> = None;

    for event in events {
        match event {
            Event::Start(Tag::Heading {
                level,
                classes,
                attrs,
                ..
            }) => {
                pending = Some(PendingHeading {
                    level,
                    classes,
                    attrs,
                    inner: Vec::new(),
                    text: String::new(),
                });
            }
            Event::End(TagEnd::Heading(end_level)) => {
                let Some(heading) = pending.take() else {
                    out.push(event);
                    continue;
                };
                let text = heading.text.trim().to_string();
                let id = slugs.assign(&text);
                out.push(Event::Start(Tag::Heading {
                    level: heading.level,
                    id: Some(CowStr::from(id.clone())),
                    classes: heading.classes,
                    attrs: heading.attrs,
                }));
                out.extend(heading.inner);
                out.push(Event::End(TagEnd::Heading(end_level)));
                headings.push(Heading {
                    level: heading.level as u8,
                    text,
                    id,
                });
            }
            other => match pending.as_mut() {
                Some(heading) => {
                    match &other {
                        Event::Text(t)
                        | Event::Code(t)
                        | Event::InlineMath(t)
                        | Event::DisplayMath(t) => heading.text.push_str(t),
                        Event::SoftBreak | Event::HardBreak => heading.text.push(' '),
                        _ => {}
                    }
                    heading.inner.push(other);
                }
                None => out.push(other),
            },
        }
    }
    (out, headings)
}

// ============================================================================
// Inline rewriting
// ============================================================================

static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"'`]+"#).expect("valid regex"));
static SIZE_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?:x(\d+))?$").expect("valid regex"));

struct InlineRewriter<'p> {
    renderer: Option<&'p dyn FormulaRenderer>,
    doc_dir: &'p str,
    content_prefix: &'p str,
    /// Source text of each math event, consumed in document order.
    formula_sources: std::vec::IntoIter<String>,
}

/// An image whose alt text is still being collected.
struct PendingImage {
    dest: String,
    title: String,
    alt: String,
    /// Images nested inside this one's alt text.
    depth: usize,
}

impl InlineRewriter<'_> {
    fn rewrite<'a>(mut self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut out = Vec::with_capacity(events.len());
        let mut link_depth = 0usize;
        let mut in_code_block = false;
        let mut image: Option<PendingImage> = None;
        // Adjacent text events are merged so URLs are never split.
        let mut text = String::new();

        for event in events {
            if let Some(pending) = image.as_mut() {
                match event {
                    Event::Start(Tag::Image { .. }) => pending.depth += 1,
                    Event::End(TagEnd::Image) if pending.depth > 0 => pending.depth -= 1,
                    Event::End(TagEnd::Image) => {
                        if let Some(done) = image.take() {
                            out.push(Event::InlineHtml(self.image_html(&done).into()));
                        }
                    }
                    Event::InlineMath(t) | Event::DisplayMath(t) => {
                        self.formula_sources.next();
                        pending.alt.push_str(&t);
                    }
                    Event::Text(t) | Event::Code(t) => pending.alt.push_str(&t),
                    _ => {}
                }
                continue;
            }

            if let Event::Text(t) = &event {
                if link_depth == 0 && !in_code_block {
                    text.push_str(t);
                    continue;
                }
            }
            if !text.is_empty() {
                linkify(&std::mem::take(&mut text), &mut out);
            }

            match event {
                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) => {
                    image = Some(PendingImage {
                        dest: dest_url.to_string(),
                        title: title.to_string(),
                        alt: String::new(),
                        depth: 0,
                    });
                }
                Event::Start(Tag::Link { .. }) => {
                    link_depth += 1;
                    out.push(event);
                }
                Event::End(TagEnd::Link) => {
                    link_depth = link_depth.saturating_sub(1);
                    out.push(event);
                }
                Event::InlineHtml(ref html) => {
                    if opens_html_link(html) {
                        link_depth += 1;
                    } else if closes_html_link(html) {
                        link_depth = link_depth.saturating_sub(1);
                    }
                    out.push(event);
                }
                Event::Start(Tag::CodeBlock(_)) => {
                    in_code_block = true;
                    out.push(event);
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code_block = false;
                    out.push(event);
                }
                Event::SoftBreak => out.push(Event::HardBreak),
                Event::InlineMath(tex) => out.push(self.math_event(&tex, MathMode::Inline)),
                Event::DisplayMath(tex) => out.push(self.math_event(&tex, MathMode::Display)),
                other => out.push(other),
            }
        }
        if !text.is_empty() {
            linkify(&text, &mut out);
        }
        out
    }

    fn math_event<'a>(&mut self, tex: &str, mode: MathMode) -> Event<'a> {
        let written = self.formula_sources.next();
        let rendered = self
            .renderer
            .and_then(|renderer| math::try_render(renderer, tex, mode));
        match rendered {
            Some(markup) => Event::InlineHtml(markup.into()),
            None => Event::Text(
                written
                    .unwrap_or_else(|| match mode {
                        MathMode::Inline => format!("${tex}$"),
                        MathMode::Display => format!("$${tex}$$"),
                    })
                    .into(),
            ),
        }
    }

    fn image_html(&self, image: &PendingImage) -> String {
        let (alt, size) = split_size_hint(&image.alt);
        let src = resolve_image_src(&image.dest, self.doc_dir, self.content_prefix);
        let title = (!image.title.is_empty()).then_some(image.title.as_str());
        html! {
            img src=(src) alt=(alt) title=[title]
                width=[size.map(|s| s.width)] height=[size.and_then(|s| s.height)];
        }
        .into_string()
    }
}

/// `<a>` or `<a ...>` written as raw inline HTML.
fn opens_html_link(html: &str) -> bool {
    html_tag_follows(html, "<a")
}

fn closes_html_link(html: &str) -> bool {
    html_tag_follows(html, "</a")
}

fn html_tag_follows(html: &str, prefix: &str) -> bool {
    let html = html.trim_start();
    html.get(..prefix.len())
        .is_some_and(|start| start.eq_ignore_ascii_case(prefix))
        && html[prefix.len()..].starts_with(|c: char| c == '>' || c.is_ascii_whitespace())
}

/// Emit `text` as text events, turning bare `http(s)://` URLs into links.
fn linkify<'a>(text: &str, out: &mut Vec<Event<'a>>) {
    let mut last = 0;
    for m in BARE_URL.find_iter(text) {
        let url = m
            .as_str()
            .trim_end_matches(['.', ',', ';', ':', '!', '?', ')', ']']);
        if url.ends_with("://") {
            continue;
        }
        if m.start() > last {
            out.push(Event::Text(text[last..m.start()].to_string().into()));
        }
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: url.to_string().into(),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        out.push(Event::Text(url.to_string().into()));
        out.push(Event::End(TagEnd::Link));
        last = m.start() + url.len();
    }
    if last < text.len() {
        out.push(Event::Text(text[last..].to_string().into()));
    }
}

/// Resolve a markdown image source against the note's directory.
pub fn resolve_image_src(src: &str, doc_dir: &str, content_prefix: &str) -> String {
    let absolute = ["http://", "https://", "data:", "/"]
        .iter()
        .any(|p| src.starts_with(p));
    if src.is_empty() || absolute {
        return src.to_string();
    }
    let src = src.strip_prefix("./").unwrap_or(src);
    format!("{content_prefix}/{doc_dir}{src}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: Option<u32>,
}

/// Split `display | WxH` alt text. Returns the alt unchanged when the part
/// after the first `|` is not a size.
pub fn split_size_hint(alt: &str) -> (&str, Option<ImageSize>) {
    let mut parts = alt.split('|');
    let (Some(display), Some(size)) = (parts.next(), parts.next()) else {
        return (alt, None);
    };
    let Some(caps) = SIZE_HINT.captures(size.trim()) else {
        return (alt, None);
    };
    let Ok(width) = caps[1].parse() else {
        return (alt, None);
    };
    let height = caps.get(2).and_then(|h| h.as_str().parse().ok());
    (display.trim(), Some(ImageSize { width, height }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FailingRenderer, StubRenderer};

    fn pipeline() -> MarkdownPipeline {
        MarkdownPipeline::new(&SiteConfig::default()).with_renderer(Some(Box::new(StubRenderer)))
    }

    fn fallback_pipeline() -> MarkdownPipeline {
        let mut config = SiteConfig::default();
        config.markdown.math_plugin = false;
        MarkdownPipeline::new(&config).with_renderer(Some(Box::new(StubRenderer)))
    }

    fn plain_pipeline() -> MarkdownPipeline {
        MarkdownPipeline::new(&SiteConfig::default()).with_renderer(None)
    }

    #[test]
    fn title_block_wraps_body() {
        let note = plain_pipeline().render("Hello", "DIP/2. Basics.md");
        assert_eq!(note.title, "2. Basics");
        assert!(note.html.starts_with(r#"<h1 class="note-title">2. Basics</h1>"#));
        assert!(note.html.contains(r#"<div class="note-content"><p>Hello</p>"#));
    }

    #[test]
    fn title_is_escaped() {
        let note = plain_pipeline().render("", "<b>.md");
        assert!(note.html.contains("&lt;b&gt;"));
    }

    #[test]
    fn headings_get_ids_and_toc() {
        let md = "# Intro\n\n## Setup\n\n## Setup\n\n# Usage";
        let note = plain_pipeline().render(md, "a.md");
        assert!(note.html.contains(r#"<h1 id="intro">Intro</h1>"#));
        assert!(note.html.contains(r#"<h2 id="setup">Setup</h2>"#));
        assert!(note.html.contains(r#"<h2 id="setup-1">Setup</h2>"#));
        let ids: Vec<&str> = note.headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["intro", "setup", "setup-1", "usage"]);
        assert_eq!(note.toc.len(), 2);
        assert_eq!(note.toc[0].children.len(), 2);
    }

    #[test]
    fn heading_text_is_flattened() {
        let note = plain_pipeline().render("## The `run` *command*", "a.md");
        assert_eq!(note.headings[0].text, "The run command");
        assert_eq!(note.headings[0].id, "the-run-command");
        assert!(note.html.contains("<code>run</code>"));
    }

    #[test]
    fn heading_without_text_uses_fallback_id() {
        let note = plain_pipeline().render("# !!!", "a.md");
        assert_eq!(note.headings[0].id, "heading");
    }

    #[test]
    fn no_headings_gives_empty_toc() {
        let note = plain_pipeline().render("just text", "a.md");
        assert!(note.toc.is_empty());
        assert!(note.headings.is_empty());
    }

    #[test]
    fn soft_breaks_become_line_breaks() {
        let note = plain_pipeline().render("one\ntwo", "a.md");
        assert!(note.html.contains("one<br />\ntwo"));
    }

    #[test]
    fn raw_html_passes_through() {
        let note = plain_pipeline().render("<div class=\"box\">hi</div>", "a.md");
        assert!(note.html.contains("<div class=\"box\">hi</div>"));
    }

    #[test]
    fn bare_urls_are_linked() {
        let note = plain_pipeline().render("see https://example.com/a_b.", "a.md");
        assert!(
            note.html
                .contains(r#"<a href="https://example.com/a_b">https://example.com/a_b</a>."#)
        );
    }

    #[test]
    fn urls_in_links_and_code_are_not_relinked() {
        let md = "[site](https://a.example) `https://b.example`\n\n```\nhttps://c.example\n```";
        let note = plain_pipeline().render(md, "a.md");
        assert_eq!(note.html.matches("<a ").count(), 1);
        assert!(note.html.contains("<code>https://b.example</code>"));
        assert!(note.html.contains("https://c.example\n</code>"));
    }

    #[test]
    fn urls_inside_raw_html_links_are_not_relinked() {
        let md = r#"go <a href="https://x.example">https://x.example</a> then https://y.example"#;
        let note = plain_pipeline().render(md, "a.md");
        assert_eq!(note.html.matches("<a ").count(), 2);
        assert!(note.html.contains(r#"<a href="https://y.example">"#));
    }

    #[test]
    fn relative_image_is_resolved_against_note_dir() {
        let note = plain_pipeline().render("![d](img/d.png)", "DIP/1. Basics.md");
        assert!(note.html.contains(r#"src="/public/DIP/img/d.png""#));
    }

    #[test]
    fn absolute_and_rooted_images_untouched() {
        let md = "![a](https://x.example/a.png) ![b](/b.png) ![c](data:image/png;base64,AA)";
        let note = plain_pipeline().render(md, "n/a.md");
        assert!(note.html.contains(r#"src="https://x.example/a.png""#));
        assert!(note.html.contains(r#"src="/b.png""#));
        assert!(note.html.contains(r#"src="data:image/png;base64,AA""#));
    }

    #[test]
    fn raw_img_tags_are_not_rewritten() {
        let note = plain_pipeline().render(r#"<img src="rel.png">"#, "n/a.md");
        assert!(note.html.contains(r#"<img src="rel.png">"#));
    }

    #[test]
    fn size_hint_sets_width_and_height() {
        let note = plain_pipeline().render("![Diagram|400x300](d.png)", "a.md");
        assert!(note.html.contains(r#"alt="Diagram""#));
        assert!(note.html.contains(r#"width="400""#));
        assert!(note.html.contains(r#"height="300""#));
    }

    #[test]
    fn size_hint_width_only() {
        let note = plain_pipeline().render("![Diagram | 250](d.png)", "a.md");
        assert!(note.html.contains(r#"alt="Diagram""#));
        assert!(note.html.contains(r#"width="250""#));
        assert!(!note.html.contains("height="));
    }

    #[test]
    fn non_size_pipe_keeps_alt() {
        let note = plain_pipeline().render("![a|b](d.png)", "a.md");
        assert!(note.html.contains(r#"alt="a|b""#));
        assert!(!note.html.contains("width="));
    }

    #[test]
    fn image_title_is_kept() {
        let note = plain_pipeline().render(r#"![x](d.png "Caption")"#, "a.md");
        assert!(note.html.contains(r#"title="Caption""#));
    }

    #[test]
    fn split_size_hint_cases() {
        assert_eq!(
            split_size_hint("A|10x20"),
            ("A", Some(ImageSize { width: 10, height: Some(20) }))
        );
        assert_eq!(split_size_hint("A|10"), ("A", Some(ImageSize { width: 10, height: None })));
        assert_eq!(split_size_hint("A|10x"), ("A|10x", None));
        assert_eq!(split_size_hint("plain"), ("plain", None));
    }

    #[test]
    fn resolve_image_src_cases() {
        assert_eq!(resolve_image_src("a.png", "", "/public"), "/public/a.png");
        assert_eq!(resolve_image_src("./a.png", "x/", "/public"), "/public/x/a.png");
        assert_eq!(resolve_image_src("../a.png", "x/", "/c"), "/c/x/../a.png");
        assert_eq!(resolve_image_src("/a.png", "x/", "/public"), "/a.png");
    }

    #[test]
    fn plugin_renders_math_events() {
        let note = pipeline().render("Euler: $e^{i\\pi}$\n\n$$\nx=1\n$$", "a.md");
        assert!(note.html.contains("<m i>e^{i\\pi}</m>"));
        assert!(note.html.contains("<m d>x=1</m>"));
    }

    #[test]
    fn plugin_accepts_bracket_delimiters() {
        let note = pipeline().render(r"inline \(a\) and \[b\]", "a.md");
        assert!(note.html.contains("<m i>a</m>"));
        assert!(note.html.contains("<m d>b</m>"));
    }

    #[test]
    fn plugin_leaves_code_alone() {
        let md = "```\nsed s/\\(foo\\)/x/\n```\n\nuse `a\\[0\\]` here";
        let note = pipeline().render(md, "a.md");
        assert!(note.html.contains(r"<code>sed s/\(foo\)/x/"));
        assert!(note.html.contains(r"<code>a\[0\]</code>"));
        assert!(!note.html.contains("<m "));
    }

    #[test]
    fn plugin_failure_keeps_bracket_delimiters() {
        let note = pipeline().render("bad \\(\\fail\\) here\n\n\\[\\fail\\]", "a.md");
        assert!(note.html.contains(r"bad \(\fail\) here"));
        assert!(note.html.contains(r"<p>\[\fail\]</p>"));
    }

    #[test]
    fn plugin_failure_keeps_dollar_source() {
        let note = pipeline().render("ok $x$ bad $\\fail$", "a.md");
        assert!(note.html.contains(r"ok <m i>x</m> bad $\fail$"));
    }

    #[test]
    fn fallback_leaves_code_alone() {
        let note = fallback_pipeline().render("`$x$` and $y$", "a.md");
        assert!(note.html.contains("<code>$x$</code> and <m i>y</m>"));
    }

    #[test]
    fn fallback_renders_formulas_between_cjk() {
        let note = fallback_pipeline().render("设函数$f(x)$为连续函数", "a.md");
        assert!(note.html.contains("设函数<m i>f(x)</m>为连续函数"));
    }

    #[test]
    fn fallback_substitutes_before_parsing() {
        let note = fallback_pipeline().render("$$ a+b $$ and $c$", "a.md");
        assert!(note.html.contains("<m d>a+b</m> and <m i>c</m>"));
    }

    #[test]
    fn fallback_leaves_prices_alone() {
        let note = fallback_pipeline().render("$5 and $10", "a.md");
        assert!(note.html.contains("$5 and $10"));
    }

    #[test]
    fn failed_formula_keeps_source() {
        let note = MarkdownPipeline::new(&SiteConfig::default())
            .with_renderer(Some(Box::new(FailingRenderer)))
            .render("value $x$ here", "a.md");
        assert!(note.html.contains("value $x$ here"));
    }

    #[test]
    fn no_renderer_leaves_formulas_as_text() {
        let note = plain_pipeline().render("$x$", "a.md");
        assert_eq!(plain_pipeline().strategy(), MathStrategy::Source);
        assert!(note.html.contains("<p>$x$</p>"));
    }

    #[test]
    fn math_in_heading_contributes_text() {
        let note = pipeline().render("## Area $r^2$", "a.md");
        assert_eq!(note.headings[0].text, "Area r^2");
    }

    #[test]
    fn render_bytes_rejects_invalid_utf8() {
        let result = plain_pipeline().render_bytes(&[0x66, 0xff, 0xfe], "a.md");
        assert!(matches!(result, Err(RenderError::Utf8(_))));
    }

    #[test]
    fn error_excerpt_truncates_and_appends_ellipsis() {
        let source = "x".repeat(300);
        let excerpt = error_excerpt(source.as_bytes(), 200);
        assert_eq!(excerpt.len(), 203);
        assert!(excerpt.ends_with("..."));
        assert_eq!(error_excerpt(b"short", 200), "short...");
    }
}
