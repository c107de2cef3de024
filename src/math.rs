//! Formula handling for markdown notes.
//!
//! Notes write LaTeX between the usual delimiters:
//!
//! | Delimiter      | Mode    |
//! |----------------|---------|
//! | `$$ ... $$`    | display |
//! | `\[ ... \]`    | display |
//! | `$ ... $`      | inline  |
//! | `\( ... \)`    | inline  |
//!
//! How they are turned into markup is decided once per render by
//! [`MathStrategy`]:
//!
//! - **Plugin**: `\[..\]` and `\(..\)` are rewritten to dollar form and the
//!   markdown parser's math extension hands formulas over as events.
//! - **Fallback**: formulas are replaced in the raw text by pattern before
//!   the parser runs ([`substitute_formulas`]).
//! - **Source**: no formula renderer is available; formulas stay as typed.
//!
//! Both text rewrites take the byte ranges of code spans and code blocks and
//! leave them untouched.
//!
//! A formula that fails to render never fails the note. The text the author
//! wrote is kept and a warning is logged.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormulaError {
    #[error("cannot render formula: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathMode {
    Inline,
    Display,
}

/// Converts one LaTeX formula into markup.
pub trait FormulaRenderer {
    fn render(&self, tex: &str, mode: MathMode) -> Result<String, FormulaError>;
}

/// LaTeX → MathML through `latex2mathml`.
#[cfg(feature = "mathml")]
#[derive(Debug, Default, Clone, Copy)]
pub struct MathmlRenderer;

#[cfg(feature = "mathml")]
impl FormulaRenderer for MathmlRenderer {
    fn render(&self, tex: &str, mode: MathMode) -> Result<String, FormulaError> {
        use latex2mathml::{DisplayStyle, latex_to_mathml};
        let style = match mode {
            MathMode::Inline => DisplayStyle::Inline,
            MathMode::Display => DisplayStyle::Block,
        };
        latex_to_mathml(tex, style).map_err(|e| FormulaError::Rejected(e.to_string()))
    }
}

/// The renderer compiled into this build, if any.
pub fn default_renderer() -> Option<Box<dyn FormulaRenderer>> {
    #[cfg(feature = "mathml")]
    {
        Some(Box::new(MathmlRenderer))
    }
    #[cfg(not(feature = "mathml"))]
    {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathStrategy {
    Plugin,
    Fallback,
    Source,
}

impl MathStrategy {
    pub fn select(has_renderer: bool, plugin_enabled: bool) -> Self {
        match (has_renderer, plugin_enabled) {
            (false, _) => MathStrategy::Source,
            (true, true) => MathStrategy::Plugin,
            (true, false) => MathStrategy::Fallback,
        }
    }
}

static DISPLAY_DOLLARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\$\$(.*?)\$\$").expect("valid regex"));
static INLINE_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\\((.*?)\\\)").expect("valid regex"));
// `\[..\]` may span lines, `\(..\)` may not.
static BRACKETED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\\[((?s:.*?))\\\]|\\\((.*?)\\\)").expect("valid regex")
});

/// Render `tex`, or return `None` after logging why it failed.
pub fn try_render(renderer: &dyn FormulaRenderer, tex: &str, mode: MathMode) -> Option<String> {
    match renderer.render(tex.trim(), mode) {
        Ok(markup) => Some(markup),
        Err(e) => {
            log::warn!("Keeping formula source {tex:?}: {e}");
            None
        }
    }
}

/// Copy `text` into a new string, passing everything outside `skip` through
/// `rewrite`. `rewrite` appends to the output it is handed, so `out.len()`
/// is the output offset of the segment being written.
fn rewrite_outside(
    text: &str,
    skip: &[Range<usize>],
    mut rewrite: impl FnMut(&str, &mut String),
) -> String {
    let mut skip = skip.to_vec();
    skip.sort_by_key(|r| r.start);

    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    for range in skip {
        let start = range.start.clamp(pos, text.len());
        let end = range.end.clamp(start, text.len());
        rewrite(&text[pos..start], &mut out);
        out.push_str(&text[start..end]);
        pos = end;
    }
    rewrite(&text[pos..], &mut out);
    out
}

/// Replace every formula in `text` with rendered markup, leaving the
/// `skip` ranges (code) alone.
///
/// Three passes, in order: `$$..$$` (may span lines), `\(..\)`, then
/// `$..$`. A formula the renderer rejects is left exactly as written.
pub fn substitute_formulas(
    text: &str,
    skip: &[Range<usize>],
    renderer: &dyn FormulaRenderer,
) -> String {
    rewrite_outside(text, skip, |segment, out| {
        let render = |caps: &Captures, mode| {
            try_render(renderer, &caps[1], mode).unwrap_or_else(|| caps[0].to_string())
        };
        let display =
            DISPLAY_DOLLARS.replace_all(segment, |c: &Captures| render(c, MathMode::Display));
        let inline =
            INLINE_PARENS.replace_all(&display, |c: &Captures| render(c, MathMode::Inline));
        substitute_inline_dollars(&inline, renderer, out);
    })
}

/// Render `$..$` spans of `text` into `out`.
fn substitute_inline_dollars(text: &str, renderer: &dyn FormulaRenderer, out: &mut String) {
    let mut last = 0;
    for span in inline_dollar_spans(text) {
        out.push_str(&text[last..span.start]);
        let whole = &text[span.clone()];
        let tex = &whole[1..whole.len() - 1];
        match try_render(renderer, tex, MathMode::Inline) {
            Some(markup) => out.push_str(&markup),
            None => out.push_str(whole),
        }
        last = span.end;
    }
    out.push_str(&text[last..]);
}

fn is_ascii_word(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Byte ranges of inline `$..$` formulas, delimiters included.
///
/// Neither delimiter may touch an ASCII letter, digit or underscore on its
/// outer side, which keeps prices like "$5 and $10" out. Any other
/// character counts as a boundary, so formulas can sit directly between CJK
/// characters. A formula does not span lines.
fn inline_dollar_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut from = 0;
    while let Some(open) = text[from..].find('$').map(|i| from + i) {
        from = open + 1;
        if is_ascii_word(text[..open].chars().next_back()) {
            continue;
        }
        let mut body = text[open + 1..].char_indices();
        // At least one character, which may itself be a `$`
        match body.next() {
            None | Some((_, '\n')) => continue,
            Some(_) => {}
        }
        let close = body
            .take_while(|&(_, c)| c != '\n')
            .filter(|&(_, c)| c == '$')
            .map(|(i, _)| open + 1 + i)
            .find(|&close| !is_ascii_word(text[close + 1..].chars().next()));
        if let Some(close) = close {
            spans.push(open..close + 1);
            from = close + 1;
        }
    }
    spans
}

/// Note text rewritten for the parser's math extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    /// What the author wrote for each rewritten formula, keyed by the offset
    /// of its opening `$` in `text`.
    pub originals: BTreeMap<usize, String>,
}

/// Rewrite `\[..\]` to `$$..$$` and `\(..\)` to `$..$` outside the `skip`
/// ranges, so the parser's math extension sees one delimiter style.
pub fn normalize_delimiters(text: &str, skip: &[Range<usize>]) -> Normalized {
    let mut originals = BTreeMap::new();
    let text = rewrite_outside(text, skip, |segment, out| {
        let mut last = 0;
        for caps in BRACKETED.captures_iter(segment) {
            let Some(whole) = caps.get(0) else { continue };
            let dollars = match (caps.get(1), caps.get(2)) {
                (Some(tex), _) => format!("$${}$$", tex.as_str()),
                (None, Some(tex)) if !tex.as_str().trim().is_empty() => {
                    format!("${}$", tex.as_str().trim())
                }
                _ => continue,
            };
            out.push_str(&segment[last..whole.start()]);
            originals.insert(out.len(), whole.as_str().to_string());
            out.push_str(&dollars);
            last = whole.end();
        }
        out.push_str(&segment[last..]);
    });
    Normalized { text, originals }
}
