//! Heading anchor ids.
//!
//! [`slugify`] turns heading text into a URL-fragment-safe token and
//! [`SlugCounter`] makes those tokens unique within one rendered document:
//!
//! | Heading text        | id             |
//! |---------------------|----------------|
//! | `Getting Started`   | `getting-started` |
//! | `Getting Started`   | `getting-started-1` |
//! | `C++ & Rust!`       | `c-rust`       |
//! | `数据 结构`          | `数据-结构`     |
//! | `???`               | `heading`      |

use std::collections::{HashMap, HashSet};

/// Used when a heading slugifies to nothing (only punctuation, emoji, ...).
pub const FALLBACK_SLUG: &str = "heading";

/// Normalize heading text into a base id. May return an empty string.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.trim().chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() || c == '-' {
            pending_dash = true;
            continue;
        }
        if !is_slug_char(c) {
            continue;
        }
        if pending_dash && !slug.is_empty() {
            slug.push('-');
        }
        pending_dash = false;
        slug.push(c);
    }
    slug
}

/// ASCII word characters and the CJK unified ideographs block.
fn is_slug_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

/// Assigns unique ids to the headings of one document, in order.
///
/// The first occurrence of a base id is used as is; later ones get `-1`,
/// `-2`, ... Any suffixed id that is already taken (because a heading
/// literally slugified to it) is skipped.
#[derive(Debug, Default)]
pub struct SlugCounter {
    collisions: HashMap<String, usize>,
    used: HashSet<String>,
}

impl SlugCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = FALLBACK_SLUG.to_string();
        }

        let count = self.collisions.entry(base.clone()).or_insert(0);
        if *count == 0 && self.used.insert(base.clone()) {
            *count = 1;
            return base;
        }

        *count = (*count).max(1);
        loop {
            let candidate = format!("{base}-{count}");
            *count += 1;
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}
