//! URL fragment routing.
//!
//! The fragment is the only navigation input. `#` and `#about` show the
//! informational view; anything else is a percent-encoded content path:
//!
//! | Fragment                 | Mode                         |
//! |--------------------------|------------------------------|
//! | `` / `#`                 | `Home`                       |
//! | `#about`                 | `About`                      |
//! | `#DIP%2F1.%20Basics.md`  | `Content("DIP/1. Basics.md")` |

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

pub const ABOUT_FRAGMENT: &str = "about";

/// Characters escaped by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Same as [`COMPONENT`] but keeps path separators.
const PATH: &AsciiSet = &COMPONENT.remove(b'/');

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMode {
    Home,
    About,
    Content(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteState {
    /// Fragment as received, without the leading `#`.
    pub fragment: String,
    pub mode: RouteMode,
    /// Decoded content path; empty for `Home` and `About`.
    pub path: String,
}

impl RouteState {
    /// Home and About both show the informational view.
    pub fn is_informational(&self) -> bool {
        !matches!(self.mode, RouteMode::Content(_))
    }
}

pub fn resolve(fragment: &str) -> RouteState {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let mode = match fragment {
        "" => RouteMode::Home,
        ABOUT_FRAGMENT => RouteMode::About,
        encoded => RouteMode::Content(percent_decode_str(encoded).decode_utf8_lossy().into_owned()),
    };
    let path = match &mode {
        RouteMode::Content(path) => path.clone(),
        _ => String::new(),
    };
    RouteState {
        fragment: fragment.to_string(),
        mode,
        path,
    }
}

/// Fragment (without `#`) that resolves to `Content(path)`.
pub fn fragment_for(path: &str) -> String {
    utf8_percent_encode(path, COMPONENT).to_string()
}

/// URL under which the content file at `path` is served.
pub fn content_url(content_prefix: &str, path: &str) -> String {
    format!(
        "{}/{}",
        content_prefix.trim_end_matches('/'),
        utf8_percent_encode(path, PATH)
    )
}
