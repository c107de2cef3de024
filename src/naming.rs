//! Filename helpers shared by the scanner, the classifier and the renderer.
//!
//! ## Natural Ordering
//!
//! Notes are usually numbered by hand (`1. Start.md`, `2. Intro.md`,
//! `10. Advanced.md`), so plain string ordering puts `10.` before `2.`.
//! [`natural_cmp`] splits names into digit and non-digit runs, compares digit
//! runs by numeric value and everything else case-insensitively:
//!
//! - `"2. Intro"` < `"10. Advanced"`
//! - `"chapter 9"` < `"Chapter 10"`
//! - `"a"` == `"A"` (ties fall back to byte order for a stable result)

use std::cmp::Ordering;

/// Numeric-aware, case-insensitive comparison of two names.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Runs::new(a);
    let mut right = Runs::new(b);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = compare_runs(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn compare_runs(a: &str, b: &str) -> Ordering {
    let a_digits = a.starts_with(|c: char| c.is_ascii_digit());
    let b_digits = b.starts_with(|c: char| c.is_ascii_digit());
    match (a_digits, b_digits) {
        (true, true) => compare_numeric(a, b),
        // Digits sort before letters, as in locale-aware comparison.
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(b.chars().flat_map(char::to_lowercase)),
    }
}

/// Compare two digit runs by value without parsing (runs may exceed u64).
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Iterator over alternating digit / non-digit runs of a string.
struct Runs<'a> {
    rest: &'a str,
}

impl<'a> Runs<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Runs<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|&(_, c)| c.is_ascii_digit() != digits)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());
        let (run, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(run)
    }
}

/// Lower-cased extension of the last path segment, without the dot.
///
/// - `"notes/Intro.MD"` → `"md"`
/// - `"Makefile"` → `""`
/// - `".bashrc"` → `""` (a leading dot is a hidden name, not an extension)
pub fn extension_of(path: &str) -> String {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => String::new(),
        Some(i) => name[i + 1..].to_lowercase(),
    }
}

/// Last segment of a slash-separated path.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// File name with its extension removed, used as a display title.
///
/// - `"DIP/2. Basics.md"` → `"2. Basics"`
/// - `"archive.tar.gz"` → `"archive.tar"`
pub fn display_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(i) => &name[..i],
    }
}

/// Directory part of a slash-separated path including the trailing slash.
///
/// - `"a/b/c.md"` → `"a/b/"`
/// - `"c.md"` → `""`
pub fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[..=i],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(names: &[&str]) -> Vec<String> {
        let mut v: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        v.sort_by(|a, b| natural_cmp(a, b));
        v
    }

    #[test]
    fn numeric_prefixes_sort_by_value() {
        assert_eq!(
            sorted(&["2. Intro", "10. Advanced", "1. Start"]),
            vec!["1. Start", "2. Intro", "10. Advanced"]
        );
    }

    #[test]
    fn case_is_ignored() {
        assert_eq!(
            sorted(&["beta", "Alpha", "gamma"]),
            vec!["Alpha", "beta", "gamma"]
        );
    }

    #[test]
    fn embedded_numbers_compare_numerically() {
        assert_eq!(
            sorted(&["chapter 10", "Chapter 9", "chapter 1"]),
            vec!["chapter 1", "Chapter 9", "chapter 10"]
        );
    }

    #[test]
    fn leading_zeros_do_not_change_value() {
        assert_eq!(natural_cmp("007", "7"), "007".cmp("7"));
        assert_eq!(natural_cmp("008", "7"), Ordering::Greater);
    }

    #[test]
    fn very_long_digit_runs_do_not_overflow() {
        assert_eq!(
            natural_cmp("99999999999999999999999", "100000000000000000000000"),
            Ordering::Less
        );
    }

    #[test]
    fn prefix_sorts_first() {
        assert_eq!(natural_cmp("note", "note 2"), Ordering::Less);
    }

    #[test]
    fn extension_is_lowercased_without_dot() {
        assert_eq!(extension_of("dir/Photo.JPG"), "jpg");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of(".gitkeep"), "");
        assert_eq!(extension_of("a.b/c"), "");
    }

    #[test]
    fn display_stem_strips_last_extension() {
        assert_eq!(display_stem("DIP/2. Basics.md"), "2. Basics");
        assert_eq!(display_stem("archive.tar.gz"), "archive.tar");
        assert_eq!(display_stem("noext"), "noext");
    }

    #[test]
    fn parent_dir_keeps_trailing_slash() {
        assert_eq!(parent_dir("a/b/c.md"), "a/b/");
        assert_eq!(parent_dir("c.md"), "");
    }
}
