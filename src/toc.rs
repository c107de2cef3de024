//! Table-of-contents construction.
//!
//! Turns the flat, document-ordered heading list collected during a render
//! into a forest. A heading nests under the nearest preceding heading with a
//! strictly lower level; headings with no such predecessor become roots.
//! Skipped levels (`h1` → `h3`) nest directly, and sequences that start
//! deep (`h3, h1, h2`) simply produce several roots. Nothing is reordered
//! or dropped.

use crate::types::{Heading, TocNode};

/// Build the TOC forest for `headings`.
pub fn build(headings: &[Heading]) -> Vec<TocNode> {
    let mut roots = Vec::new();
    // Open ancestors, outermost first. Levels strictly increase.
    let mut open: Vec<TocNode> = Vec::new();

    for heading in headings {
        while open.last().is_some_and(|top| top.level >= heading.level) {
            close_top(&mut open, &mut roots);
        }
        open.push(TocNode::from(heading));
    }
    while !open.is_empty() {
        close_top(&mut open, &mut roots);
    }
    roots
}

fn close_top(open: &mut Vec<TocNode>, roots: &mut Vec<TocNode>) {
    if let Some(node) = open.pop() {
        match open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }
}

/// Total number of nodes in a forest.
pub fn count(forest: &[TocNode]) -> usize {
    forest.iter().map(|n| 1 + count(&n.children)).sum()
}
