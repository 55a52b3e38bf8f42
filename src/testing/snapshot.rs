//! Snapshot rendering helpers.
//!
//! Functions for converting the drawn screen and the retained tree into
//! plain-text strings suitable for snapshot testing and assertions.

use std::fmt::Write;

use crate::render::Compositor;
use crate::tree::Tree;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Convert a full compositor screen to a plain text string.
///
/// Each row is right-trimmed of spaces and rows are joined with `'\n'`.
/// Trailing blank rows are kept so the string shows the window's height.
pub fn screen_to_string(compositor: &Compositor) -> String {
    let lines: Vec<String> = (0..compositor.height())
        .map(|y| compositor.row_text(y))
        .collect();
    lines.join("\n")
}

/// Render the tree's structure as an indented outline.
///
/// One line per node: its kind, then its key in brackets when keyed.
/// Children are indented two spaces below their parent.
///
/// ```text
/// Series
///   Text
///   Series [row-1]
///     Button
/// ```
pub fn tree_to_string(tree: &Tree) -> String {
    let mut out = String::new();
    let mut stack = vec![(tree.root(), 0usize)];
    while let Some((id, depth)) = stack.pop() {
        let node = &tree[id];
        let _ = write!(out, "{:indent$}{:?}", "", node.kind, indent = depth * 2);
        if let Some(key) = &node.key {
            let _ = write!(out, " [{key}]");
        }
        out.push('\n');
        let children: Vec<_> = tree.children(id).collect();
        stack.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
    }
    out.pop();
    out
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{CellStyle, Renderer};
    use crate::geometry::Offset;
    use crate::tree::ElementKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn screen_keeps_blank_rows() {
        let mut screen = Compositor::new(6, 3);
        let bounds = screen.bounds();
        screen.queue_text(Offset::new(1, 1), "hi", &CellStyle::default(), bounds);
        assert_eq!(screen_to_string(&screen), "\n hi\n");
    }

    #[test]
    fn zero_height_screen_is_empty() {
        assert_eq!(screen_to_string(&Compositor::new(4, 0)), "");
    }

    #[test]
    fn outline_shows_kinds_and_keys() {
        let mut tree = Tree::new(ElementKind::Series, 0);
        tree.begin();
        tree.advance(ElementKind::Text, || 0);
        tree.set_key("row");
        tree.advance(ElementKind::Series, || 1);
        tree.descend();
        tree.advance(ElementKind::Button, || 0);
        tree.ascend();
        tree.finish();
        insta::assert_snapshot!(tree_to_string(&tree), @r"
        Series
          Text
          Series [row]
            Button
        ");
    }
}
