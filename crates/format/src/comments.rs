//! Comment reattachment: every comment is emitted in its
//! original form, positioned immediately before the node it was attached
//! to by the parser.
//!
//! Two contexts need different treatment. An expression (or a subquery's
//! inner statement) sits mid-line, so its leading comments are emitted
//! right where the cursor already is: a block comment stays inline
//! followed by a single space, a line comment forces a newline back to
//! `margin` afterward since nothing can share its line. A top-level
//! statement (or a CTE's final body) always starts a genuinely fresh
//! line regardless of whether it carries comments.

use sqlfmt_core::ast::{Comment, CommentKind};

use crate::writer::Writer;

/// Emits a node's own leading comments at the cursor's current position
/// (see module docs for the block/line distinction). Used by every
/// `fmt_expr` call and by a subquery body's own leading comments.
pub(crate) fn place_inline(w: &mut Writer, margin: usize, comments: &[Comment]) {
    for c in comments {
        w.raw(&c.text);
        match c.kind {
            CommentKind::Block => w.space(),
            CommentKind::Line => w.newline(margin),
        }
    }
}

/// Moves to a fresh line at `margin` for a statement that always starts
/// its own line — the top-level statement list, a CTE's body — emitting
/// any leading comments on their own lines first.
pub(crate) fn place_fresh(w: &mut Writer, margin: usize, comments: &[Comment]) {
    for c in comments {
        w.newline(margin);
        w.raw(&c.text);
    }
    w.newline(margin);
}
