//! Recovery mode: when a statement fails to parse and
//! `options.recover` is set, the strict-mode `ParseError` never escapes.
//! Instead the cursor rewinds to the statement's first token, scans
//! forward to the next statement boundary honoring balanced brackets, and
//! the skipped span is wrapped into a `raw` node with reason
//! `Unsupported`. The statement's leading comments (already detached by
//! `parse_one_statement` before it failed) are reattached by the caller.

use sqlfmt_core::ast::{Comment, Raw, RawReason, Stmt, StmtKind};
use sqlfmt_core::ParseError;

use super::Parser;
use crate::options::RecoveredSpan;

impl<'a> Parser<'a> {
    /// `stmt_start` is the cursor position at the start of the statement
    /// that just failed to parse (the cursor has already been restored
    /// there by the caller); `leading` is that statement's leading
    /// comments, snapshotted before the failed parse attempt consumed
    /// them.
    pub(crate) fn recover_statement(
        &mut self,
        stmt_start: usize,
        leading: Vec<Comment>,
        _err: ParseError,
    ) -> Stmt {
        self.skip_to_recovery_boundary();
        let end = self.checkpoint();
        let text = self.raw_span_text(stmt_start, end);

        if let Some(cb) = self.on_recovery {
            let start_tok = &self.sig[stmt_start];
            cb(RecoveredSpan {
                text: text.clone(),
                line: start_tok.line,
                column: start_tok.column,
            });
        }

        Stmt::new(StmtKind::Raw(Raw {
            text,
            reason: RawReason::Unsupported,
        }))
        .with_comments(leading)
    }

    /// Scans forward from the current position to the next statement
    /// boundary: a top-level `;`, a stray psql `\` meta-command token, or
    /// end-of-input. Honors paren nesting so a `;` inside a subquery or
    /// function body doesn't end the scan early; strings, quoted
    /// identifiers, and comments were already consumed whole by the
    /// tokenizer, so no separate skip logic is needed for them here.
    fn skip_to_recovery_boundary(&mut self) {
        let mut depth: i32 = 0;
        loop {
            if self.is_eof() {
                return;
            }
            if depth <= 0 && self.at_punct(";") {
                return;
            }
            if depth <= 0 && self.at_operator("\\") {
                return;
            }
            if self.at_punct("(") || self.at_punct("[") {
                depth += 1;
            } else if self.at_punct(")") || self.at_punct("]") {
                depth -= 1;
            }
            self.bump();
        }
    }

    /// Reconstructs the exact source bytes spanning significant tokens
    /// `[from, to)` — unlike [`Parser::span_text`], which re-serializes
    /// with single-space joins, this slices the original input directly
    /// so the `raw` node is byte-for-byte faithful to the source.
    fn raw_span_text(&self, from: usize, to: usize) -> String {
        if from >= to || from >= self.sig.len() {
            return String::new();
        }
        let start_pos = self.sig[from].position;
        let end_pos = self.sig[to.min(self.sig.len() - 1)].position;
        self.src
            .get(start_pos..end_pos)
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}
