//! The recursive-descent parser.
//!
//! A single [`Parser`] struct holds the whole parsing state: the
//! significant-token slice, a rewindable cursor, and the depth counter. The
//! grammar is spread across sibling modules (`stmt`, `select`, `dml`,
//! `ddl`, `expr`, `recovery`) purely for file-size hygiene: a
//! code-organization split, not an interface one; every module is
//! `impl Parser` blocks on the same type.

mod ddl;
mod dml;
mod expr;
mod recovery;
mod select;
mod stmt;

use sqlfmt_core::ast::{Comment, CommentKind, Stmt};
use sqlfmt_core::{Dialect, MaxDepthError, ParseError, Token, TokenKind};

use crate::options::ParseOptions;
use crate::ParseFailure;

/// Internal propagation type: a strict-mode syntax error recovery mode can
/// swallow, or a depth-guard trip that even recovery mode must let escape
/// (`MaxDepthError` is always fatal to the call, recovery or not).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PErr {
    Parse(ParseError),
    Depth(MaxDepthError),
}

impl From<ParseError> for PErr {
    fn from(e: ParseError) -> Self {
        PErr::Parse(e)
    }
}

impl From<MaxDepthError> for PErr {
    fn from(e: MaxDepthError) -> Self {
        PErr::Depth(e)
    }
}

impl From<PErr> for ParseFailure {
    fn from(e: PErr) -> Self {
        match e {
            PErr::Parse(e) => ParseFailure::Parse(e),
            PErr::Depth(e) => ParseFailure::Depth(e),
        }
    }
}

pub(crate) type PResult<T> = Result<T, PErr>;

pub(crate) struct Parser<'a> {
    /// The original source text, kept only so recovery mode can slice out
    /// an exact verbatim byte span for the `raw` node it produces — every
    /// other part of the parser works off `sig`/`leading`.
    src: &'a str,
    /// Non-trivia tokens only (comments/whitespace are extracted into
    /// `leading` below), always ending with one `Eof`.
    sig: Vec<Token>,
    /// `leading[i]` holds the comments that appeared between `sig[i-1]`
    /// and `sig[i]` (or before `sig[0]`, for `i == 0`).
    leading: Vec<Vec<Comment>>,
    pos: usize,
    dialect: &'a Dialect,
    recover: bool,
    max_depth: usize,
    depth: usize,
    on_recovery: Option<fn(crate::options::RecoveredSpan)>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(src: &'a str, tokens: &[Token], options: &'a ParseOptions) -> Self {
        let (sig, leading) = split_trivia(tokens);
        Self {
            src,
            sig,
            leading,
            pos: 0,
            dialect: &options.dialect,
            recover: options.recover,
            max_depth: options.max_depth,
            depth: 0,
            on_recovery: options.on_recovery,
        }
    }

    pub(crate) fn parse_program(mut self) -> Result<Vec<Stmt>, ParseFailure> {
        let mut statements = Vec::new();
        loop {
            // Skip stray statement separators (`;;;` parses to an empty
            // statement list).
            while self.eat_punct(";") {}
            if self.is_eof() {
                break;
            }
            // Snapshot the cursor and leading comments *before* attempting
            // the statement: `parse_one_statement` takes its leading
            // comments as its very first action, so on failure they'd
            // otherwise be lost along with the rest of its local state.
            let stmt_start = self.checkpoint();
            let leading_preview = self.leading[stmt_start].clone();
            match self.parse_one_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(PErr::Depth(e)) => return Err(ParseFailure::Depth(e)),
                Err(PErr::Parse(e)) => {
                    if self.recover {
                        self.restore(stmt_start);
                        let raw = self.recover_statement(stmt_start, leading_preview, e);
                        statements.push(raw);
                    } else {
                        return Err(ParseFailure::Parse(e));
                    }
                }
            }
            if !self.eat_punct(";") && !self.is_eof() {
                // No separator between statements and we're not at EOF: in
                // strict mode this is itself a syntax error (two
                // statements glued together); in recovery mode resync.
                if !self.recover {
                    return Err(ParseFailure::Parse(ParseError::new(
                        "expected ';' between statements",
                        self.cur(),
                    )));
                }
            }
        }
        Ok(statements)
    }

    // -----------------------------------------------------------------
    // Cursor primitives
    // -----------------------------------------------------------------

    pub(crate) fn cur(&self) -> &Token {
        &self.sig[self.pos]
    }

    pub(crate) fn nth(&self, n: usize) -> &Token {
        let idx = (self.pos + n).min(self.sig.len() - 1);
        &self.sig[idx]
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.cur().kind == TokenKind::Eof
    }

    pub(crate) fn checkpoint(&self) -> usize {
        self.pos
    }

    pub(crate) fn restore(&mut self, cp: usize) {
        self.pos = cp;
    }

    /// Advance past the current token, returning a clone of it.
    pub(crate) fn bump(&mut self) -> Token {
        let tok = self.sig[self.pos].clone();
        if self.pos + 1 < self.sig.len() {
            self.pos += 1;
        }
        tok
    }

    /// Take (and clear) the comment bucket attached to the token at `idx`,
    /// for reattachment onto whatever AST node starts there.
    pub(crate) fn take_leading_at(&mut self, idx: usize) -> Vec<Comment> {
        std::mem::take(&mut self.leading[idx])
    }

    pub(crate) fn take_leading_here(&mut self) -> Vec<Comment> {
        self.take_leading_at(self.pos)
    }

    pub(crate) fn at_keyword(&self, kw: &str) -> bool {
        self.cur().is_keyword(kw)
    }

    pub(crate) fn at_any_keyword(&self, kws: &[&str]) -> bool {
        self.cur().kind == TokenKind::Keyword && kws.contains(&self.cur().upper.as_str())
    }

    pub(crate) fn at_punct(&self, p: &str) -> bool {
        self.cur().is_punct(p)
    }

    pub(crate) fn at_operator(&self, op: &str) -> bool {
        self.cur().is_operator(op)
    }

    pub(crate) fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.at_keyword(kw) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Eat a sequence of keywords that must all match consecutively
    /// (e.g. `ORDER BY`, `GROUP BY`, `IS NOT`), restoring the cursor if any
    /// one of them fails to match.
    pub(crate) fn eat_keyword_seq(&mut self, kws: &[&str]) -> bool {
        let cp = self.checkpoint();
        for kw in kws {
            if !self.eat_keyword(kw) {
                self.restore(cp);
                return false;
            }
        }
        true
    }

    pub(crate) fn eat_punct(&mut self, p: &str) -> bool {
        if self.at_punct(p) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_operator(&mut self, op: &str) -> bool {
        if self.at_operator(op) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_keyword(&mut self, kw: &str) -> PResult<Token> {
        if self.at_keyword(kw) {
            Ok(self.bump())
        } else {
            Err(self.err(format!("expected '{kw}'")))
        }
    }

    pub(crate) fn expect_punct(&mut self, p: &str) -> PResult<Token> {
        if self.at_punct(p) {
            Ok(self.bump())
        } else {
            Err(self.err(format!("expected '{p}'")))
        }
    }

    pub(crate) fn expect_operator(&mut self, op: &str) -> PResult<Token> {
        if self.at_operator(op) {
            Ok(self.bump())
        } else {
            Err(self.err(format!("expected '{op}'")))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> PResult<Token> {
        if self.cur().kind == TokenKind::Identifier
            || (self.cur().kind == TokenKind::Keyword && !sqlfmt_core::keywords::is_reserved(&self.cur().upper))
        {
            Ok(self.bump())
        } else {
            Err(self.err("expected an identifier"))
        }
    }

    pub(crate) fn err(&self, message: impl Into<String>) -> PErr {
        PErr::Parse(ParseError::new(message, self.cur()))
    }

    // -----------------------------------------------------------------
    // Depth guard
    // -----------------------------------------------------------------

    pub(crate) fn enter_depth(&mut self) -> PResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            self.depth -= 1;
            return Err(PErr::Depth(MaxDepthError::new(self.max_depth)));
        }
        Ok(())
    }

    pub(crate) fn exit_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Splits a raw token stream (with trivia) into the significant-token
/// slice the grammar matches against, plus a parallel comment-bucket
/// array: `leading[i]` is every comment that appeared strictly between
/// `sig[i-1]` and `sig[i]`.
fn split_trivia(tokens: &[Token]) -> (Vec<Token>, Vec<Vec<Comment>>) {
    let mut sig = Vec::new();
    let mut leading = Vec::new();
    let mut pending: Vec<Comment> = Vec::new();
    let mut last_sig_line: u32 = 0;

    for tok in tokens {
        match tok.kind {
            TokenKind::Whitespace => {}
            TokenKind::LineComment | TokenKind::BlockComment => {
                let kind = if tok.kind == TokenKind::LineComment {
                    CommentKind::Line
                } else {
                    CommentKind::Block
                };
                pending.push(Comment {
                    text: tok.text.to_string(),
                    kind,
                    trailing: tok.line == last_sig_line,
                });
            }
            _ => {
                last_sig_line = tok.line;
                sig.push(tok.clone());
                leading.push(std::mem::take(&mut pending));
            }
        }
    }
    (sig, leading)
}
