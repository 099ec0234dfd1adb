//! The output buffer: a mutable output buffer and a margin stack.
//!
//! Formatting is river-aligned rather than block-indented: instead of a
//! fixed number of spaces per nesting level, each clause keyword is
//! right-padded so its trailing letter lands on a column fixed for the
//! whole statement (the *river*). [`Writer`] tracks that as a stack of
//! *margins* (the absolute column a nested construct's clauses start
//! from — advanced for subqueries) rather than an indent-width stack,
//! since river width varies statement to statement.

use sqlfmt_core::FormatterError;

pub(crate) struct Writer {
    buf: String,
    margins: Vec<usize>,
    depth: usize,
    max_depth: usize,
}

impl Writer {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            buf: String::new(),
            margins: vec![0],
            depth: 0,
            max_depth,
        }
    }

    pub(crate) fn margin(&self) -> usize {
        *self.margins.last().expect("margin stack is never empty")
    }

    pub(crate) fn push_margin(&mut self, col: usize) {
        self.margins.push(col);
    }

    pub(crate) fn pop_margin(&mut self) {
        self.margins.pop();
    }

    /// Current column of the cursor on its line (counted from the last
    /// `\n`, in chars — good enough for ASCII-dominated SQL keywords and
    /// identifiers; the tokenizer's UTF-16 column convention is for
    /// diagnostics, not formatter layout).
    pub(crate) fn column(&self) -> usize {
        match self.buf.rfind('\n') {
            Some(i) => self.buf[i + 1..].chars().count(),
            None => self.buf.chars().count(),
        }
    }

    pub(crate) fn raw(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    pub(crate) fn space(&mut self) {
        self.buf.push(' ');
    }

    pub(crate) fn pad_to(&mut self, col: usize) {
        let cur = self.column();
        if col > cur {
            self.buf.push_str(&" ".repeat(col - cur));
        }
    }

    /// Starts a new line indented to `col` absolute columns.
    pub(crate) fn newline(&mut self, col: usize) {
        // Collapse trailing whitespace-only content on the line being
        // closed (a clause with no body, e.g. `DEFAULT VALUES`, never
        // leaves a ragged blank line behind).
        while self.buf.ends_with(' ') {
            self.buf.pop();
        }
        self.buf.push('\n');
        self.buf.push_str(&" ".repeat(col));
    }

    /// Writes a clause keyword right-aligned within `river` columns
    ///, at the cursor's current position. Callers position
    /// the cursor first — `newline(margin)` for every clause after the
    /// first, nothing for a statement's opening clause (top-level
    /// statements call `newline` once up front; a subquery's opening
    /// clause starts right after its `(`, already at `margin`).
    pub(crate) fn clause(&mut self, river: usize, keyword: &str) {
        let pad = river.saturating_sub(keyword.chars().count());
        self.buf.push_str(&" ".repeat(pad));
        self.buf.push_str(keyword);
    }

    /// Column continuation lines (comma-first lists) indent one column
    /// past the river.
    pub(crate) fn continuation_col(&self, river: usize) -> usize {
        self.margin() + river + 1
    }

    pub(crate) fn enter_depth(&mut self) -> Result<(), FormatterError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            self.depth -= 1;
            return Err(FormatterError::new(self.max_depth));
        }
        Ok(())
    }

    pub(crate) fn exit_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub(crate) fn finish(self) -> String {
        self.buf
    }
}
