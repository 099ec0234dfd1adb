//! The tokenizer: turns source text into a flat stream of [`Token`]s
//!.
//!
//! Implemented as a single forward-only cursor over the source bytes
//! (never backtracking over already-committed tokens) with a handful of
//! lookahead helpers for the places the grammar is genuinely ambiguous
//! without them (dollar-quote tags, Oracle `q'...'` delimiters, the
//! standalone-`/`-as-terminator heuristic).

use smol_str::SmolStr;
use sqlfmt_core::{Dialect, Token, TokenKind, TokenizeError};

use crate::options::TokenizeOptions;

const MAX_IDENTIFIER_LENGTH: usize = 10_000;

/// Longest-match operator lexemes, longest first so a 3-char operator is
/// never mistaken for a 2-char prefix of itself.
const OPERATORS_3: &[&str] = &["!~*", "->>", "#>>"];
const OPERATORS_2: &[&str] = &[
    "!~", "!=", "<@", "<>", "<<", "<=", ">=", ">>", "->", "#>", "@>", "@?", "@@", "?|", "?&", "~*",
    "&&", "||", "::", ":=", "+=", "-=", "*=", "/=", "%=", "&=", "^=", "|=",
];
const OPERATORS_1: &[char] = &[
    '=', '+', '-', '*', '/', '%', '^', '&', '|', '~', '?', '!', '@', '#', '<', '>', '$', '\\',
];
const PUNCTUATION: &[char] = &['(', ')', ',', ';', '.', '[', ']', ':', '{', '}'];

pub fn tokenize(text: &str, options: &TokenizeOptions) -> Result<Vec<Token>, TokenizeError> {
    Tokenizer::new(text, options).run()
}

struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
    column: u32,
    at_line_start: bool,
    dialect: &'a Dialect,
    max_token_count: usize,
    allow_meta_commands: bool,
    tokens: Vec<Token>,
    /// Uppercased text of the last non-trivia token, used for contextual
    /// disambiguation (`#temp` identifiers, `COPY ... FROM STDIN`).
    prev_significant: Option<SmolStr>,
    copy_seen_copy: bool,
    copy_seen_from: bool,
    copy_stdin_pending: bool,
    copy_stdin_mode: bool,
}

impl<'a> Tokenizer<'a> {
    fn new(src: &'a str, options: &'a TokenizeOptions) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            at_line_start: true,
            dialect: &options.dialect,
            max_token_count: options.max_token_count,
            allow_meta_commands: options.allow_meta_commands,
            tokens: Vec::new(),
            prev_significant: None,
            copy_seen_copy: false,
            copy_seen_from: false,
            copy_stdin_pending: false,
            copy_stdin_mode: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_char_at(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    /// Advance past one char, updating line/column (UTF-16 code units).
    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
            self.at_line_start = true;
        } else {
            self.column += c.len_utf16() as u32;
            if !c.is_whitespace() {
                self.at_line_start = false;
            }
        }
        Some(c)
    }

    fn mark(&self) -> (usize, u32, u32) {
        (self.pos, self.line, self.column)
    }

    fn make_token(&self, kind: TokenKind, start: (usize, u32, u32)) -> Token {
        let text = &self.src[start.0..self.pos];
        Token::new(kind, text, start.0, start.1, start.2)
    }

    fn push(&mut self, token: Token) -> Result<(), TokenizeError> {
        if !token.is_trivia() {
            self.prev_significant = Some(token.upper.clone());
            self.track_copy_stdin(&token);
        }
        self.tokens.push(token);
        if self.tokens.len() > self.max_token_count {
            let (p, l, c) = self.mark();
            return Err(TokenizeError::new(
                format!(
                    "token count exceeds the configured maximum of {}",
                    self.max_token_count
                ),
                p,
                l,
                c,
            ));
        }
        Ok(())
    }

    fn track_copy_stdin(&mut self, token: &Token) {
        if token.kind == TokenKind::Keyword {
            match token.upper.as_str() {
                "COPY" => {
                    self.copy_seen_copy = true;
                    self.copy_seen_from = false;
                }
                "FROM" if self.copy_seen_copy => self.copy_seen_from = true,
                "STDIN" if self.copy_seen_from => self.copy_stdin_pending = true,
                _ => {}
            }
        } else if token.is_punct(";") && self.copy_stdin_pending {
            self.copy_stdin_mode = true;
            self.copy_seen_copy = false;
            self.copy_seen_from = false;
            self.copy_stdin_pending = false;
        }
    }

    fn run(mut self) -> Result<Vec<Token>, TokenizeError> {
        loop {
            if self.pos >= self.src.len() {
                break;
            }
            if self.copy_stdin_mode {
                self.lex_copy_data_line()?;
                continue;
            }
            let token = self.next_token()?;
            self.push(token)?;
        }
        let (p, l, c) = self.mark();
        self.push(Token::new(TokenKind::Eof, "", p, l, c))?;
        Ok(self.tokens)
    }

    fn next_token(&mut self) -> Result<Token, TokenizeError> {
        let c = self.peek_char().expect("checked by caller");

        if c.is_whitespace() {
            return Ok(self.lex_whitespace());
        }
        if let Some(tok) = self.try_line_start_rem()? {
            return Ok(tok);
        }
        if self.starts_with("--") {
            return Ok(self.lex_line_comment(2));
        }
        if self.starts_with("/*") {
            return self.lex_block_comment();
        }
        if c == '#' {
            if let Some(tok) = self.try_hash()? {
                return Ok(tok);
            }
        }
        if self.allow_meta_commands && c == '\\' && self.at_line_start {
            return Ok(self.lex_line_comment(1));
        }
        if (c == '#' || c == '$') && self.allows_hash_dollar_identifier() {
            return self.lex_identifier_or_prefixed_literal();
        }
        if is_ident_start(c) || c == '_' {
            return self.lex_identifier_or_prefixed_literal();
        }
        if c.is_ascii_digit() || (c == '.' && matches!(self.peek_char_at(1), Some(d) if d.is_ascii_digit()))
        {
            return Ok(self.lex_number());
        }
        if c == '\'' || is_smart_quote(c) {
            return self.lex_quoted_string(c);
        }
        if c == '"' {
            return self.lex_quoted_identifier('"', '"');
        }
        if c == '`' {
            return self.lex_quoted_identifier('`', '`');
        }
        if c == '[' {
            return self.lex_bracket();
        }
        if c == '$' {
            return self.lex_dollar();
        }
        if c == '{' {
            if self.starts_with("{{") {
                return self.lex_template_parameter();
            }
        }
        if c == '/' {
            if let Some(tok) = self.try_slash_terminator() {
                return Ok(tok);
            }
        }
        if matches!(c, ':' | '?' | '&' | '@') {
            let param = match c {
                ':' => self.try_colon_parameter(),
                '?' => self.try_question_parameter(),
                '&' => self.try_amp_parameter(),
                '@' => self.try_at_parameter(),
                _ => unreachable!(),
            };
            if let Some(tok) = param {
                return Ok(tok);
            }
        }
        self.lex_symbol()
    }

    // -----------------------------------------------------------------
    // Whitespace & comments
    // -----------------------------------------------------------------

    fn lex_whitespace(&mut self) -> Token {
        let start = self.mark();
        while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
        self.make_token(TokenKind::Whitespace, start)
    }

    /// `REM` at the start of a line (Oracle SQL*Plus) is a line comment.
    fn try_line_start_rem(&mut self) -> Result<Option<Token>, TokenizeError> {
        if !self.at_line_start {
            return Ok(None);
        }
        if !self.rest().to_ascii_uppercase().starts_with("REM") {
            return Ok(None);
        }
        let after = self.peek_char_at(3);
        if !matches!(after, None | Some(' ') | Some('\t') | Some('\n') | Some('\r')) {
            return Ok(None);
        }
        Ok(Some(self.lex_line_comment(3)))
    }

    /// Consume a line comment whose marker is `marker_len` bytes long
    /// (`--` is 2, psql's `\` is 1, MySQL's `#` is 1, Oracle's `REM` is 3),
    /// trimming trailing ASCII whitespace — the trimmed
    /// whitespace is left for the following whitespace token to absorb so
    /// token-completeness still holds.
    fn lex_line_comment(&mut self, marker_len: usize) -> Token {
        let start = self.mark();
        for _ in 0..marker_len {
            self.bump();
        }
        let body_start = self.pos;
        while !matches!(self.peek_char(), None | Some('\n')) {
            self.bump();
        }
        let body_end_untrimmed = self.pos;
        let trimmed_len = self.src[body_start..body_end_untrimmed]
            .trim_end_matches([' ', '\t'])
            .len();
        let keep_end = body_start + trimmed_len;
        // Rewind the cursor to the trimmed boundary; re-derive line/column
        // by walking back only over the trailing run we just trimmed
        // (always plain spaces/tabs, so no line/UTF-16 bookkeeping needed).
        let trimmed_chars = body_end_untrimmed - keep_end;
        self.pos = keep_end;
        self.column -= trimmed_chars as u32;
        Token::new(TokenKind::LineComment, &self.src[start.0..self.pos], start.0, start.1, start.2)
    }

    fn lex_block_comment(&mut self) -> Result<Token, TokenizeError> {
        let start = self.mark();
        self.bump();
        self.bump();
        loop {
            if self.starts_with("*/") {
                self.bump();
                self.bump();
                return Ok(self.make_token(TokenKind::BlockComment, start));
            }
            if self.bump().is_none() {
                let (p, l, c) = self.mark();
                return Err(TokenizeError::new("unterminated block comment", p, l, c));
            }
        }
    }

    /// `#` is MySQL's line-comment marker at the start of a line, unless
    /// it's the first half of the `#>`/`#>>` JSON operators or it starts a
    /// disambiguated `#temp`-style identifier.
    fn try_hash(&mut self) -> Result<Option<Token>, TokenizeError> {
        if matches!(self.peek_char_at(1), Some('>')) {
            return Ok(None);
        }
        if self.allows_hash_dollar_identifier() {
            return Ok(None);
        }
        if self.at_line_start {
            return Ok(Some(self.lex_line_comment(1)));
        }
        Ok(None)
    }

    /// `#temp`/`$var`-style identifiers are only admitted right after
    /// `FROM`, `JOIN`, `INTO`, `TABLE`, `REFERENCES` or a `.`.
    fn allows_hash_dollar_identifier(&self) -> bool {
        let next = self.peek_char_at(1);
        if !matches!(next, Some(c) if is_ident_start(c)) {
            return false;
        }
        match self.prev_significant.as_deref() {
            Some("FROM") | Some("JOIN") | Some("INTO") | Some("TABLE") | Some("REFERENCES") => {
                true
            }
            Some(".") => true,
            _ => false,
        }
    }

    // -----------------------------------------------------------------
    // Identifiers, keywords, prefixed string literals
    // -----------------------------------------------------------------

    fn lex_identifier_or_prefixed_literal(&mut self) -> Result<Token, TokenizeError> {
        let start = self.mark();
        let disambiguated_hash_or_dollar = matches!(self.peek_char(), Some('#') | Some('$'));
        if disambiguated_hash_or_dollar {
            self.bump();
        }
        while matches!(self.peek_char(), Some(c) if is_ident_continue(c)) {
            self.bump();
        }
        let word = &self.src[start.0..self.pos];
        if word.len() > MAX_IDENTIFIER_LENGTH {
            return Err(TokenizeError::new(
                format!("identifier exceeds maximum length of {MAX_IDENTIFIER_LENGTH}"),
                start.0,
                start.1,
                start.2,
            ));
        }
        let upper = word.to_ascii_uppercase();

        if let Some(tok) = self.try_prefixed_string(&upper, start)? {
            return Ok(tok);
        }
        if upper == "Q" {
            if let Some(tok) = self.try_oracle_quote(start)? {
                return Ok(tok);
            }
        }

        let kind = if !disambiguated_hash_or_dollar && self.dialect.is_keyword(&upper) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Ok(self.make_token(kind, start))
    }

    /// `E'...'`, `N'...'`, `B'...'`, `X'...'`, `U&'...'` — a case-insensitive
    /// prefix immediately (no gap) followed by a quote.
    fn try_prefixed_string(
        &mut self,
        upper: &str,
        start: (usize, u32, u32),
    ) -> Result<Option<Token>, TokenizeError> {
        let is_prefix = matches!(upper, "E" | "N" | "B" | "X");
        if is_prefix && matches!(self.peek_char(), Some('\'')) {
            let quote = self.peek_char().unwrap();
            self.lex_quoted_string_body(quote)?;
            return Ok(Some(self.make_token(TokenKind::String, start)));
        }
        if upper == "U" && self.starts_with("&'") {
            self.bump(); // '&'
            self.lex_quoted_string_body('\'')?;
            return Ok(Some(self.make_token(TokenKind::String, start)));
        }
        Ok(None)
    }

    /// Oracle alternative quoting: `q'[...]'`, `q'{...}'`, `q'(...)'`,
    /// `q'<...>'`, `q'!...!'`.
    fn try_oracle_quote(&mut self, start: (usize, u32, u32)) -> Result<Option<Token>, TokenizeError> {
        if !self.starts_with("'") {
            return Ok(None);
        }
        let Some(delim) = self.peek_char_at(1) else {
            return Ok(None);
        };
        let closer = match delim {
            '[' => ']',
            '{' => '}',
            '(' => ')',
            '<' => '>',
            other => other,
        };
        self.bump(); // opening quote
        self.bump(); // delimiter
        let needle = format!("{closer}'");
        match self.rest().find(&needle) {
            Some(offset) => {
                for _ in 0..self.rest()[..offset].chars().count() {
                    self.bump();
                }
                self.bump(); // closer
                self.bump(); // closing quote
                Ok(Some(self.make_token(TokenKind::String, start)))
            }
            None => Err(TokenizeError::new(
                "unterminated Oracle-quoted string",
                start.0,
                start.1,
                start.2,
            )),
        }
    }

    // -----------------------------------------------------------------
    // Numbers
    // -----------------------------------------------------------------

    fn lex_number(&mut self) -> Token {
        let start = self.mark();
        if self.peek_char() == Some('0') && matches!(self.peek_char_at(1), Some('x') | Some('X')) {
            self.bump();
            self.bump();
            while matches!(self.peek_char(), Some(c) if c.is_ascii_hexdigit() || c == '_') {
                self.bump();
            }
            return self.make_token(TokenKind::Number, start);
        }

        if self.peek_char() == Some('.') {
            // leading-dot form: `.5`
            self.bump();
            self.consume_digit_run();
        } else {
            // integer part, optionally followed by a fractional part
            // (`5.` with an empty fraction is valid).
            self.consume_digit_run();
            if self.peek_char() == Some('.') {
                self.bump();
                self.consume_digit_run();
            }
        }

        // exponent: digit+ ('e'|'E') ('+'|'-')? digit+ — backtrack if the
        // char(s) after e/E aren't digits, so `1e` lexes as `1` then `e`.
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            let mut lookahead = 1;
            if matches!(self.peek_char_at(1), Some('+') | Some('-')) {
                lookahead += 1;
            }
            if matches!(self.peek_char_at(lookahead), Some(d) if d.is_ascii_digit()) {
                self.bump(); // e/E
                if matches!(self.peek_char(), Some('+') | Some('-')) {
                    self.bump();
                }
                self.consume_digit_run();
            }
        }

        // Compact duration literal (KWDB): a number glued to a unit with
        // no gap, e.g. `10y`, `1000ms`. Excluded when the next char is
        // `e`/`E`, since that always means a failed-exponent backtrack:
        // `1e` tokenizes as number `1` then identifier `e`.
        if matches!(self.peek_char(), Some(c) if c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E'))
        {
            while matches!(self.peek_char(), Some(c) if c.is_ascii_alphabetic()) {
                self.bump();
            }
        }

        self.make_token(TokenKind::Number, start)
    }

    fn consume_digit_run(&mut self) {
        while matches!(self.peek_char(), Some(c) if c.is_ascii_digit() || c == '_') {
            self.bump();
        }
    }

    // -----------------------------------------------------------------
    // Quoted strings / identifiers
    // -----------------------------------------------------------------

    fn lex_quoted_string(&mut self, quote: char) -> Result<Token, TokenizeError> {
        let start = self.mark();
        self.lex_quoted_string_body(quote)?;
        Ok(self.make_token(TokenKind::String, start))
    }

    /// Consumes `'...'` (or a smart-quote equivalent), handling `''` as an
    /// escaped quote and, for `E'...'` strings, `\`-escapes.
    fn lex_quoted_string_body(&mut self, quote: char) -> Result<(), TokenizeError> {
        let closing = if is_smart_quote(quote) { smart_quote_close(quote) } else { quote };
        self.bump();
        loop {
            match self.peek_char() {
                None => {
                    let (p, l, c) = self.mark();
                    return Err(TokenizeError::new("unterminated string literal", p, l, c));
                }
                Some(c) if c == closing => {
                    self.bump();
                    if self.peek_char() == Some(closing) {
                        self.bump();
                        continue;
                    }
                    return Ok(());
                }
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn lex_quoted_identifier(&mut self, open: char, close: char) -> Result<Token, TokenizeError> {
        let start = self.mark();
        self.bump();
        loop {
            match self.peek_char() {
                None => {
                    let (p, l, c) = self.mark();
                    return Err(TokenizeError::new("unterminated quoted identifier", p, l, c));
                }
                Some(c) if c == close => {
                    self.bump();
                    if open == close && self.peek_char() == Some(close) {
                        self.bump();
                        continue;
                    }
                    break;
                }
                _ => {
                    self.bump();
                }
            }
        }
        Ok(self.make_token(TokenKind::Identifier, start))
    }

    /// `[id]` quoted identifier, `[[...]]` Lua/Exasol long string, or a
    /// plain `[` subscript-access punctuation token. Disambiguated by
    /// whether the previous significant token looks like something you
    /// can subscript (an identifier, `)`, or `]`).
    fn lex_bracket(&mut self) -> Result<Token, TokenizeError> {
        let start = self.mark();
        if self.starts_with("[[") {
            self.bump();
            self.bump();
            return match self.rest().find("]]") {
                Some(offset) => {
                    for _ in 0..self.rest()[..offset].chars().count() {
                        self.bump();
                    }
                    self.bump();
                    self.bump();
                    Ok(self.make_token(TokenKind::String, start))
                }
                None => Err(TokenizeError::new(
                    "unterminated bracket string",
                    start.0,
                    start.1,
                    start.2,
                )),
            };
        }
        if self.looks_like_subscript() {
            self.bump();
            return Ok(self.make_token(TokenKind::Punctuation, start));
        }
        self.bump();
        loop {
            match self.peek_char() {
                None => {
                    let (p, l, c) = self.mark();
                    return Err(TokenizeError::new("unterminated quoted identifier", p, l, c));
                }
                Some(']') => {
                    self.bump();
                    break;
                }
                _ => {
                    self.bump();
                }
            }
        }
        Ok(self.make_token(TokenKind::Identifier, start))
    }

    fn looks_like_subscript(&self) -> bool {
        match self.tokens.iter().rev().find(|t| !t.is_trivia()) {
            Some(t) => {
                t.kind == TokenKind::Identifier
                    || t.is_punct(")")
                    || t.is_punct("]")
                    || t.kind == TokenKind::String
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------
    // Dollar quoting / parameters
    // -----------------------------------------------------------------

    /// `$1` positional parameter, `$$...$$`/`$tag$...$tag$` dollar quoting,
    /// or a bare `$` operator when nothing else matches (never an error,
    /// even for an unterminated dollar-quote).
    fn lex_dollar(&mut self) -> Result<Token, TokenizeError> {
        let start = self.mark();
        if matches!(self.peek_char_at(1), Some(c) if c.is_ascii_digit()) {
            self.bump();
            while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
            return Ok(self.make_token(TokenKind::Parameter, start));
        }

        if let Some(tok) = self.try_dollar_quote(start) {
            return Ok(tok);
        }

        self.bump();
        Ok(self.make_token(TokenKind::Operator, start))
    }

    fn try_dollar_quote(&mut self, start: (usize, u32, u32)) -> Option<Token> {
        let after_dollar = &self.rest()[1..];
        let tag_len = after_dollar
            .char_indices()
            .take_while(|(_, c)| c.is_alphanumeric() || *c == '_')
            .map(|(i, c)| i + c.len_utf8())
            .last()
            .unwrap_or(0);
        if !after_dollar[tag_len..].starts_with('$') {
            return None;
        }
        let delimiter = &self.rest()[..1 + tag_len + 1];
        let search_from = delimiter.len();
        let body_and_rest = &self.rest()[search_from..];
        let close_offset = body_and_rest.find(delimiter)?;

        let total_chars = self.rest()[..search_from + close_offset + delimiter.len()]
            .chars()
            .count();
        for _ in 0..total_chars {
            self.bump();
        }
        Some(self.make_token(TokenKind::String, start))
    }

    /// `:name`/`:1` named/positional parameters, disambiguated from the
    /// `::` cast operator and the `:=` assignment operator (neither of
    /// which is a parameter).
    fn try_colon_parameter(&mut self) -> Option<Token> {
        let next = self.peek_char_at(1)?;
        if next == ':' || next == '=' {
            return None;
        }
        if !(next.is_ascii_digit() || is_ident_start(next)) {
            return None;
        }
        let start = self.mark();
        self.bump();
        Some(self.lex_parameter_tail(start))
    }

    /// `?1` positional and bare `?` parameters, disambiguated from the
    /// jsonb `?|`/`?&` operators.
    fn try_question_parameter(&mut self) -> Option<Token> {
        if self.starts_with("?|") || self.starts_with("?&") {
            return None;
        }
        let start = self.mark();
        self.bump();
        Some(self.lex_parameter_tail(start))
    }

    /// psql `&var`/`&&var` parameters, disambiguated from the `&&` array-
    /// overlap operator (which is only an operator when nothing glues
    /// directly onto it).
    fn try_amp_parameter(&mut self) -> Option<Token> {
        let sigil_len = if self.starts_with("&&") { 2 } else { 1 };
        let next = self.peek_char_at(sigil_len)?;
        if !(next.is_ascii_digit() || is_ident_start(next)) {
            return None;
        }
        let start = self.mark();
        for _ in 0..sigil_len {
            self.bump();
        }
        Some(self.lex_parameter_tail(start))
    }

    /// `@var`/`@@global` parameters, disambiguated from the jsonb `@>`/
    /// `@?` operators and the full-text-search `@@` operator.
    fn try_at_parameter(&mut self) -> Option<Token> {
        if self.starts_with("@>") || self.starts_with("@?") {
            return None;
        }
        let sigil_len = if self.starts_with("@@") { 2 } else { 1 };
        let next = self.peek_char_at(sigil_len)?;
        if !(next.is_ascii_digit() || is_ident_start(next)) {
            return None;
        }
        let start = self.mark();
        for _ in 0..sigil_len {
            self.bump();
        }
        Some(self.lex_parameter_tail(start))
    }

    /// Consumes the name/number glued onto an already-consumed parameter
    /// sigil: all-digit for a positional form (`1`, stopping before any
    /// trailing letters, same as `$1`), identifier characters otherwise.
    fn lex_parameter_tail(&mut self, start: (usize, u32, u32)) -> Token {
        if matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
            while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
        } else {
            while matches!(self.peek_char(), Some(c) if is_ident_continue(c)) {
                self.bump();
            }
        }
        self.make_token(TokenKind::Parameter, start)
    }

    fn lex_template_parameter(&mut self) -> Result<Token, TokenizeError> {
        let start = self.mark();
        self.bump();
        self.bump();
        match self.rest().find("}}") {
            Some(offset) => {
                for _ in 0..self.rest()[..offset].chars().count() {
                    self.bump();
                }
                self.bump();
                self.bump();
                Ok(self.make_token(TokenKind::Parameter, start))
            }
            None => Err(TokenizeError::new(
                "unterminated template parameter",
                start.0,
                start.1,
                start.2,
            )),
        }
    }

    // -----------------------------------------------------------------
    // `/` as SQL*Plus terminator vs division: kept as a best-effort
    // decision table, not a fully principled rule.
    // -----------------------------------------------------------------

    fn try_slash_terminator(&mut self) -> Option<Token> {
        if !self.standalone_on_line() {
            return None;
        }
        let prior_suggests_division = matches!(
            self.tokens.iter().rev().find(|t| !t.is_trivia()),
            Some(t) if t.is_punct(",") || t.is_punct("(") || t.is_punct(";")
        );
        if prior_suggests_division {
            return None;
        }
        let start = self.mark();
        self.bump();
        Some(Token::new(TokenKind::Punctuation, ";", start.0, start.1, start.2))
    }

    /// True if `/` is the only non-whitespace content on its source line.
    fn standalone_on_line(&self) -> bool {
        let before_on_line = &self.src[..self.pos];
        let line_start = before_on_line.rfind('\n').map(|i| i + 1).unwrap_or(0);
        if self.src[line_start..self.pos].chars().any(|c| !c.is_whitespace()) {
            return false;
        }
        let after = &self.src[self.pos + 1..];
        let line_end = after.find('\n').unwrap_or(after.len());
        after[..line_end].chars().all(|c| c.is_whitespace())
    }

    // -----------------------------------------------------------------
    // COPY ... FROM STDIN data lines
    // -----------------------------------------------------------------

    fn lex_copy_data_line(&mut self) -> Result<(), TokenizeError> {
        let start = self.mark();
        let rest = self.rest();
        let line_len = rest.find('\n').unwrap_or(rest.len());
        let line = &rest[..line_len];
        if line.trim_end_matches(['\r']) == "\\." {
            self.copy_stdin_mode = false;
            return Ok(());
        }
        for _ in 0..line.chars().count() {
            self.bump();
        }
        let token = self.make_token(TokenKind::LineComment, start);
        self.push(token)
    }

    // -----------------------------------------------------------------
    // Catch-all operator/punctuation lexer
    // -----------------------------------------------------------------

    fn lex_symbol(&mut self) -> Result<Token, TokenizeError> {
        let start = self.mark();
        for op in OPERATORS_3 {
            if self.starts_with(op) {
                for _ in 0..op.chars().count() {
                    self.bump();
                }
                return Ok(self.make_token(TokenKind::Operator, start));
            }
        }
        for op in OPERATORS_2 {
            if self.starts_with(op) {
                for _ in 0..op.chars().count() {
                    self.bump();
                }
                return Ok(self.make_token(TokenKind::Operator, start));
            }
        }
        let c = self.peek_char().unwrap();
        if PUNCTUATION.contains(&c) {
            self.bump();
            return Ok(self.make_token(TokenKind::Punctuation, start));
        }
        if OPERATORS_1.contains(&c) {
            self.bump();
            return Ok(self.make_token(TokenKind::Operator, start));
        }
        if c.is_control() {
            return Err(TokenizeError::new(
                format!("unexpected control character U+{:04X}", c as u32),
                start.0,
                start.1,
                start.2,
            ));
        }
        // Anything else (stray punctuation from a dialect we don't model
        // explicitly, e.g. a lone `\u{2026}`) still needs to make progress:
        // emit it as a one-character operator rather than failing the
        // whole tokenize call.
        self.bump();
        Ok(self.make_token(TokenKind::Operator, start))
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn is_smart_quote(c: char) -> bool {
    c == '\u{2018}' || c == '\u{2019}'
}

fn smart_quote_close(c: char) -> char {
    match c {
        '\u{2018}' => '\u{2019}',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::TokenizeOptions;

    fn toks(src: &str) -> Vec<Token> {
        tokenize(src, &TokenizeOptions::default()).expect("tokenize should succeed")
    }

    fn kinds(src: &str) -> Vec<TokenKind> {
        toks(src)
            .into_iter()
            .filter(|t| !t.is_trivia())
            .map(|t| t.kind)
            .collect()
    }

    /// For all tokenizable inputs, concatenating `text` of all tokens
    /// (excluding `eof`) equals the input.
    fn assert_token_completeness(src: &str) {
        let tokens = toks(src);
        let joined: String = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(joined, src, "token completeness failed for {src:?}");
    }

    /// For all `i`, `tokens[i+1].position = tokens[i].position +
    /// tokens[i].text.length`.
    fn assert_token_positions(src: &str) {
        let tokens = toks(src);
        for w in tokens.windows(2) {
            assert_eq!(
                w[0].position + w[0].text.len(),
                w[1].position,
                "position gap/overlap in {src:?} between {:?} and {:?}",
                w[0],
                w[1]
            );
        }
        let last = tokens.last().unwrap();
        assert!(last.is_eof());
        assert_eq!(last.position, src.len());
    }

    #[test]
    fn token_completeness_across_a_batch_of_inputs() {
        let cases = [
            "SELECT 1;",
            "select a,b from t where x=1;",
            "SELECT * FROM a JOIN b ON a.id=b.id;",
            "SELECT E'\\n', $$body$$, 1_000, 0xFF;",
            "-- comment\nSELECT 1; /* block */\n",
            "SELECT \"quoted id\", `backtick`, [bracket];",
            "SELECT q'[hi]', q'{there}';",
            "SELECT 1e5, 1.2E-4, .5, 5.;",
            "SELECT $1, :name, ?1, ?, &var, &&var, {{tmpl}}, @var, @@global;",
            "SELECT a::int, a ->> 'k', a #>> '{x}', a @> b;",
        ];
        for src in cases {
            assert_token_completeness(src);
            assert_token_positions(src);
        }
    }

    #[test]
    fn eof_token_position_equals_input_length() {
        let tokens = toks("SELECT 1;");
        assert_eq!(tokens.last().unwrap().position, "SELECT 1;".len());
    }

    #[test]
    fn upper_is_set_only_for_keyword_and_identifier() {
        for t in toks("SELECT foo, 1, 'str', ; ") {
            match t.kind {
                TokenKind::Keyword | TokenKind::Identifier => {
                    assert_eq!(t.upper, t.text.to_uppercase().as_str());
                }
                _ => assert!(t.upper.is_empty(), "{t:?} should have empty upper"),
            }
        }
    }

    #[test]
    fn single_quoted_string_with_escape() {
        let ts = toks("SELECT 'can''t';");
        let s = ts.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(s.text, "'can''t'");
    }

    #[test]
    fn prefixed_strings() {
        for (src, expected) in [
            ("E'\\n'", "E'\\n'"),
            ("N'x'", "N'x'"),
            ("B'01'", "B'01'"),
            ("X'ff'", "X'ff'"),
            ("U&'\\0041'", "U&'\\0041'"),
        ] {
            let ts = toks(src);
            let s = ts.iter().find(|t| t.kind == TokenKind::String).unwrap();
            assert_eq!(s.text, expected, "for {src:?}");
        }
    }

    #[test]
    fn dollar_quoted_strings() {
        let ts = toks("SELECT $$body$$;");
        let s = ts.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(s.text, "$$body$$");

        let ts = toks("SELECT $tag$a $$ b$tag$;");
        let s = ts.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(s.text, "$tag$a $$ b$tag$");
    }

    #[test]
    fn unterminated_dollar_quote_emits_bare_dollar_operator() {
        // An unterminated `$$` emits bare `$` operators; the tokenizer
        // never throws.
        let ts = toks("SELECT $$unterminated");
        assert!(ts.iter().any(|t| t.kind == TokenKind::Operator && t.text == "$"));
    }

    #[test]
    fn oracle_alternative_quoting() {
        for (src, body) in [
            ("q'[hi]'", "q'[hi]'"),
            ("q'{there}'", "q'{there}'"),
            ("q'(paren)'", "q'(paren)'"),
            ("q'<angle>'", "q'<angle>'"),
            ("q'!bang!'", "q'!bang!'"),
        ] {
            let full = format!("SELECT {src};");
            let ts = toks(&full);
            let s = ts.iter().find(|t| t.kind == TokenKind::String).unwrap();
            assert_eq!(s.text, body, "for {src:?}");
        }
    }

    #[test]
    fn smart_quotes_are_recognized_as_strings() {
        let ts = toks("SELECT \u{2018}x\u{2019};");
        assert!(ts.iter().any(|t| t.kind == TokenKind::String));
    }

    #[test]
    fn quoted_identifiers() {
        let ts = toks(r#"SELECT "a""b", `c`, [d];"#);
        let idents: Vec<&str> = ts
            .iter()
            .filter(|t| t.kind == TokenKind::Identifier)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(idents, vec![r#""a""b""#, "`c`", "[d]"]);
    }

    #[test]
    fn bracket_subscript_is_punctuation_not_identifier() {
        let ts = toks("SELECT a[1];");
        let sig: Vec<_> = ts.iter().filter(|t| !t.is_trivia()).collect();
        // SELECT a [ 1 ] ; eof
        assert!(sig.iter().any(|t| t.kind == TokenKind::Punctuation && t.text == "["));
    }

    #[test]
    fn lua_style_long_bracket_string() {
        let ts = toks("SELECT [[hello world]];");
        let s = ts.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(s.text, "[[hello world]]");
    }

    #[test]
    fn numbers() {
        for (src, expected_first_number) in [
            ("123", "123"),
            ("12.34", "12.34"),
            (".5", ".5"),
            ("5.", "5."),
            ("1e5", "1e5"),
            ("1.2E-4", "1.2E-4"),
            ("0xFF", "0xFF"),
            ("0XFF", "0XFF"),
            ("1_000_000", "1_000_000"),
        ] {
            let ts = toks(src);
            let n = ts.iter().find(|t| t.kind == TokenKind::Number).unwrap();
            assert_eq!(n.text, expected_first_number, "for {src:?}");
        }
    }

    #[test]
    fn failed_exponent_backtracks_to_number_then_identifier() {
        // `1e` (no exponent digits) tokenizes as number `1` then
        // identifier `e`.
        let ts = toks("1e");
        let sig: Vec<_> = ts.iter().filter(|t| !t.is_trivia() && !t.is_eof()).collect();
        assert_eq!(sig.len(), 2);
        assert_eq!(sig[0].kind, TokenKind::Number);
        assert_eq!(sig[0].text, "1");
        assert_eq!(sig[1].kind, TokenKind::Identifier);
        assert_eq!(sig[1].text, "e");
    }

    #[test]
    fn compact_duration_literal() {
        for src in ["10y", "1000ms"] {
            let ts = toks(src);
            let n = ts.iter().find(|t| t.kind == TokenKind::Number).unwrap();
            assert_eq!(n.text, src);
        }
    }

    #[test]
    fn positional_and_named_parameters() {
        let ts = toks("SELECT $1, :name, :1, ?1, ?, &var, &&var, {{tmpl}}, @var, @@global;");
        let params: Vec<&str> = ts
            .iter()
            .filter(|t| t.kind == TokenKind::Parameter)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(
            params,
            vec!["$1", ":name", ":1", "?1", "?", "&var", "&&var", "{{tmpl}}", "@var", "@@global"]
        );
    }

    #[test]
    fn line_comment_to_eol() {
        let ts = toks("SELECT 1; -- trailing comment\nSELECT 2;");
        let c = ts.iter().find(|t| t.kind == TokenKind::LineComment).unwrap();
        assert_eq!(c.text, "-- trailing comment");
    }

    #[test]
    fn line_comment_trims_trailing_whitespace() {
        let ts = toks("-- comment with trailing spaces   \nSELECT 1;");
        let c = ts.iter().find(|t| t.kind == TokenKind::LineComment).unwrap();
        assert_eq!(c.text, "-- comment with trailing spaces");
    }

    #[test]
    fn block_comment_non_nesting() {
        let ts = toks("/* outer /* inner */ still here */");
        let c = ts.iter().find(|t| t.kind == TokenKind::BlockComment).unwrap();
        assert_eq!(c.text, "/* outer /* inner */");
    }

    #[test]
    fn rem_at_line_start_is_a_comment() {
        let ts = toks("REM this is a sqlplus comment\nSELECT 1;");
        assert_eq!(ts[0].kind, TokenKind::LineComment);
    }

    #[test]
    fn hash_line_comment_mysql_style() {
        let ts = toks("# mysql comment\nSELECT 1;");
        assert_eq!(ts[0].kind, TokenKind::LineComment);
    }

    #[test]
    fn hash_temp_identifier_after_from() {
        let ts = toks("SELECT * FROM #temp;");
        let ident = ts.iter().find(|t| t.kind == TokenKind::Identifier && t.text == "#temp");
        assert!(ident.is_some(), "expected #temp identifier, got {ts:?}");
    }

    #[test]
    fn meta_commands_recognized_when_enabled() {
        let opts = TokenizeOptions {
            allow_meta_commands: true,
            ..TokenizeOptions::default()
        };
        let tokens = tokenize("\\d foo\nSELECT 1;", &opts).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::LineComment);
    }

    #[test]
    fn operator_longest_match() {
        let cases = [
            ("!~*", "!~*"),
            ("!~", "!~"),
            ("!=", "!="),
            ("<@", "<@"),
            ("<>", "<>"),
            ("<<", "<<"),
            ("<=", "<="),
            (">=", ">="),
            (">>", ">>"),
            ("->>", "->>"),
            ("->", "->"),
            ("#>>", "#>>"),
            ("#>", "#>"),
            ("@>", "@>"),
            ("@?", "@?"),
            ("@@", "@@"),
            ("?|", "?|"),
            ("?&", "?&"),
            ("~*", "~*"),
            ("&&", "&&"),
            ("||", "||"),
            ("::", "::"),
            (":=", ":="),
        ];
        for (src, expected) in cases {
            let ts = toks(&format!("a {src} b"));
            let op = ts.iter().find(|t| t.kind == TokenKind::Operator).unwrap();
            assert_eq!(op.text, expected, "for {src:?}");
        }
    }

    #[test]
    fn slash_as_sqlplus_terminator() {
        let ts = toks("SELECT 1\n/\n");
        let sig: Vec<_> = ts.iter().filter(|t| !t.is_trivia() && !t.is_eof()).collect();
        assert!(sig.iter().any(|t| t.is_punct(";")));
    }

    #[test]
    fn slash_after_comma_is_division_not_terminator() {
        let ts = toks("SELECT a, b / c;");
        assert!(ts.iter().any(|t| t.kind == TokenKind::Operator && t.text == "/"));
    }

    #[test]
    fn copy_from_stdin_data_lines() {
        let ts = toks("COPY t FROM STDIN;\n1\tfoo\n2\tbar\n\\.\nSELECT 1;");
        let data_lines: Vec<&str> = ts
            .iter()
            .filter(|t| t.kind == TokenKind::LineComment)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(data_lines, vec!["1\tfoo", "2\tbar"]);
        // parsing resumes normally afterwards
        assert!(ts.iter().any(|t| t.is_keyword("SELECT") && t.position > 0));
    }

    #[test]
    fn angle_bracket_template_identifier_after_ddl_context() {
        let kinds = kinds("CREATE TABLE <Foo, Bar> (x int);");
        assert!(kinds.contains(&TokenKind::Keyword));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = tokenize("SELECT 'broken", &TokenizeOptions::default()).unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 15);
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        let err = tokenize("/* never closes", &TokenizeOptions::default()).unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn unterminated_quoted_identifier_is_an_error() {
        assert!(tokenize(r#"SELECT "unterminated"#, &TokenizeOptions::default()).is_err());
    }

    #[test]
    fn control_character_is_an_error() {
        let err = tokenize("SELECT \u{0001};", &TokenizeOptions::default()).unwrap_err();
        assert!(err.message.contains("U+0001"));
    }

    #[test]
    fn identifier_exactly_at_max_length_succeeds() {
        let ident = "a".repeat(MAX_IDENTIFIER_LENGTH);
        let src = format!("SELECT {ident};");
        assert!(tokenize(&src, &TokenizeOptions::default()).is_ok());
    }

    #[test]
    fn identifier_one_beyond_max_length_errors() {
        let ident = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        let src = format!("SELECT {ident};");
        assert!(tokenize(&src, &TokenizeOptions::default()).is_err());
    }

    #[test]
    fn token_count_cap_is_enforced() {
        let opts = TokenizeOptions {
            max_token_count: 5,
            ..TokenizeOptions::default()
        };
        let err = tokenize("SELECT 1, 2, 3, 4, 5, 6;", &opts).unwrap_err();
        assert!(err.message.contains("5"));
    }

    #[test]
    fn token_count_cap_exactly_at_limit_succeeds() {
        // "SELECT" "1" ";" "eof" = 4 significant + eof
        let opts = TokenizeOptions {
            max_token_count: 4,
            ..TokenizeOptions::default()
        };
        assert!(tokenize("SELECT 1;", &opts).is_ok());
    }

    #[test]
    fn empty_input_tokenizes_to_just_eof() {
        let ts = toks("");
        assert_eq!(ts.len(), 1);
        assert!(ts[0].is_eof());
    }

    #[test]
    fn utf16_column_counts_surrogate_pairs_as_two() {
        // An emoji outside the BMP is 2 UTF-16 code units.
        let ts = toks("SELECT '\u{1F600}', 2;");
        let two = ts.iter().find(|t| t.text == "2").unwrap();
        // 'SELECT ' (7) + "'\u{1F600}'" (3 chars: ' + emoji + ') -> emoji
        // counts as 2 columns, so column tracking must advance past 1.
        assert!(two.column > 10);
    }

    #[test]
    fn dialect_extra_keywords_are_recognized() {
        use sqlfmt_core::Dialect;
        let dialect = Dialect::new().with_additional_keywords(["FROBNICATE"]);
        let opts = TokenizeOptions {
            dialect,
            ..TokenizeOptions::default()
        };
        let tokens = tokenize("FROBNICATE x;", &opts).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
    }
}
