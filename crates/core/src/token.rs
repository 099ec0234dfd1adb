use smol_str::SmolStr;
use strum_macros::{Display, EnumIs};

/// Closed set of lexical categories a [`Token`] can belong to.
///
/// The tokenizer always produces exactly one of these per emitted
/// token, and the stream always ends with a single `Eof`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs)]
#[strum(serialize_all = "snake_case")]
pub enum TokenKind {
    Keyword,
    Identifier,
    Parameter,
    Number,
    String,
    Operator,
    Punctuation,
    LineComment,
    BlockComment,
    Whitespace,
    Eof,
}

impl TokenKind {
    /// Whitespace and comments never participate in grammar decisions; the
    /// parser filters them out before matching but the formatter still
    /// needs them for comment reattachment.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }
}

/// 1-based line/column of a token, with columns counted in UTF-16 code
/// units so that editors (VS Code, most LSPs) agree with us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A single lexeme with its absolute offset and resolved line/column.
///
/// `upper` is only meaningful for `Keyword`/`Identifier` tokens (the
/// uppercased copy of `text`, used for case-insensitive keyword matching
/// without re-uppercasing on every comparison); it is empty for every
/// other kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: SmolStr,
    pub upper: SmolStr,
    pub position: usize,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        text: impl Into<SmolStr>,
        position: usize,
        line: u32,
        column: u32,
    ) -> Self {
        let text = text.into();
        let upper = match kind {
            TokenKind::Keyword | TokenKind::Identifier => SmolStr::new(text.to_uppercase()),
            _ => SmolStr::default(),
        };
        Self {
            kind,
            text,
            upper,
            position,
            line,
            column,
        }
    }

    pub fn pos(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// True for `Eof`/whitespace/comment tokens that the parser must skip
    /// when scanning for the next meaningful token.
    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Case-insensitive match against a single uppercase keyword, e.g.
    /// `token.is_keyword("SELECT")`.
    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.upper == word
    }

    pub fn is_punct(&self, text: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == text
    }

    pub fn is_operator(&self, text: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == text
    }
}
