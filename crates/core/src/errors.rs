use thiserror::Error;

use crate::token::Token;

/// Raised by the tokenizer on an unterminated lexeme, an over-long
/// identifier, a token-count overflow, or a stray control character.
/// Always fatal to the current call: no partial token stream
/// is ever returned alongside this error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TokenizeError {
    pub message: String,
    pub position: usize,
    pub line: u32,
    pub column: u32,
}

impl TokenizeError {
    pub fn new(message: impl Into<String>, position: usize, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            position,
            line,
            column,
        }
    }
}

/// Raised by the parser in strict mode on a syntactic mismatch. Recovery
/// mode never lets this escape: it is swallowed and rewritten
/// into a `raw` AST node instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub token_text: String,
    pub line: u32,
    pub column: u32,
}

impl ParseError {
    pub fn new(message: impl Into<String>, token: &Token) -> Self {
        Self {
            message: message.into(),
            token_text: token.text.to_string(),
            line: token.line,
            column: token.column,
        }
    }

    pub fn at(message: impl Into<String>, token_text: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            token_text: token_text.into(),
            line,
            column,
        }
    }
}

/// Tripped when recursive descent exceeds `maxDepth`. Kept distinct from
/// `ParseError` so callers can tell "pathological nesting" apart from a
/// genuine syntax mistake.
///
/// Deliberately does not carry a token position: at the point the depth
/// guard fires the current token is an implementation detail of how deep
/// the recursion happened to get, not a useful location for the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("exceeded maximum nesting depth ({max_depth}) while parsing")]
pub struct MaxDepthError {
    pub max_depth: usize,
}

impl MaxDepthError {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

/// The formatter's counterpart to `MaxDepthError`: tripped by its own
/// recursion guard when walking a pathologically nested AST.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("exceeded maximum nesting depth ({max_depth}) while formatting")]
pub struct FormatterError {
    pub max_depth: usize,
}

impl FormatterError {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}
