use sqlfmt_core::{FormatterError, MaxDepthError, ParseError, TokenizeError};
use thiserror::Error;

/// Unifies every error [`crate::format`] can raise: a
/// tokenize or strict-mode parse error propagated unchanged from the
/// parser stage, or the formatter's own depth guard tripping while
/// walking a pathologically nested AST.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatFailure {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Depth(#[from] MaxDepthError),
    #[error(transparent)]
    Formatter(#[from] FormatterError),
}

impl From<sqlfmt_parser::ParseFailure> for FormatFailure {
    fn from(e: sqlfmt_parser::ParseFailure) -> Self {
        match e {
            sqlfmt_parser::ParseFailure::Tokenize(e) => FormatFailure::Tokenize(e),
            sqlfmt_parser::ParseFailure::Parse(e) => FormatFailure::Parse(e),
            sqlfmt_parser::ParseFailure::Depth(e) => FormatFailure::Depth(e),
        }
    }
}
