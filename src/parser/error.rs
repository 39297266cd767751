use crate::lexer::{Span, TokenKind};
use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParserErrorKind {
    #[error("expected next token to be '{expected}', got {actual} instead")]
    UnexpectedToken {
        expected: TokenKind,
        actual: TokenKind,
    },
    #[error("parse function for token type '{0}' is not implemented")]
    NonExpression(TokenKind),
    #[error("error parsing integer value: {0}")]
    InvalidInteger(CompactString),
    #[error("expected a parameter name but got {0}")]
    InvalidParameter(TokenKind),
    #[error("expected a hash key to be an identifier or a string but got {0}")]
    InvalidHashKey(TokenKind),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct ParserError {
    #[source]
    pub kind: ParserErrorKind,
    /// The span of the offending token.
    pub span: Span,
}

impl ParserError {
    pub fn new(kind: ParserErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            ParserErrorKind::UnexpectedToken { .. } => "P001",
            ParserErrorKind::NonExpression(_) => "P002",
            ParserErrorKind::InvalidInteger(_) => "P003",
            ParserErrorKind::InvalidParameter(_) => "P004",
            ParserErrorKind::InvalidHashKey(_) => "P005",
        }
    }
}
