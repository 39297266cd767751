use super::{
    token::{Token, TokenKind},
    LineBreaks,
};
use crate::lexer::Lexer;

/// Interface for creating new token formatters.
pub trait TokenFormatter {
    /// Formats a token into a string.
    fn format(&self, token: &Token) -> String;
}

pub trait ToFormatter<F>
where
    F: TokenFormatter,
{
    fn create_formatter(&self) -> F;
}

/// Formats tokens as `KIND lexeme literal`, where the literal is the parsed value of
/// integer and string tokens and `null` for everything else.
pub struct BasicFormatter<'src> {
    text: &'src str,
}

impl<'src> ToFormatter<BasicFormatter<'src>> for Lexer<'src> {
    fn create_formatter(&self) -> BasicFormatter<'src> {
        BasicFormatter {
            text: self.get_source(),
        }
    }
}

impl<'src> BasicFormatter<'src> {
    fn format_token(text: &str, token: &Token) -> String {
        let lexeme = text.get(token.span.range()).unwrap_or_default();
        match token.kind {
            TokenKind::Eof => "EOF  null".into(),
            TokenKind::IntegerLiteral => match lexeme.parse::<i64>() {
                Ok(value) => format!("INTEGER {lexeme} {value}"),
                Err(_) => format!("INTEGER {lexeme} overflow"),
            },
            TokenKind::StringLiteral => format!("STRING \"{lexeme}\" {lexeme}"),
            kind => format!("{kind} {lexeme} null"),
        }
    }
}

impl<'src> TokenFormatter for BasicFormatter<'src> {
    fn format(&self, token: &Token) -> String {
        Self::format_token(self.text, token)
    }
}

pub struct DebugFormatter;

impl<'src> ToFormatter<DebugFormatter> for Lexer<'src> {
    fn create_formatter(&self) -> DebugFormatter {
        DebugFormatter {}
    }
}

impl TokenFormatter for DebugFormatter {
    fn format(&self, token: &Token) -> String {
        format!("{token:?}")
    }
}

/// Same as [`BasicFormatter`] but prefixed with the line the token starts on.
pub struct LineFormatter<'src> {
    text: &'src str,
    line_breaks: LineBreaks,
}

impl<'src> ToFormatter<LineFormatter<'src>> for Lexer<'src> {
    fn create_formatter(&self) -> LineFormatter<'src> {
        LineFormatter {
            text: self.get_source(),
            line_breaks: self.get_line_breaks(),
        }
    }
}

impl<'src> TokenFormatter for LineFormatter<'src> {
    fn format(&self, token: &Token) -> String {
        let line = self.line_breaks.get_line_from_span(token.span);
        let value = BasicFormatter::format_token(self.text, token);
        format!("({line}) {value}")
    }
}
