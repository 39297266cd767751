use super::cursor::SourceChar;
use super::token::{Span, SpanIndex, Token, TokenKind, KEYWORD_HASHMAP};

pub enum LexerStateTransition {
    Stay,
    ChangeState(LexerState),
    ChangeStateAndEmit {
        new_state: LexerState,
        token: Token,
    },
    ChangeStateAndEmitAndPutBack {
        new_state: LexerState,
        token: Token,
        put_back: SourceChar,
    },
}

trait LexerStateExecutor {
    fn execute(&self, source: &str, next_char: Option<SourceChar>) -> LexerStateTransition;
}

#[derive(Debug, Clone, Copy, Default)]
pub enum LexerState {
    #[default]
    Normal,
    Ident(IdentState),
    Integer(IntegerState),
    String(StringState),
    Equal(TwoCharState),
    Bang(TwoCharState),
}

impl LexerState {
    pub fn execute(&self, source: &str, next_char: Option<SourceChar>) -> LexerStateTransition {
        match self {
            LexerState::Normal => NormalState.execute(source, next_char),
            LexerState::Ident(s) => s.execute(source, next_char),
            LexerState::Integer(s) => s.execute(source, next_char),
            LexerState::String(s) => s.execute(source, next_char),
            LexerState::Equal(s) => s.execute_with(
                next_char,
                TokenKind::Equal,
                TokenKind::EqualEqual,
            ),
            LexerState::Bang(s) => s.execute_with(next_char, TokenKind::Bang, TokenKind::BangEqual),
        }
    }
}

fn end_of_source(source: &str) -> SpanIndex {
    source.len().into()
}

fn emit(kind: TokenKind, start: SpanIndex, end: SpanIndex) -> LexerStateTransition {
    LexerStateTransition::ChangeStateAndEmit {
        new_state: LexerState::Normal,
        token: Token {
            kind,
            span: Span::new(start, end),
        },
    }
}

fn emit_and_put_back(
    kind: TokenKind,
    start: SpanIndex,
    end: SpanIndex,
    put_back: SourceChar,
) -> LexerStateTransition {
    LexerStateTransition::ChangeStateAndEmitAndPutBack {
        new_state: LexerState::Normal,
        token: Token {
            kind,
            span: Span::new(start, end),
        },
        put_back,
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

struct NormalState;

impl LexerStateExecutor for NormalState {
    fn execute(&self, source: &str, next_char: Option<SourceChar>) -> LexerStateTransition {
        let Some(current) = next_char else {
            let end = end_of_source(source);
            return emit(TokenKind::Eof, end, end);
        };
        let start = current.offset;
        let just = |kind: TokenKind| emit(kind, start, current.next_offset());

        match current.value {
            // Single character tokens
            '(' => just(TokenKind::LeftParenthesis),
            ')' => just(TokenKind::RightParenthesis),
            '{' => just(TokenKind::LeftBrace),
            '}' => just(TokenKind::RightBrace),
            '[' => just(TokenKind::LeftBracket),
            ']' => just(TokenKind::RightBracket),
            ',' => just(TokenKind::Comma),
            ':' => just(TokenKind::Colon),
            ';' => just(TokenKind::Semicolon),
            '+' => just(TokenKind::Plus),
            '-' => just(TokenKind::Minus),
            '*' => just(TokenKind::Star),
            '/' => just(TokenKind::Slash),
            '<' => just(TokenKind::LessThan),
            '>' => just(TokenKind::GreaterThan),
            // Possibly two character tokens
            '=' => LexerStateTransition::ChangeState(LexerState::Equal(TwoCharState { start })),
            '!' => LexerStateTransition::ChangeState(LexerState::Bang(TwoCharState { start })),
            // String literal, the span excludes the quotes
            '"' => LexerStateTransition::ChangeState(LexerState::String(StringState {
                start: current.next_offset(),
            })),
            c if c.is_ascii_digit() => {
                LexerStateTransition::ChangeState(LexerState::Integer(IntegerState { start }))
            }
            c if is_ident_start(c) => {
                LexerStateTransition::ChangeState(LexerState::Ident(IdentState { start }))
            }
            c if c.is_whitespace() => LexerStateTransition::Stay,
            _ => just(TokenKind::Illegal),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IdentState {
    start: SpanIndex,
}

impl IdentState {
    fn lex_ident_or_keyword(&self, source: &str, end: SpanIndex) -> TokenKind {
        let span = Span::new(self.start, end);
        KEYWORD_HASHMAP
            .get(&source[span.range()])
            .copied()
            .unwrap_or(TokenKind::Ident)
    }
}

impl LexerStateExecutor for IdentState {
    fn execute(&self, source: &str, next_char: Option<SourceChar>) -> LexerStateTransition {
        match next_char {
            Some(c) if is_ident_continue(c.value) => LexerStateTransition::Stay,
            Some(c) => {
                let kind = self.lex_ident_or_keyword(source, c.offset);
                emit_and_put_back(kind, self.start, c.offset, c)
            }
            None => {
                let end = end_of_source(source);
                emit(self.lex_ident_or_keyword(source, end), self.start, end)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IntegerState {
    start: SpanIndex,
}

impl LexerStateExecutor for IntegerState {
    fn execute(&self, source: &str, next_char: Option<SourceChar>) -> LexerStateTransition {
        match next_char {
            Some(c) if c.value.is_ascii_digit() => LexerStateTransition::Stay,
            Some(c) => emit_and_put_back(TokenKind::IntegerLiteral, self.start, c.offset, c),
            None => emit(TokenKind::IntegerLiteral, self.start, end_of_source(source)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StringState {
    start: SpanIndex,
}

impl LexerStateExecutor for StringState {
    fn execute(&self, source: &str, next_char: Option<SourceChar>) -> LexerStateTransition {
        match next_char {
            Some(c) if c.value == '"' => emit(TokenKind::StringLiteral, self.start, c.offset),
            Some(_) => LexerStateTransition::Stay,
            // Unterminated strings run to the end of the input.
            None => emit(TokenKind::StringLiteral, self.start, end_of_source(source)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TwoCharState {
    start: SpanIndex,
}

impl TwoCharState {
    fn execute_with(
        &self,
        next_char: Option<SourceChar>,
        single: TokenKind,
        double: TokenKind,
    ) -> LexerStateTransition {
        let single_end = self.start + 1;
        match next_char {
            Some(c) if c.value == '=' => emit(double, self.start, c.next_offset()),
            Some(c) => emit_and_put_back(single, self.start, single_end, c),
            None => emit(single, self.start, single_end),
        }
    }
}
