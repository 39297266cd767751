mod error;
pub mod expression;
pub mod formatter;
mod program;
pub mod statement;

pub use error::{ParserError, ParserErrorKind};
pub use program::Program;

use crate::lexer::{Lexer, Token, TokenKind};
use compact_str::CompactString;
use expression::{ConditionalBranch, Expression, HashKey, InfixOperator, Precedence, PrefixOperator};
use statement::{BlockStatement, Statement};
use std::rc::Rc;

/// The outcome of parsing a whole source text.
///
/// Parsing never stops at the first error: every statement that fails is recorded in
/// `errors` and left out of `program`.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub program: Program,
    pub errors: Vec<ParserError>,
}

impl ParseResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct Parser<'src> {
    lexer: Lexer<'src>,
    lookahead: Option<Token>,
    previous: Option<Token>,
    /// Number of braces opened and not yet closed by the consumed tokens.
    brace_depth: usize,
    errors: Vec<ParserError>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let lookahead = Some(lexer.next_token());
        Self {
            lexer,
            lookahead,
            previous: None,
            brace_depth: 0,
            errors: Vec::new(),
        }
    }

    fn peek(&mut self) -> Token {
        match self.lookahead {
            Some(token) => token,
            None => {
                let token = self.lexer.next_token();
                self.lookahead = Some(token);
                token
            }
        }
    }

    fn next_token(&mut self) -> Token {
        let token = match self.lookahead.take() {
            Some(token) => token,
            None => self.lexer.next_token(),
        };
        match token.kind {
            TokenKind::LeftBrace => self.brace_depth += 1,
            TokenKind::RightBrace => self.brace_depth = self.brace_depth.saturating_sub(1),
            _ => {}
        }
        self.previous = Some(token);
        token
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token, ParserError> {
        let token = self.peek();
        if token.kind != expected {
            Err(ParserError::new(
                ParserErrorKind::UnexpectedToken {
                    expected,
                    actual: token.kind,
                },
                token.span,
            ))
        } else {
            Ok(self.next_token())
        }
    }

    fn eat_if(&mut self, next: TokenKind) -> Option<Token> {
        if self.peek().kind == next {
            Some(self.next_token())
        } else {
            None
        }
    }

    fn lexeme(&self, token: &Token) -> CompactString {
        self.lexer
            .get_lexeme(&token.span)
            .map(CompactString::from)
            .unwrap_or_default()
    }

    /// Whether `token` is the first token on a line after the previously consumed one.
    fn starts_new_line(&self, token: &Token) -> bool {
        let Some(previous) = self.previous else {
            return false;
        };
        self.lexer
            .get_source()
            .get(previous.span.range().end..token.span.range().start)
            .is_some_and(|gap| gap.contains('\n'))
    }

    fn record_error(&mut self, error: ParserError) {
        tracing::trace!(code = error.code(), "{error}");
        self.errors.push(error);
    }

    /// Skips the rest of a failed statement that started at brace nesting `depth`.
    ///
    /// Stops after a `;`, or before a `let`, a `return`, a token starting a new line or the `}`
    /// closing the enclosing block. Only tokens at `depth` are considered, so nested blocks are
    /// skipped whole.
    fn synchronize(&mut self, depth: usize) {
        if self.brace_depth <= depth
            && matches!(self.previous, Some(Token { kind: TokenKind::Semicolon, .. }))
        {
            return;
        }
        loop {
            let token = self.peek();
            if token.kind == TokenKind::Eof {
                return;
            }
            if self.brace_depth <= depth {
                match token.kind {
                    TokenKind::Semicolon => {
                        self.next_token();
                        return;
                    }
                    TokenKind::KeywordLet | TokenKind::KeywordReturn => return,
                    TokenKind::RightBrace if depth > 0 => return,
                    _ if self.starts_new_line(&token) => return,
                    _ => {}
                }
            }
            self.next_token();
        }
    }
}

// Program and statements
impl<'src> Parser<'src> {
    pub fn parse_program(&mut self) -> ParseResult {
        let mut statements = Vec::new();

        while self.peek().kind != TokenKind::Eof {
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    self.record_error(error);
                    self.synchronize(0);
                }
            }
        }

        ParseResult {
            program: Program::new(statements),
            errors: std::mem::take(&mut self.errors),
        }
    }

    pub fn parse_statement(&mut self) -> Result<Statement, ParserError> {
        let statement = match self.peek().kind {
            TokenKind::KeywordLet => {
                self.next_token();
                let name_token = self.expect(TokenKind::Ident)?;
                let name = self.lexeme(&name_token);
                self.expect(TokenKind::Equal)?;
                let value = self.parse_expression(Precedence::Lowest)?;
                Statement::Let { name, value }
            }
            TokenKind::KeywordReturn => {
                self.next_token();
                let value = self.parse_expression(Precedence::Lowest)?;
                Statement::Return { value }
            }
            _ => Statement::Expression(self.parse_expression(Precedence::Lowest)?),
        };
        // The terminating semicolon is optional.
        self.eat_if(TokenKind::Semicolon);
        Ok(statement)
    }

    /// Parses statements up to the closing brace. The opening brace must already be consumed.
    ///
    /// A failing statement is recorded and skipped so that the rest of the block still parses.
    fn parse_block(&mut self) -> Result<BlockStatement, ParserError> {
        let depth = self.brace_depth;
        let mut statements = Vec::new();
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::RightBrace => {
                    self.next_token();
                    break;
                }
                TokenKind::Eof => {
                    return Err(ParserError::new(
                        ParserErrorKind::UnexpectedToken {
                            expected: TokenKind::RightBrace,
                            actual: token.kind,
                        },
                        token.span,
                    ))
                }
                _ => match self.parse_statement() {
                    Ok(statement) => statements.push(statement),
                    Err(error) => {
                        self.record_error(error);
                        // The offending token closed this block.
                        if self.brace_depth < depth {
                            break;
                        }
                        self.synchronize(depth);
                    }
                },
            }
        }
        Ok(BlockStatement::new(statements))
    }
}

// Pratt parser for expressions
impl<'src> Parser<'src> {
    pub fn parse_expression(&mut self, precedence: Precedence) -> Result<Expression, ParserError> {
        let mut lhs = self.expect_left_expression()?;

        loop {
            let token = self.peek();
            if precedence >= Precedence::of(token.kind) {
                break;
            }
            lhs = match token.kind {
                TokenKind::LeftParenthesis => {
                    self.next_token();
                    let arguments = self.parse_expression_list(TokenKind::RightParenthesis)?;
                    Expression::Call {
                        callee: Box::new(lhs),
                        arguments,
                    }
                }
                TokenKind::LeftBracket => {
                    self.next_token();
                    let index = self.parse_expression(Precedence::Lowest)?;
                    self.expect(TokenKind::RightBracket)?;
                    Expression::Index {
                        receiver: Box::new(lhs),
                        index: Box::new(index),
                    }
                }
                kind => {
                    let Some(operator) = InfixOperator::from_token(kind) else {
                        break;
                    };
                    self.next_token();
                    let rhs = self.parse_expression(operator.get_binding_power())?;
                    Expression::infix(operator, lhs, rhs)
                }
            };
        }
        Ok(lhs)
    }

    fn expect_left_expression(&mut self) -> Result<Expression, ParserError> {
        let token = self.next_token();

        let expression = match token.kind {
            TokenKind::Ident => Expression::Identifier(self.lexeme(&token)),
            TokenKind::IntegerLiteral => {
                let lexeme = self.lexeme(&token);
                match lexeme.parse::<i64>() {
                    Ok(value) => Expression::IntegerLiteral(value),
                    Err(_) => {
                        return Err(ParserError::new(
                            ParserErrorKind::InvalidInteger(lexeme),
                            token.span,
                        ))
                    }
                }
            }
            TokenKind::StringLiteral => Expression::StringLiteral(self.lexeme(&token)),
            TokenKind::KeywordTrue => Expression::BooleanLiteral(true),
            TokenKind::KeywordFalse => Expression::BooleanLiteral(false),
            TokenKind::Bang | TokenKind::Minus => {
                let Some(operator) = PrefixOperator::from_token(token.kind) else {
                    return Err(ParserError::new(
                        ParserErrorKind::NonExpression(token.kind),
                        token.span,
                    ));
                };
                let operand = self.parse_expression(operator.get_binding_power())?;
                Expression::prefix(operator, operand)
            }
            // Grouping only affects the shape of the tree, it leaves no node behind.
            TokenKind::LeftParenthesis => {
                let inner = self.parse_expression(Precedence::Lowest)?;
                self.expect(TokenKind::RightParenthesis)?;
                inner
            }
            TokenKind::LeftBracket => {
                Expression::ArrayLiteral(self.parse_expression_list(TokenKind::RightBracket)?)
            }
            TokenKind::LeftBrace => self.parse_hash_literal()?,
            TokenKind::KeywordIf => self.parse_if()?,
            TokenKind::KeywordWhile => {
                let condition = self.parse_condition()?;
                self.expect(TokenKind::LeftBrace)?;
                let body = self.parse_block()?;
                Expression::While {
                    condition: Box::new(condition),
                    body,
                }
            }
            TokenKind::KeywordFn => self.parse_function_literal()?,
            kind => {
                return Err(ParserError::new(
                    ParserErrorKind::NonExpression(kind),
                    token.span,
                ))
            }
        };
        Ok(expression)
    }

    /// Parses comma separated expressions up to `end`. The opening delimiter must already be
    /// consumed.
    fn parse_expression_list(&mut self, end: TokenKind) -> Result<Vec<Expression>, ParserError> {
        let mut items = Vec::new();
        if self.eat_if(end).is_some() {
            return Ok(items);
        }
        loop {
            items.push(self.parse_expression(Precedence::Lowest)?);
            if self.eat_if(TokenKind::Comma).is_none() {
                self.expect(end)?;
                break;
            }
        }
        Ok(items)
    }

    fn parse_hash_literal(&mut self) -> Result<Expression, ParserError> {
        let mut pairs = Vec::new();
        loop {
            if self.eat_if(TokenKind::RightBrace).is_some() {
                break;
            }
            let token = self.next_token();
            let key = match token.kind {
                TokenKind::Ident => HashKey::Identifier(self.lexeme(&token)),
                TokenKind::StringLiteral => HashKey::StringLiteral(self.lexeme(&token)),
                kind => {
                    return Err(ParserError::new(
                        ParserErrorKind::InvalidHashKey(kind),
                        token.span,
                    ))
                }
            };
            self.expect(TokenKind::Colon)?;
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if self.peek().kind != TokenKind::RightBrace {
                self.expect(TokenKind::Comma)?;
            }
        }
        Ok(Expression::HashLiteral(pairs))
    }

    /// Parses a parenthesised condition as used by `if` and `while`.
    fn parse_condition(&mut self) -> Result<Expression, ParserError> {
        self.expect(TokenKind::LeftParenthesis)?;
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::RightParenthesis)?;
        Ok(condition)
    }

    fn parse_if(&mut self) -> Result<Expression, ParserError> {
        let mut branches = Vec::new();
        let mut alternative = None;

        loop {
            let condition = self.parse_condition()?;
            self.expect(TokenKind::LeftBrace)?;
            let consequence = self.parse_block()?;
            branches.push(ConditionalBranch {
                condition,
                consequence,
            });

            if self.eat_if(TokenKind::KeywordElse).is_none() {
                break;
            }
            if self.eat_if(TokenKind::KeywordIf).is_some() {
                continue;
            }
            self.expect(TokenKind::LeftBrace)?;
            alternative = Some(self.parse_block()?);
            break;
        }

        Ok(Expression::If {
            branches,
            alternative,
        })
    }

    fn parse_function_literal(&mut self) -> Result<Expression, ParserError> {
        self.expect(TokenKind::LeftParenthesis)?;
        let mut parameters = Vec::new();
        if self.eat_if(TokenKind::RightParenthesis).is_none() {
            loop {
                let token = self.next_token();
                if token.kind != TokenKind::Ident {
                    return Err(ParserError::new(
                        ParserErrorKind::InvalidParameter(token.kind),
                        token.span,
                    ));
                }
                parameters.push(self.lexeme(&token));
                if self.eat_if(TokenKind::Comma).is_none() {
                    self.expect(TokenKind::RightParenthesis)?;
                    break;
                }
            }
        }
        self.expect(TokenKind::LeftBrace)?;
        let body = self.parse_block()?;
        Ok(Expression::FunctionLiteral {
            parameters,
            body: Rc::new(body),
        })
    }
}

/// Parses a whole source text, collecting every error instead of stopping at the first.
pub fn parse(source: &str) -> ParseResult {
    let mut parser = Parser::new(source);
    let result = parser.parse_program();
    tracing::debug!(
        statements = result.program.len(),
        errors = result.errors.len(),
        "parsed program"
    );
    result
}
