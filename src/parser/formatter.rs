use super::{
    expression::{Expression, HashKey},
    statement::{BlockStatement, Statement},
    ParserError, ParserErrorKind, Program,
};
use crate::lexer::LineBreaks;
use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};

const ARIADNE_MSG: &str = "Ariadne produces valid utf-8 strings";
const ARIADNE_WRITE_MSG: &str = "Write into buffer should not fail.";

pub trait ProgramFormatter {
    fn format(&self, program: &Program) -> String;
}

pub trait ParserFormatter {
    fn format_error(&self, error: &ParserError) -> String;
}

/// Renders the program back into its canonical source form.
pub struct SourceFormatter;

impl ProgramFormatter for SourceFormatter {
    fn format(&self, program: &Program) -> String {
        program.to_string()
    }
}

pub struct DebugFormatter;

impl ProgramFormatter for DebugFormatter {
    fn format(&self, program: &Program) -> String {
        format!("{program:#?}")
    }
}

impl ParserFormatter for DebugFormatter {
    fn format_error(&self, error: &ParserError) -> String {
        format!("{error:?}")
    }
}

/// Renders every statement as an S-expression on its own line.
pub struct SExpressionFormatter;

impl SExpressionFormatter {
    fn format_block(block: &BlockStatement) -> String {
        let mut buffer = String::from("(block");
        for statement in block.iter() {
            buffer.push(' ');
            buffer.push_str(&Self::format_statement(statement));
        }
        buffer.push(')');
        buffer
    }

    pub fn format_statement(statement: &Statement) -> String {
        match statement {
            Statement::Let { name, value } => {
                format!("(let {name} {})", Self::format_expression(value))
            }
            Statement::Return { value } => format!("(return {})", Self::format_expression(value)),
            Statement::Expression(expression) => Self::format_expression(expression),
        }
    }

    fn format_list(head: &str, items: &[Expression]) -> String {
        let mut buffer = format!("({head}");
        for item in items {
            buffer.push(' ');
            buffer.push_str(&Self::format_expression(item));
        }
        buffer.push(')');
        buffer
    }

    pub fn format_expression(expression: &Expression) -> String {
        match expression {
            Expression::Identifier(name) => name.to_string(),
            Expression::IntegerLiteral(value) => value.to_string(),
            Expression::StringLiteral(value) => format!("\"{value}\""),
            Expression::BooleanLiteral(value) => value.to_string(),
            Expression::ArrayLiteral(items) => Self::format_list("array", items),
            Expression::HashLiteral(pairs) => {
                let mut buffer = String::from("(hash");
                for (key, value) in pairs {
                    let key = match key {
                        HashKey::Identifier(name) => name.to_string(),
                        HashKey::StringLiteral(value) => format!("\"{value}\""),
                    };
                    buffer.push_str(&format!(" ({key} {})", Self::format_expression(value)));
                }
                buffer.push(')');
                buffer
            }
            Expression::If {
                branches,
                alternative,
            } => {
                let mut buffer = String::from("(if");
                for branch in branches {
                    buffer.push_str(&format!(
                        " {} {}",
                        Self::format_expression(&branch.condition),
                        Self::format_block(&branch.consequence)
                    ));
                }
                if let Some(alternative) = alternative {
                    buffer.push_str(&format!(" (else {})", Self::format_block(alternative)));
                }
                buffer.push(')');
                buffer
            }
            Expression::While { condition, body } => format!(
                "(while {} {})",
                Self::format_expression(condition),
                Self::format_block(body)
            ),
            Expression::FunctionLiteral { parameters, body } => {
                format!("(fn ({}) {})", parameters.join(" "), Self::format_block(body))
            }
            Expression::Call { callee, arguments } => {
                let mut buffer = format!("(call {}", Self::format_expression(callee));
                for argument in arguments {
                    buffer.push(' ');
                    buffer.push_str(&Self::format_expression(argument));
                }
                buffer.push(')');
                buffer
            }
            Expression::Index { receiver, index } => format!(
                "(index {} {})",
                Self::format_expression(receiver),
                Self::format_expression(index)
            ),
            Expression::Prefix { operator, operand } => {
                format!("({operator} {})", Self::format_expression(operand))
            }
            Expression::Infix { operator, lhs, rhs } => format!(
                "({operator} {} {})",
                Self::format_expression(lhs),
                Self::format_expression(rhs)
            ),
        }
    }
}

impl ProgramFormatter for SExpressionFormatter {
    fn format(&self, program: &Program) -> String {
        program
            .iter()
            .map(Self::format_statement)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Formats errors as `[line N] Error: message`.
pub struct BasicParserFormatter {
    line_breaks: LineBreaks,
}

impl BasicParserFormatter {
    pub fn new(text: &str) -> Self {
        Self {
            line_breaks: LineBreaks::new(text),
        }
    }
}

impl ParserFormatter for BasicParserFormatter {
    fn format_error(&self, error: &ParserError) -> String {
        let line = self.line_breaks.get_line_from_span(error.span);
        format!("[line {line}] Error: {error}")
    }
}

/// Formats errors as ariadne reports pointing at the offending token.
pub struct PrettyParserFormatter<'src> {
    text: &'src str,
    path: &'src str,
}

impl<'src> PrettyParserFormatter<'src> {
    pub fn new(text: &'src str, path: &'src str) -> Self {
        Self { text, path }
    }

    fn label_message(kind: &ParserErrorKind) -> String {
        match kind {
            ParserErrorKind::UnexpectedToken { expected, actual } => {
                format!("Expected {expected} but got {actual}")
            }
            ParserErrorKind::NonExpression(kind) => format!("Not an expression token {kind}"),
            ParserErrorKind::InvalidInteger(lexeme) => {
                format!("{lexeme} does not fit in a 64-bit integer")
            }
            ParserErrorKind::InvalidParameter(kind) => format!("Not a parameter name {kind}"),
            ParserErrorKind::InvalidHashKey(kind) => format!("Not a valid hash key {kind}"),
        }
    }
}

impl<'src> ParserFormatter for PrettyParserFormatter<'src> {
    fn format_error(&self, error: &ParserError) -> String {
        let path = self.path;
        let range = error.span.range();
        let mut output = std::io::Cursor::new(Vec::new());
        // Spans are byte offsets into the source.
        Report::build(ReportKind::Error, (path, range.clone()))
            .with_config(Config::default().with_index_type(IndexType::Byte))
            .with_code(error.code())
            .with_message(error.to_string())
            .with_label(
                Label::new((path, range))
                    .with_message(Self::label_message(&error.kind))
                    .with_color(Color::BrightRed),
            )
            .finish()
            .write((path, Source::from(self.text)), &mut output)
            .expect(ARIADNE_WRITE_MSG);
        String::from_utf8(output.into_inner()).expect(ARIADNE_MSG)
    }
}
