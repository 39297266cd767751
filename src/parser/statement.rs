use super::expression::Expression;
use compact_str::CompactString;
use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let {
        name: CompactString,
        value: Expression,
    },
    Return {
        value: Expression,
    },
    Expression(Expression),
}

/// A brace delimited list of statements, used by `if`, `while` and function bodies.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

impl BlockStatement {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }
}

/// Writes statements separated by `; `.
pub(crate) fn write_statements(f: &mut Formatter<'_>, statements: &[Statement]) -> FmtResult {
    for (index, statement) in statements.iter().enumerate() {
        if index > 0 {
            write!(f, "; ")?;
        }
        write!(f, "{statement}")?;
    }
    Ok(())
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Statement::Let { name, value } => write!(f, "let {name} = {value}"),
            Statement::Return { value } => write!(f, "return {value}"),
            Statement::Expression(expression) => write!(f, "{expression}"),
        }
    }
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write_statements(f, &self.statements)
    }
}
