use super::{InfixOperator, PrefixOperator};
use crate::parser::statement::BlockStatement;
use compact_str::CompactString;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::rc::Rc;

/// A key in a hash literal. Only a bare identifier or a string literal may appear there.
#[derive(Debug, Clone, PartialEq)]
pub enum HashKey {
    Identifier(CompactString),
    StringLiteral(CompactString),
}

/// One `(condition) { consequence }` arm of an `if` chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalBranch {
    pub condition: Expression,
    pub consequence: BlockStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(CompactString),
    IntegerLiteral(i64),
    StringLiteral(CompactString),
    BooleanLiteral(bool),
    ArrayLiteral(Vec<Expression>),
    /// Pairs are kept in source order.
    HashLiteral(Vec<(HashKey, Expression)>),
    /// `if` / `else if` chains are flattened into a single node.
    If {
        branches: Vec<ConditionalBranch>,
        alternative: Option<BlockStatement>,
    },
    While {
        condition: Box<Expression>,
        body: BlockStatement,
    },
    FunctionLiteral {
        parameters: Vec<CompactString>,
        body: Rc<BlockStatement>,
    },
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Index {
        receiver: Box<Expression>,
        index: Box<Expression>,
    },
    Prefix {
        operator: PrefixOperator,
        operand: Box<Expression>,
    },
    Infix {
        operator: InfixOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
}

impl Expression {
    pub fn prefix(operator: PrefixOperator, operand: Expression) -> Self {
        Self::Prefix {
            operator,
            operand: Box::new(operand),
        }
    }

    pub fn infix(operator: InfixOperator, lhs: Expression, rhs: Expression) -> Self {
        Self::Infix {
            operator,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

fn write_separated<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> FmtResult {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl Display for HashKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            HashKey::Identifier(name) => write!(f, "{name}"),
            HashKey::StringLiteral(value) => write!(f, "\"{value}\""),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Expression::Identifier(name) => write!(f, "{name}"),
            Expression::IntegerLiteral(value) => write!(f, "{value}"),
            Expression::StringLiteral(value) => write!(f, "\"{value}\""),
            Expression::BooleanLiteral(value) => write!(f, "{value}"),
            Expression::ArrayLiteral(items) => {
                write!(f, "[")?;
                write_separated(f, items)?;
                write!(f, "]")
            }
            Expression::HashLiteral(pairs) => {
                write!(f, "{{")?;
                for (index, (key, value)) in pairs.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Expression::If {
                branches,
                alternative,
            } => {
                for (index, branch) in branches.iter().enumerate() {
                    if index > 0 {
                        write!(f, " else ")?;
                    }
                    write!(
                        f,
                        "if ({}) {{ {} }}",
                        branch.condition, branch.consequence
                    )?;
                }
                if let Some(alternative) = alternative {
                    write!(f, " else {{ {alternative} }}")?;
                }
                Ok(())
            }
            Expression::While { condition, body } => {
                write!(f, "while ({condition}) {{ {body} }}")
            }
            Expression::FunctionLiteral { parameters, body } => {
                write!(f, "fn(")?;
                write_separated(f, parameters)?;
                write!(f, ") {{ {body} }}")
            }
            Expression::Call { callee, arguments } => {
                write!(f, "{callee}(")?;
                write_separated(f, arguments)?;
                write!(f, ")")
            }
            Expression::Index { receiver, index } => write!(f, "{receiver}[{index}]"),
            Expression::Prefix { operator, operand } => write!(f, "{operator}{operand}"),
            Expression::Infix { operator, lhs, rhs } => write!(f, "{lhs} {operator} {rhs}"),
        }
    }
}
