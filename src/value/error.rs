use crate::parser::expression::{InfixOperator, PrefixOperator};
use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("type mismatch: {lhs} {operator} {rhs}")]
    TypeMismatch {
        lhs: &'static str,
        operator: InfixOperator,
        rhs: &'static str,
    },
    #[error("unknown operator: {lhs} {operator} {rhs}")]
    UnknownInfixOperator {
        lhs: &'static str,
        operator: InfixOperator,
        rhs: &'static str,
    },
    #[error("unknown operator: {operator}{operand}")]
    UnknownPrefixOperator {
        operator: PrefixOperator,
        operand: &'static str,
    },
    #[error("identifier not found: {0}")]
    IdentifierNotFound(CompactString),
    #[error("not a function: {0}")]
    NotAFunction(CompactString),
    #[error("index out of bounds: got={0}")]
    IndexOutOfBounds(i64),
    #[error("access expression is not integer: got {0}")]
    NonIntegerIndex(&'static str),
    #[error("keys in hash tables must be strings: got {0}")]
    NonStringKey(&'static str),
    #[error("access by expression is not supported for this type: got {0}")]
    NotIndexable(&'static str),
    #[error("cannot assign value to: {0}")]
    InvalidAssignmentTarget(&'static str),
    #[error("cannot assign to unbound identifier: {0}")]
    UnboundAssignment(CompactString),
    #[error("while condition must be BOOLEAN: got {0}")]
    NonBooleanCondition(&'static str),
    #[error("division by zero")]
    DivisionByZero,
    #[error("wrong number of arguments: got={actual}, want={expected}")]
    InvalidArgumentCount { actual: usize, expected: usize },
    #[error("wrong number of arguments: got={actual}, want>={minimum}")]
    TooFewArguments { actual: usize, minimum: usize },
    #[error("argument type is not supported: got {0}")]
    UnsupportedArgument(&'static str),
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    pub fn code(&self) -> &'static str {
        match self.kind {
            RuntimeErrorKind::TypeMismatch { .. } => "RT001",
            RuntimeErrorKind::UnknownInfixOperator { .. } => "RT002",
            RuntimeErrorKind::UnknownPrefixOperator { .. } => "RT003",
            RuntimeErrorKind::IdentifierNotFound(_) => "RT004",
            RuntimeErrorKind::NotAFunction(_) => "RT005",
            RuntimeErrorKind::IndexOutOfBounds(_) => "RT006",
            RuntimeErrorKind::NonIntegerIndex(_) => "RT007",
            RuntimeErrorKind::NonStringKey(_) => "RT008",
            RuntimeErrorKind::NotIndexable(_) => "RT009",
            RuntimeErrorKind::InvalidAssignmentTarget(_) => "RT010",
            RuntimeErrorKind::UnboundAssignment(_) => "RT011",
            RuntimeErrorKind::NonBooleanCondition(_) => "RT012",
            RuntimeErrorKind::DivisionByZero => "RT013",
            RuntimeErrorKind::InvalidArgumentCount { .. } => "RT014",
            RuntimeErrorKind::TooFewArguments { .. } => "RT015",
            RuntimeErrorKind::UnsupportedArgument(_) => "RT016",
        }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl From<RuntimeErrorKind> for RuntimeError {
    fn from(kind: RuntimeErrorKind) -> Self {
        Self { kind }
    }
}
