pub mod error;

use crate::environment::Environment;
use crate::interpreter::SystemContext;
use crate::parser::{
    expression::{InfixOperator, PrefixOperator},
    statement::BlockStatement,
};
use compact_str::{CompactString, CompactStringExt};
use error::{RuntimeError, RuntimeErrorKind};
use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

pub type SharedArray = Rc<RefCell<Vec<Value>>>;
pub type SharedHash = Rc<RefCell<HashMap<CompactString, Value>>>;

/// A function implemented by the host rather than in the language.
pub trait NativeFunction: fmt::Debug {
    fn get_name(&self) -> &'static str;
    fn call(
        &self,
        arguments: &[Value],
        context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeError>;
}

/// A user defined function together with the scope it was created in.
pub struct Function {
    pub parameters: Vec<CompactString>,
    pub body: Rc<BlockStatement>,
    pub closure: Environment,
}

// The closure is left out since it usually contains the function itself.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

/// The value of a variable read, remembering which name it came from.
#[derive(Debug)]
pub struct BoundIdentifier {
    pub name: CompactString,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKey {
    Index(usize),
    Key(CompactString),
}

/// The value of an index access, remembering the collection and slot it was read from
/// so that it can be the target of an assignment.
#[derive(Debug)]
pub struct Element {
    pub collection: Value,
    pub key: ElementKey,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    String(CompactString),
    Boolean(bool),
    Null,
    Array(SharedArray),
    Hash(SharedHash),
    Function(Rc<Function>),
    Builtin(&'static dyn NativeFunction),
    Error(RuntimeError),
    /// Carries the operand of a `return` out of nested blocks.
    Return(Box<Value>),
    Bound(Rc<BoundIdentifier>),
    Element(Rc<Element>),
}

impl Value {
    pub fn string(value: impl Into<CompactString>) -> Self {
        Self::String(value.into())
    }

    pub fn array(items: Vec<Value>) -> Self {
        Self::Array(Rc::new(RefCell::new(items)))
    }

    pub fn hash(items: HashMap<CompactString, Value>) -> Self {
        Self::Hash(Rc::new(RefCell::new(items)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::String(_) => "STRING",
            Value::Boolean(_) => "BOOLEAN",
            Value::Null => "NULL",
            Value::Array(_) => "ARRAY",
            Value::Hash(_) => "HASHTABLE",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::Error(_) => "ERROR",
            Value::Return(_) => "RETURN",
            Value::Bound(_) => "IDENTIFIER",
            Value::Element(_) => "ELEMENT",
        }
    }

    /// Strips the `Bound` and `Element` wrappers, leaving the plain value.
    pub fn resolve(self) -> Value {
        match self {
            Value::Bound(bound) => bound.value.clone(),
            Value::Element(element) => element.value.clone(),
            value => value,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// Unary operators
impl Value {
    /// Only `true` and positive integers are truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(value) => *value,
            Value::Integer(value) => *value > 0,
            _ => false,
        }
    }

    pub fn logical_not(&self) -> Value {
        match self {
            Value::Boolean(value) => Value::Boolean(!value),
            _ => Value::Boolean(false),
        }
    }

    pub fn numeric_negate(&self) -> Result<Value, RuntimeErrorKind> {
        match self {
            Value::Integer(value) => Ok(Value::Integer(value.wrapping_neg())),
            value => Err(RuntimeErrorKind::UnknownPrefixOperator {
                operator: PrefixOperator::Minus,
                operand: value.type_name(),
            }),
        }
    }
}

// Binary operators
impl Value {
    /// Applies every infix operator except assignment, which needs the environment.
    pub fn binary(&self, operator: InfixOperator, other: &Value) -> Result<Value, RuntimeErrorKind> {
        match (self, other) {
            (Value::Integer(lhs), Value::Integer(rhs)) => {
                Self::integer_binary(operator, *lhs, *rhs)
            }
            (Value::String(lhs), Value::String(rhs)) => Self::string_binary(operator, lhs, rhs),
            (lhs, rhs) => match operator {
                InfixOperator::EqualEqual => Ok(Value::Boolean(lhs.is_identical(rhs))),
                InfixOperator::BangEqual => Ok(Value::Boolean(!lhs.is_identical(rhs))),
                operator if lhs.type_name() != rhs.type_name() => {
                    Err(RuntimeErrorKind::TypeMismatch {
                        lhs: lhs.type_name(),
                        operator,
                        rhs: rhs.type_name(),
                    })
                }
                operator => Err(RuntimeErrorKind::UnknownInfixOperator {
                    lhs: lhs.type_name(),
                    operator,
                    rhs: rhs.type_name(),
                }),
            },
        }
    }

    fn integer_binary(
        operator: InfixOperator,
        lhs: i64,
        rhs: i64,
    ) -> Result<Value, RuntimeErrorKind> {
        let value = match operator {
            InfixOperator::Add => Value::Integer(lhs.wrapping_add(rhs)),
            InfixOperator::Subtract => Value::Integer(lhs.wrapping_sub(rhs)),
            InfixOperator::Multiply => Value::Integer(lhs.wrapping_mul(rhs)),
            InfixOperator::Divide => {
                if rhs == 0 {
                    return Err(RuntimeErrorKind::DivisionByZero);
                }
                Value::Integer(lhs.wrapping_div(rhs))
            }
            InfixOperator::LessThan => Value::Boolean(lhs < rhs),
            InfixOperator::GreaterThan => Value::Boolean(lhs > rhs),
            InfixOperator::EqualEqual => Value::Boolean(lhs == rhs),
            InfixOperator::BangEqual => Value::Boolean(lhs != rhs),
            InfixOperator::Assign => {
                return Err(RuntimeErrorKind::UnknownInfixOperator {
                    lhs: "INTEGER",
                    operator,
                    rhs: "INTEGER",
                })
            }
        };
        Ok(value)
    }

    fn string_binary(
        operator: InfixOperator,
        lhs: &CompactString,
        rhs: &CompactString,
    ) -> Result<Value, RuntimeErrorKind> {
        let value = match operator {
            InfixOperator::Add => Value::String([lhs, rhs].concat_compact()),
            InfixOperator::LessThan => Value::Boolean(lhs < rhs),
            InfixOperator::GreaterThan => Value::Boolean(lhs > rhs),
            InfixOperator::EqualEqual => Value::Boolean(lhs == rhs),
            InfixOperator::BangEqual => Value::Boolean(lhs != rhs),
            operator => {
                return Err(RuntimeErrorKind::UnknownInfixOperator {
                    lhs: "STRING",
                    operator,
                    rhs: "STRING",
                })
            }
        };
        Ok(value)
    }

    /// Equality used by `==` when the operands are not both integers or both strings.
    /// Collections and functions are only equal to themselves.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Boolean(lhs), Value::Boolean(rhs)) => lhs == rhs,
            (Value::Null, Value::Null) => true,
            (Value::Array(lhs), Value::Array(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Value::Hash(lhs), Value::Hash(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Value::Function(lhs), Value::Function(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Value::Builtin(lhs), Value::Builtin(rhs)) => lhs.get_name() == rhs.get_name(),
            _ => false,
        }
    }
}

/// Structural equality, mostly useful in tests. Functions compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(lhs), Value::Integer(rhs)) => lhs == rhs,
            (Value::String(lhs), Value::String(rhs)) => lhs == rhs,
            (Value::Boolean(lhs), Value::Boolean(rhs)) => lhs == rhs,
            (Value::Null, Value::Null) => true,
            (Value::Array(lhs), Value::Array(rhs)) => {
                Rc::ptr_eq(lhs, rhs) || *lhs.borrow() == *rhs.borrow()
            }
            (Value::Hash(lhs), Value::Hash(rhs)) => {
                Rc::ptr_eq(lhs, rhs) || *lhs.borrow() == *rhs.borrow()
            }
            (Value::Function(lhs), Value::Function(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Value::Builtin(lhs), Value::Builtin(rhs)) => lhs.get_name() == rhs.get_name(),
            (Value::Error(lhs), Value::Error(rhs)) => lhs == rhs,
            (Value::Return(lhs), Value::Return(rhs)) => lhs == rhs,
            (Value::Bound(lhs), Value::Bound(rhs)) => {
                lhs.name == rhs.name && lhs.value == rhs.value
            }
            (Value::Element(lhs), Value::Element(rhs)) => {
                lhs.key == rhs.key && lhs.value == rhs.value
            }
            _ => false,
        }
    }
}

impl From<RuntimeError> for Value {
    fn from(error: RuntimeError) -> Self {
        Value::Error(error)
    }
}

impl Value {
    /// Writes the value, quoting strings when `nested` inside a collection.
    ///
    /// `open` holds the collections currently being written. A collection that contains
    /// itself is written as `[...]` or `{...}` the second time round.
    fn fmt_with(
        &self,
        f: &mut fmt::Formatter<'_>,
        nested: bool,
        open: &mut Vec<*const ()>,
    ) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            Value::String(value) if nested => write!(f, "\"{value}\""),
            Value::String(value) => write!(f, "{value}"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Null => write!(f, "null"),
            Value::Array(items) => {
                let id = Rc::as_ptr(items).cast::<()>();
                if open.contains(&id) {
                    return write!(f, "[...]");
                }
                open.push(id);
                write!(f, "[")?;
                for (index, item) in items.borrow().iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt_with(f, true, open)?;
                }
                open.pop();
                write!(f, "]")
            }
            Value::Hash(items) => {
                let id = Rc::as_ptr(items).cast::<()>();
                if open.contains(&id) {
                    return write!(f, "{{...}}");
                }
                open.push(id);
                let items = items.borrow();
                let mut keys: Vec<&CompactString> = items.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (index, key) in keys.into_iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{key}\": ")?;
                    if let Some(value) = items.get(key) {
                        value.fmt_with(f, true, open)?;
                    }
                }
                open.pop();
                write!(f, "}}")
            }
            Value::Function(function) => {
                write!(
                    f,
                    "fn({}) {{ {} }}",
                    function.parameters.join(", "),
                    function.body
                )
            }
            Value::Builtin(_) => write!(f, "builtin function"),
            Value::Error(error) => write!(f, "ERROR: {error}"),
            Value::Return(value) => value.fmt_with(f, nested, open),
            Value::Bound(bound) => bound.value.fmt_with(f, nested, open),
            Value::Element(element) => element.value.fmt_with(f, nested, open),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with(f, false, &mut Vec::new())
    }
}
