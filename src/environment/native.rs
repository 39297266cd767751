use crate::interpreter::SystemContext;
use crate::value::{
    error::{RuntimeError, RuntimeErrorKind},
    NativeFunction, Value,
};
use std::{collections::HashMap, sync::LazyLock};

/// Every built-in function, keyed by the name it is reachable under.
pub static BUILTINS: LazyLock<HashMap<&'static str, &'static (dyn NativeFunction + Sync)>> =
    LazyLock::new(|| {
        let natives: [&'static (dyn NativeFunction + Sync); 4] =
            [&NativeLen, &NativeShift, &NativeAppend, &NativeLog];
        natives
            .into_iter()
            .map(|native| (native.get_name(), native))
            .collect()
    });

pub fn lookup_builtin(name: &str) -> Option<Value> {
    BUILTINS
        .get(name)
        .map(|native| Value::Builtin(*native as &'static dyn NativeFunction))
}

fn expect_arity(arguments: &[Value], expected: usize) -> Result<(), RuntimeError> {
    if arguments.len() != expected {
        return Err(RuntimeErrorKind::InvalidArgumentCount {
            actual: arguments.len(),
            expected,
        }
        .into());
    }
    Ok(())
}

fn unsupported(value: &Value) -> RuntimeError {
    RuntimeErrorKind::UnsupportedArgument(value.type_name()).into()
}

/// `len(x)`: number of characters in a string or items in an array.
#[derive(Debug)]
pub struct NativeLen;

impl NativeFunction for NativeLen {
    fn get_name(&self) -> &'static str {
        "len"
    }

    fn call(
        &self,
        arguments: &[Value],
        _context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeError> {
        expect_arity(arguments, 1)?;
        match &arguments[0] {
            Value::String(value) => Ok(Value::Integer(value.chars().count() as i64)),
            Value::Array(items) => Ok(Value::Integer(items.borrow().len() as i64)),
            value => Err(unsupported(value)),
        }
    }
}

/// `shift(array)`: a new array without the first item. An empty array is returned as is.
#[derive(Debug)]
pub struct NativeShift;

impl NativeFunction for NativeShift {
    fn get_name(&self) -> &'static str {
        "shift"
    }

    fn call(
        &self,
        arguments: &[Value],
        _context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeError> {
        expect_arity(arguments, 1)?;
        match &arguments[0] {
            Value::Array(items) => {
                let items_ref = items.borrow();
                if items_ref.is_empty() {
                    return Ok(Value::Array(items.clone()));
                }
                Ok(Value::array(items_ref[1..].to_vec()))
            }
            value => Err(unsupported(value)),
        }
    }
}

/// `append(array, x, ...)`: a new array with the extra arguments at the end.
/// An empty array is returned as is and the extra arguments are dropped.
#[derive(Debug)]
pub struct NativeAppend;

impl NativeFunction for NativeAppend {
    fn get_name(&self) -> &'static str {
        "append"
    }

    fn call(
        &self,
        arguments: &[Value],
        _context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeError> {
        let Some((first, rest)) = arguments.split_first().filter(|(_, rest)| !rest.is_empty())
        else {
            return Err(RuntimeErrorKind::TooFewArguments {
                actual: arguments.len(),
                minimum: 2,
            }
            .into());
        };
        match first {
            Value::Array(items) => {
                let items_ref = items.borrow();
                if items_ref.is_empty() {
                    return Ok(Value::Array(items.clone()));
                }
                let mut appended = Vec::with_capacity(items_ref.len() + rest.len());
                appended.extend(items_ref.iter().cloned());
                appended.extend(rest.iter().cloned());
                Ok(Value::array(appended))
            }
            value => Err(unsupported(value)),
        }
    }
}

/// `log(...)`: writes the arguments separated by spaces to the output.
#[derive(Debug)]
pub struct NativeLog;

impl NativeFunction for NativeLog {
    fn get_name(&self) -> &'static str {
        "log"
    }

    fn call(
        &self,
        arguments: &[Value],
        context: &mut dyn SystemContext,
    ) -> Result<Value, RuntimeError> {
        let line = arguments
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        context.writeln(&line);
        Ok(Value::Null)
    }
}
