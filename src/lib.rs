pub mod environment;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod value;

pub use environment::Environment;
pub use parser::{parse, ParseResult, Program};
pub use value::Value;

use interpreter::{context::StdioContext, SystemContext, TreeWalkInterpreter};

/// Evaluates a program against an environment, sending `log` output to standard error.
///
/// Runtime failures come back as [`Value::Error`]. Bindings made by the program stay in
/// `environment`.
pub fn evaluate(program: &Program, environment: &Environment) -> Value {
    evaluate_with_context(program, environment, StdioContext)
}

pub fn evaluate_with_context<C>(program: &Program, environment: &Environment, context: C) -> Value
where
    C: SystemContext,
{
    let mut interpreter = TreeWalkInterpreter::new(environment.clone(), context);
    interpreter.evaluate_program(program)
}
