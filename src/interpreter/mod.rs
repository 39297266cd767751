pub mod context;
mod tree;

pub use tree::{TreeWalkInterpreter, TreeWalkStatementInterpreter};

/// Where the program's observable output (the `log` built-in) goes.
pub trait SystemContext {
    fn writeln(&mut self, text: &str);
}
