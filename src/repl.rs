use crate::environment::Environment;
use crate::interpreter::{context::StdioContext, SystemContext, TreeWalkInterpreter};
use crate::parser::{
    formatter::{BasicParserFormatter, ParserFormatter},
    parse, ParserError,
};
use crate::value::Value;
use rustyline::{error::ReadlineError, DefaultEditor};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that end an interactive session.
#[derive(Debug, Error)]
pub enum ReplError {
    #[error("Readline error: {source}")]
    Readline {
        #[from]
        source: ReadlineError,
    },
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ReplConfig {
    pub prompt: String,
    /// Where to load and save line history. No history is kept when unset.
    pub history_file: Option<PathBuf>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: ">> ".into(),
            history_file: None,
        }
    }
}

/// What became of one line of input.
#[derive(Debug)]
pub enum LineOutcome {
    Empty,
    ParseErrors(Vec<ParserError>),
    Value(Value),
}

/// Evaluation state that persists between lines: bindings made on one line are visible
/// on the next.
pub struct Session<C: SystemContext> {
    interpreter: TreeWalkInterpreter<C>,
}

impl<C> Session<C>
where
    C: SystemContext,
{
    pub fn new(context: C) -> Self {
        Self {
            interpreter: TreeWalkInterpreter::new(Environment::new(), context),
        }
    }

    pub fn get_environment(&self) -> &Environment {
        self.interpreter.get_environment()
    }

    pub fn get_context(&self) -> &C {
        self.interpreter.get_context()
    }

    /// Parses and runs a line. Lines with parse errors are not evaluated at all.
    pub fn evaluate_line(&mut self, line: &str) -> LineOutcome {
        if line.trim().is_empty() {
            return LineOutcome::Empty;
        }
        let result = parse(line);
        if !result.is_ok() {
            return LineOutcome::ParseErrors(result.errors);
        }
        LineOutcome::Value(self.interpreter.evaluate_program(&result.program))
    }
}

pub struct Repl {
    editor: DefaultEditor,
    session: Session<StdioContext>,
    config: ReplConfig,
}

impl Repl {
    pub fn new(config: ReplConfig) -> Result<Self, ReplError> {
        let mut editor = DefaultEditor::new()?;
        if let Some(ref history_file) = config.history_file {
            // A missing history file just means this is the first session.
            let _ = editor.load_history(history_file);
        }
        Ok(Self {
            editor,
            session: Session::new(StdioContext),
            config,
        })
    }

    pub fn run(&mut self) -> Result<(), ReplError> {
        loop {
            match self.editor.readline(&self.config.prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = self.editor.add_history_entry(line.as_str());
                    }
                    self.display(&line);
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(error) => return Err(error.into()),
            }
        }
        self.save_history()
    }

    fn display(&mut self, line: &str) {
        match self.session.evaluate_line(line) {
            LineOutcome::Empty => {}
            LineOutcome::ParseErrors(errors) => {
                let formatter = BasicParserFormatter::new(line);
                for error in errors.iter() {
                    println!("{}", formatter.format_error(error));
                }
            }
            LineOutcome::Value(value) if value.is_null() => {}
            LineOutcome::Value(value) => println!("{value}"),
        }
    }

    fn save_history(&mut self) -> Result<(), ReplError> {
        if let Some(ref history_file) = self.config.history_file {
            self.editor.save_history(history_file)?;
        }
        Ok(())
    }
}

/// Runs an interactive session until end of input.
pub fn run_repl(config: ReplConfig) -> Result<(), ReplError> {
    let mut repl = Repl::new(config)?;
    repl.run()
}
