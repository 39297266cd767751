use std::{
    fs::{read_dir, read_to_string},
    path::Path,
};

use color_eyre::{eyre::Context, Result};
use macaque::{
    evaluate_with_context,
    interpreter::context::BufferedContext,
    parser::formatter::{BasicParserFormatter, ParserFormatter},
    parse, Environment, Value,
};

#[test]
fn test_assignment() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/assignment");
    test_engine(input_dir)
}

#[test]
fn test_builtin() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/builtin");
    test_engine(input_dir)
}

#[test]
fn test_closure() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/closure");
    test_engine(input_dir)
}

#[test]
fn test_collection() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/collection");
    test_engine(input_dir)
}

#[test]
fn test_function() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/function");
    test_engine(input_dir)
}

#[test]
fn test_if() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/if");
    test_engine(input_dir)
}

#[test]
fn test_parse_error() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/parse_error");
    test_engine(input_dir)
}

#[test]
fn test_return() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/return");
    test_engine(input_dir)
}

#[test]
fn test_while() -> Result<()> {
    let input_dir = Path::new("./test_data/interpreter/while");
    test_engine(input_dir)
}

/// A script together with everything it is expected to produce.
///
/// Expectations live next to the script in a `.expect` file. Lines starting with
/// `[line ` are parser errors, a line starting with `expect runtime error:` is the error
/// that ends the run, and every other line is logged output.
struct TestCase {
    name: String,
    source: String,
    output: String,
    parser_errors: String,
    runtime_error: String,
}

impl TestCase {
    pub fn check(&self) {
        let result = parse(&self.source);
        if !result.errors.is_empty() {
            let formatter = BasicParserFormatter::new(&self.source);
            let actual = result
                .errors
                .iter()
                .map(|error| formatter.format_error(error))
                .collect::<Vec<_>>()
                .join("\n");
            assert_eq!(
                self.parser_errors, actual,
                "Failed test {} at parsing stage.",
                self.name,
            );
            return;
        }
        assert!(
            self.parser_errors.is_empty(),
            "Test {} expected parser errors but parsed cleanly.",
            self.name,
        );

        let environment = Environment::new();
        let mut context = BufferedContext::new();
        let value = evaluate_with_context(&result.program, &environment, &mut context);
        let runtime_error = match value {
            Value::Error(error) => error.message(),
            _ => String::new(),
        };
        assert_eq!(
            self.runtime_error, runtime_error,
            "Failed test {} at runtime.",
            self.name,
        );
        let msg = context.into_data();
        assert_eq!(self.output, msg, "Failed test {} at log.", self.name);
    }
}

fn test_engine(input_dir: &Path) -> Result<()> {
    let mut succeeded = true;
    for entry in read_dir(input_dir).context("Failed to open input test data folder")? {
        let entry = entry?;
        let path = entry.path();

        let Some(extension) = path.extension() else {
            continue;
        };

        if extension != "mq" {
            continue;
        }

        println!("Parsing {path:?}");
        let test_case = parse_test_case(&path)?;
        println!("Checking {}", test_case.name);

        let res = std::panic::catch_unwind(|| {
            test_case.check();
        });
        if res.is_err() {
            println!("\tFails test case {}", test_case.name);
            succeeded = false;
        }
    }

    assert!(succeeded, "At least one interpreter test case failed.");

    Ok(())
}

fn parse_test_case(input_path: &Path) -> Result<TestCase> {
    let test_name = AsRef::<Path>::as_ref(
        input_path
            .file_name()
            .expect("File name can't be none as the path is to a real file."),
    )
    .to_string_lossy();

    let source = read_to_string(input_path).context("Failed to open input test data file")?;
    let expectations = read_to_string(input_path.with_extension("expect"))
        .context("Failed to open expectation test data file")?;

    let mut expected_outputs = Vec::new();
    let mut expected_parser_errors = Vec::new();
    let mut expected_runtime_error = String::new();

    for line in expectations.lines() {
        if line.starts_with("[line ") {
            expected_parser_errors.push(line.to_string());
        } else if let Some(message) = line.strip_prefix("expect runtime error:") {
            expected_runtime_error = message.trim().to_string();
        } else {
            expected_outputs.push(format!("{line}\n"));
        }
    }

    Ok(TestCase {
        name: test_name.into_owned(),
        source,
        output: expected_outputs.concat(),
        parser_errors: expected_parser_errors.join("\n"),
        runtime_error: expected_runtime_error,
    })
}
