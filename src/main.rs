use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use std::path::PathBuf;
use std::{fs::read_to_string, process::ExitCode};

const EXIT_PARSE_ERROR: u8 = 65;
const EXIT_RUNTIME_ERROR: u8 = 70;

#[derive(Debug, Parser)]
#[clap(name = "macaque", version)]
pub struct CLArgs {
    #[clap(subcommand)]
    pub routine: Option<MacaqueCommand>,
}

#[derive(Debug, Subcommand)]
pub enum MacaqueCommand {
    Tokenize {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: TokenFormat,
    },
    Parse {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "source")]
        format: ProgramFormat,
    },
    Run {
        path: PathBuf,
    },
    Repl {
        #[clap(long = "prompt", default_value = ">> ")]
        prompt: String,
        #[clap(long = "history")]
        history: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum TokenFormat {
    Debug,
    Basic,
    Line,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ProgramFormat {
    Debug,
    Source,
    #[clap(name = "sexpr")]
    SExpr,
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    init_tracing();
    let args = CLArgs::parse();
    match args.routine {
        Some(MacaqueCommand::Tokenize { path, format }) => {
            tracing::info!(?path, "tokenizing");
            let src = read_to_string(path)?;
            tokenize(&src, &format);
        }
        Some(MacaqueCommand::Parse { path, format }) => {
            tracing::info!(?path, "parsing");
            let src = read_to_string(&path)?;
            if !parse(&src, &path, &format) {
                return Ok(ExitCode::from(EXIT_PARSE_ERROR));
            }
        }
        Some(MacaqueCommand::Run { path }) => {
            tracing::info!(?path, "running");
            let src = read_to_string(&path)?;
            return Ok(run(&src, &path));
        }
        Some(MacaqueCommand::Repl { prompt, history }) => {
            macaque::repl::run_repl(macaque::repl::ReplConfig {
                prompt,
                history_file: history,
            })?;
        }
        None => macaque::repl::run_repl(macaque::repl::ReplConfig::default())?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Installs a stderr subscriber filtered by `RUST_LOG`, showing warnings by default.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .init();
}

fn tokenize(src: &str, format: &TokenFormat) {
    use macaque::lexer::formatter::{
        BasicFormatter, DebugFormatter, LineFormatter, ToFormatter, TokenFormatter,
    };
    use macaque::lexer::Lexer;

    let lexer = Lexer::new(src);
    let formatter: Box<dyn TokenFormatter + '_> = match format {
        TokenFormat::Debug => Box::new(ToFormatter::<DebugFormatter>::create_formatter(&lexer)),
        TokenFormat::Basic => Box::new(ToFormatter::<BasicFormatter>::create_formatter(&lexer)),
        TokenFormat::Line => Box::new(ToFormatter::<LineFormatter>::create_formatter(&lexer)),
    };
    for token in lexer {
        println!("{}", formatter.format(&token));
    }
}

fn report_parse_errors(src: &str, path: &std::path::Path, errors: &[macaque::parser::ParserError]) {
    use macaque::parser::formatter::{ParserFormatter, PrettyParserFormatter};

    let path = path.to_string_lossy();
    let formatter = PrettyParserFormatter::new(src, &path);
    for error in errors {
        eprint!("{}", formatter.format_error(error));
    }
}

fn parse(src: &str, path: &std::path::Path, format: &ProgramFormat) -> bool {
    use macaque::parser::formatter::{
        DebugFormatter, ProgramFormatter, SExpressionFormatter, SourceFormatter,
    };

    let result = macaque::parse(src);
    if !result.is_ok() {
        report_parse_errors(src, path, &result.errors);
        return false;
    }
    let formatter: Box<dyn ProgramFormatter> = match format {
        ProgramFormat::Debug => Box::new(DebugFormatter),
        ProgramFormat::Source => Box::new(SourceFormatter),
        ProgramFormat::SExpr => Box::new(SExpressionFormatter),
    };
    println!("{}", formatter.format(&result.program));
    true
}

/// Runs a script file. The script's only output is what it logs.
fn run(src: &str, path: &std::path::Path) -> ExitCode {
    let result = macaque::parse(src);
    if !result.is_ok() {
        report_parse_errors(src, path, &result.errors);
        return ExitCode::from(EXIT_PARSE_ERROR);
    }
    let environment = macaque::Environment::new();
    match macaque::evaluate(&result.program, &environment) {
        macaque::Value::Error(error) => {
            tracing::debug!(code = error.code(), "script failed");
            eprintln!("ERROR: {error}");
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
        _ => ExitCode::SUCCESS,
    }
}
