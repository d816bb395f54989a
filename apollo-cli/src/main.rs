use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use apollo_core::error::ApolloError;
use apollo_core::token::TokenType;
use apollo_core::{lexer, parser::Parser, Interpreter};
use clap::Parser as ClapParser;
use log::debug;

/// A tree-walking interpreter for the Apollo scripting language.
#[derive(ClapParser, Debug)]
#[command(name = "apollo", version, about)]
struct Cli {
    /// Script to run. Starts a REPL when omitted.
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.script {
        Some(path) => run_file(&path),
        Option::None => {
            repl();
            ExitCode::SUCCESS
        }
    }
}

fn run_file(path: &PathBuf) -> ExitCode {
    debug!("running script {}", path.display());
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("apollo: could not read '{}': {}", path.display(), err);
            return ExitCode::from(2);
        }
    };

    match execute(&source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::from(70)
        }
    }
}

fn repl() {
    debug!("starting REPL");
    let stdin = std::io::stdin();
    loop {
        print!("apollo> ");
        std::io::stdout().flush().ok();

        let mut line = String::new();
        let bytes_read = stdin.read_line(&mut line).unwrap_or(0);
        if bytes_read == 0 || line.trim().is_empty() {
            break;
        }

        if let Err(err) = execute(&line) {
            report(&err);
        }
    }
}

fn execute(source: &str) -> Result<(), ApolloError> {
    let tokens = lexer::scan(source)?;
    let program = Parser::new(tokens).parse()?;
    Interpreter::new().run(&program)
}

fn report(err: &ApolloError) {
    match err.token() {
        Some(token) if token.kind == TokenType::Eof => {
            eprintln!("[line {}] Error at end: {}", token.line, err);
        }
        Some(token) => {
            eprintln!(
                "[line {}] Error at {:?} {}: {}",
                token.line,
                token.kind,
                token.lexeme_str(),
                err
            );
        }
        Option::None => {
            eprintln!("[line {}] Error: {}", err.line(), err);
        }
    }
}
