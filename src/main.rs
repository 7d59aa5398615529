use std::fs;
use std::io;
use std::io::Write;

use clap::{arg, crate_name, crate_version, Command as App};
use log::{debug, warn};

#[macro_use]
mod engine;
mod command;

use command::*;
use engine::diagnostics::*;
use engine::lexer::*;

const DEFAULT_FILE_PATH: &str = "code.txt";

enum Mode {
    Interpret,
    DebugLexer,
    DebugParser,
}

struct Config {
    file_path: String,
    mode: Mode,
}

impl Config {
    fn from_args() -> Self {
        let matches = App::new(crate_name!())
            .version(crate_version!())
            .about("Explores rewrite rules and proves expressions equal by rewriting")
            .arg(arg!([file] "Program to interpret").default_value(DEFAULT_FILE_PATH))
            .arg(arg!(--debug <mode> "Dump the tokens or the statements of every line instead of running them")
                .value_parser(["lexer", "parser"]))
            .get_matches();

        let file_path = matches
            .get_one::<String>("file")
            .cloned()
            .unwrap_or_else(|| DEFAULT_FILE_PATH.to_string());
        let mode = match matches.get_one::<String>("debug").map(String::as_str) {
            Some("lexer") => Mode::DebugLexer,
            Some("parser") => Mode::DebugParser,
            _ => Mode::Interpret,
        };

        Self { file_path, mode }
    }
}

/// A missing or unreadable program is treated as an empty one.
fn read_source(file_path: &str) -> String {
    match fs::read_to_string(file_path) {
        Ok(source) => source,
        Err(err) => {
            warn!("could not read {}: {}; nothing to do", file_path, err);
            String::new()
        }
    }
}

fn interpret_file(file_path: &str) {
    let source = read_source(file_path);
    let mut context = Context::new();
    let mut diag = StderrDiagnoster {};
    let stdout = io::stdout();
    let mut sink = stdout.lock();

    for (i, line) in source.lines().enumerate() {
        match context.process_line(line, Some(file_path.to_string()), i + 1, &mut sink) {
            Ok(()) => {}
            Err(Error::Syntax(err)) => {
                err.report(&mut diag);
                std::process::exit(1);
            }
            Err(err @ Error::Io(_)) => {
                eprintln!("ERROR: {}", err);
                std::process::exit(1);
            }
        }
    }
    debug!("{} rule(s) defined in {}", context.rules().len(), file_path);
}

fn start_lexer_debugger(file_path: &str) -> io::Result<()> {
    let source = read_source(file_path);
    let mut sink = io::stdout().lock();
    for (i, line) in source.lines().enumerate() {
        for token in Lexer::new(line.chars(), Some(file_path.to_string()), i + 1) {
            writeln!(sink, "{}: {}", token.loc, token.report())?;
        }
    }
    Ok(())
}

fn start_parser_debugger(file_path: &str) -> io::Result<()> {
    let source = read_source(file_path);
    let mut diag = StderrDiagnoster {};
    let mut sink = io::stdout().lock();
    for (i, line) in source.lines().enumerate() {
        let mut lexer = Lexer::new(line.chars(), Some(file_path.to_string()), i + 1);
        match Command::parse(&mut lexer) {
            Ok(Some(command)) => writeln!(sink, "{}", command)?,
            Ok(None) => {}
            Err(err) => err.report(&mut diag),
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::from_args();

    let result = match config.mode {
        Mode::Interpret => {
            interpret_file(&config.file_path);
            Ok(())
        }
        Mode::DebugLexer => start_lexer_debugger(&config.file_path),
        Mode::DebugParser => start_parser_debugger(&config.file_path),
    };

    if let Err(err) = result {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
