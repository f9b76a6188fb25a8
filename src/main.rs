// ABOUTME: CLI driver for the Hustle interpreter

use clap::{Parser, Subcommand};
use colored::Colorize;
use hustle::value::Value;
use hustle::{config, run};
use std::path::PathBuf;
use std::process::ExitCode;

/// The Hustle language interpreter
#[derive(Parser, Debug)]
#[command(name = "hustle")]
#[command(version)]
#[command(about = "Interpreter for the Hustle scripting language")]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interpret the program at the given path
    Run {
        file: Option<PathBuf>,
        /// Arguments forwarded to the script, readable via `Argv`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        script_args: Vec<String>,
    },
    /// Compile the program (the native backend is still in progress)
    Com {
        /// Run the compiled output after building it
        #[arg(short = 'r')]
        run_after: bool,
        file: Option<PathBuf>,
    },
    /// Print the help screen
    Help,
}

fn usage(colored: bool) {
    if colored {
        println!("{}", config::USAGE.white());
    } else {
        println!("{}", config::USAGE);
    }
}

fn fail(message: &str) -> ExitCode {
    let line = format!("ERROR: {}", message);
    println!("{}", line.as_str().red());
    usage(true);
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == clap::error::ErrorKind::DisplayHelp
            || e.kind() == clap::error::ErrorKind::DisplayVersion =>
        {
            e.print().ok();
            return ExitCode::SUCCESS;
        }
        Err(e) if e.kind() == clap::error::ErrorKind::InvalidSubcommand => {
            return fail("Unknown subcommand");
        }
        Err(_) => {
            return fail("No subcommand provided");
        }
    };

    match cli.command {
        None => fail("No subcommand provided"),
        Some(Command::Help) => {
            usage(false);
            ExitCode::SUCCESS
        }
        Some(Command::Com { file, run_after }) => match file {
            Some(file) => {
                let mode = if run_after { "compile-and-run" } else { "compile" };
                println!(
                    "[INFO] {} mode is still in progress; use `hustle run {}` to interpret it",
                    mode,
                    file.display()
                );
                ExitCode::SUCCESS
            }
            None => fail("No file provided"),
        },
        Some(Command::Run { file: None, .. }) => fail("No file provided"),
        Some(Command::Run { file: Some(file), .. }) => run_file(&file),
    }
}

/// Evaluate the file through the same `run(...)` built-in a program would
/// use, so nested script loading and the CLI share one code path.
fn run_file(file: &PathBuf) -> ExitCode {
    let text = format!("run(\"{}\")", file.display());

    match run("<stdin>", &text) {
        Err(diagnostic) => {
            println!("{}", diagnostic);
            ExitCode::FAILURE
        }
        Ok(result) => {
            print_result(&result);
            ExitCode::SUCCESS
        }
    }
}

/// A single-element result prints as its repr, except the pure-null result
/// of a normal run, which stays silent.
fn print_result(result: &Value) {
    match result {
        Value::List(items) => {
            let items = items.borrow();
            if items.len() == 1 {
                if !matches!(items[0], Value::Null) {
                    println!("{}", items[0].repr());
                }
            } else {
                drop(items);
                println!("{}", result.repr());
            }
        }
        other => println!("{}", other.repr()),
    }
}
