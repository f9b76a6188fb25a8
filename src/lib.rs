// ABOUTME: Library crate exposing the interpreter pipeline

pub mod ast;
pub mod builtins;
pub mod config;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod scope;
pub mod token;
pub mod value;

use error::Diagnostic;
use eval::Interpreter;
use lexer::Lexer;
use parser::Parser;
use value::Value;

/// The whole pipeline for one compilation unit: source text to tokens to
/// syntax tree to evaluation in a fresh top-level context. The result is
/// the list of the program's statement values. This is the entry the CLI
/// uses and the one `run(...)` and `include(...)` re-enter from inside the
/// language.
pub fn run(file_name: &str, text: &str) -> Result<Value, Diagnostic> {
    let tokens = Lexer::new(file_name, text).tokenize()?;
    let ast = Parser::new(tokens).parse()?;
    Interpreter::new().run_program(&ast)
}
