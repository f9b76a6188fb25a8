//! Console I/O: printh, printh_ret, input, input_int, clear
//!
//! - `printh`: write the value's print form plus a newline
//! - `printh_ret`: return the print form as a string instead of writing it
//! - `input`: read one line from stdin
//! - `input_int`: read one line and parse it as an integer; a parse failure
//!   prints the parse error and ends the process with exit code 1
//! - `clear`: wipe the terminal (also bound as `cls`)

use crate::eval::{EvalResult, Interpreter};
use crate::position::Span;
use crate::value::{Builtin, Value};
use std::io::{BufRead, Write};

pub static BUILTINS: &[Builtin] = &[
    Builtin {
        name: "printh",
        params: &["value"],
        run: builtin_printh,
    },
    Builtin {
        name: "printh_ret",
        params: &["value"],
        run: builtin_printh_ret,
    },
    Builtin {
        name: "input",
        params: &[],
        run: builtin_input,
    },
    Builtin {
        name: "input_int",
        params: &[],
        run: builtin_input_int,
    },
    Builtin {
        name: "clear",
        params: &[],
        run: builtin_clear,
    },
];

fn builtin_printh(_interp: &mut Interpreter, args: &[Value], _span: &Span) -> EvalResult {
    println!("{}", args[0]);
    Ok(Value::Null)
}

fn builtin_printh_ret(_interp: &mut Interpreter, args: &[Value], _span: &Span) -> EvalResult {
    Ok(Value::Str(args[0].to_string()))
}

fn read_line() -> String {
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
    line.trim_end_matches('\n').trim_end_matches('\r').to_string()
}

fn builtin_input(_interp: &mut Interpreter, _args: &[Value], _span: &Span) -> EvalResult {
    Ok(Value::Str(read_line()))
}

fn builtin_input_int(_interp: &mut Interpreter, _args: &[Value], _span: &Span) -> EvalResult {
    let text = read_line();
    match text.parse::<i64>() {
        Ok(number) => Ok(Value::int(number)),
        Err(e) => {
            println!("{}", e);
            std::process::exit(1);
        }
    }
}

fn builtin_clear(_interp: &mut Interpreter, _args: &[Value], _span: &Span) -> EvalResult {
    print!("\x1B[2J\x1B[H");
    let _ = std::io::stdout().flush();
    Ok(Value::Null)
}
