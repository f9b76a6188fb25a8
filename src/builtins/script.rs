//! Script loading: run
//!
//! `run(fn)` reads the named file and evaluates it in a fresh top-level
//! context. The file's own output is all it leaves behind; `run` returns
//! null. Failures to read or to finish the script surface as runtime
//! errors in the calling program.

use crate::eval::{EvalResult, Interpreter};
use crate::position::Span;
use crate::value::{Builtin, Value};

pub static BUILTINS: &[Builtin] = &[Builtin {
    name: "run",
    params: &["fn"],
    run: builtin_run,
}];

fn builtin_run(interp: &mut Interpreter, args: &[Value], span: &Span) -> EvalResult {
    let file_name = match &args[0] {
        Value::Str(s) => s.clone(),
        _ => return Err(interp.runtime_err(span, "Argument must be string")),
    };

    let script = std::fs::read_to_string(&file_name).map_err(|e| {
        interp.runtime_err(
            span,
            format!("Failed to load script \"{}\"\n{}", file_name, e),
        )
    })?;

    crate::run(&file_name, &script).map_err(|e| {
        interp.runtime_err(
            span,
            format!("Failed to finish executing script \"{}\"\n{}", file_name, e),
        )
    })?;

    Ok(Value::Null)
}
