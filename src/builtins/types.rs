//! Type predicates: is_number, is_string, is_list, is_function
//!
//! Each returns the `true`/`false` number (1 or 0). `is_function` is true
//! for user functions and built-ins alike.

use crate::eval::{EvalResult, Interpreter};
use crate::position::Span;
use crate::value::{Builtin, Value};

pub static BUILTINS: &[Builtin] = &[
    Builtin {
        name: "is_number",
        params: &["value"],
        run: builtin_is_number,
    },
    Builtin {
        name: "is_string",
        params: &["value"],
        run: builtin_is_string,
    },
    Builtin {
        name: "is_list",
        params: &["value"],
        run: builtin_is_list,
    },
    Builtin {
        name: "is_function",
        params: &["value"],
        run: builtin_is_function,
    },
];

fn builtin_is_number(_interp: &mut Interpreter, args: &[Value], _span: &Span) -> EvalResult {
    Ok(Value::bool(matches!(args[0], Value::Number(_))))
}

fn builtin_is_string(_interp: &mut Interpreter, args: &[Value], _span: &Span) -> EvalResult {
    Ok(Value::bool(matches!(args[0], Value::Str(_))))
}

fn builtin_is_list(_interp: &mut Interpreter, args: &[Value], _span: &Span) -> EvalResult {
    Ok(Value::bool(matches!(args[0], Value::List(_))))
}

fn builtin_is_function(_interp: &mut Interpreter, args: &[Value], _span: &Span) -> EvalResult {
    Ok(Value::bool(matches!(
        args[0],
        Value::Function(_) | Value::Builtin(_)
    )))
}
