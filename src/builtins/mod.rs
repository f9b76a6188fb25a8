//! # Built-in Functions
//!
//! The callables pre-bound in the global table, organized by category:
//!
//! - **[console]**: printh, printh_ret, input, input_int, clear (also bound
//!   as `cls`)
//! - **[types]**: is_number, is_string, is_list, is_function
//! - **[lists]**: append, pop, entend, len
//! - **[script]**: run
//!
//! Each built-in is a static table entry pairing a name and fixed parameter
//! list with a native function; the evaluator's call protocol does the
//! argument-count checking, so user functions and built-ins fail the same
//! way.

use crate::eval::{EvalResult, Interpreter};
use crate::position::Span;
use crate::scope::{ScopeId, Scopes};
use crate::value::{Builtin, Value};

/// The signature every native operation implements.
pub type NativeFn = fn(&mut Interpreter, &[Value], &Span) -> EvalResult;

pub mod console;
pub mod lists;
pub mod script;
pub mod types;

/// Bind every built-in into the given (global) table. `clear` doubles as
/// `cls`.
pub fn register(scopes: &mut Scopes, globals: ScopeId) {
    let categories: &[&[Builtin]] = &[
        console::BUILTINS,
        types::BUILTINS,
        lists::BUILTINS,
        script::BUILTINS,
    ];

    for builtin in categories.iter().copied().flatten() {
        scopes.set(globals, builtin.name.to_string(), Value::Builtin(builtin));
    }

    if let Some(clear) = console::BUILTINS.iter().find(|b| b.name == "clear") {
        scopes.set(globals, "cls".to_string(), Value::Builtin(clear));
    }
}
