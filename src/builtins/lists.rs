//! List operations: append, pop, entend, len
//!
//! `append` and `entend` mutate the shared container in place and return
//! null; every other handle to the list observes the change. The `entend`
//! spelling is part of the language surface.

use crate::eval::{EvalResult, Interpreter};
use crate::position::Span;
use crate::value::{Builtin, Number, Value, REMOVE_INDEX_MSG};
use std::rc::Rc;

pub static BUILTINS: &[Builtin] = &[
    Builtin {
        name: "append",
        params: &["list", "value"],
        run: builtin_append,
    },
    Builtin {
        name: "pop",
        params: &["list", "index"],
        run: builtin_pop,
    },
    Builtin {
        name: "entend",
        params: &["listA", "listB"],
        run: builtin_extend,
    },
    Builtin {
        name: "len",
        params: &["list"],
        run: builtin_len,
    },
];

fn builtin_append(interp: &mut Interpreter, args: &[Value], span: &Span) -> EvalResult {
    let items = match &args[0] {
        Value::List(items) => items,
        _ => return Err(interp.runtime_err(span, "First argument must be list")),
    };

    items.borrow_mut().push(args[1].clone());
    Ok(Value::Null)
}

fn builtin_pop(interp: &mut Interpreter, args: &[Value], span: &Span) -> EvalResult {
    let items = match &args[0] {
        Value::List(items) => items,
        _ => return Err(interp.runtime_err(span, "First argument must be list")),
    };
    let index = match &args[1] {
        Value::Number(n) => *n,
        _ => return Err(interp.runtime_err(span, "Second argument must be number")),
    };

    let len = items.borrow().len() as i64;
    let idx = match index {
        Number::Int(v) if v < 0 => v + len,
        Number::Int(v) => v,
        // A fractional index can never address an element.
        Number::Float(_) => return Err(interp.runtime_err(span, REMOVE_INDEX_MSG)),
    };
    if !(0..len).contains(&idx) {
        return Err(interp.runtime_err(span, REMOVE_INDEX_MSG));
    }

    Ok(items.borrow_mut().remove(idx as usize))
}

fn builtin_extend(interp: &mut Interpreter, args: &[Value], span: &Span) -> EvalResult {
    let target = match &args[0] {
        Value::List(items) => items,
        _ => return Err(interp.runtime_err(span, "First argument must be list")),
    };
    let source = match &args[1] {
        Value::List(items) => items,
        _ => return Err(interp.runtime_err(span, "Second argument must be list")),
    };

    if Rc::ptr_eq(target, source) {
        let snapshot = target.borrow().clone();
        target.borrow_mut().extend(snapshot);
    } else {
        target.borrow_mut().extend(source.borrow().iter().cloned());
    }
    Ok(Value::Null)
}

fn builtin_len(interp: &mut Interpreter, args: &[Value], span: &Span) -> EvalResult {
    match &args[0] {
        Value::List(items) => Ok(Value::int(items.borrow().len() as i64)),
        _ => Err(interp.runtime_err(span, "Argument must be list")),
    }
}
