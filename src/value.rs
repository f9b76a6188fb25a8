// ABOUTME: Runtime values and the binary/unary operator dispatch

use crate::ast::{BinOp, Node, UnaryOp};
use crate::scope::ScopeId;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A number carries either an integer or a float. Arithmetic keeps the
/// integer tag when both operands are integers and the result is exact;
/// division always produces a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(v) => v == 0,
            Number::Float(v) => v == 0.0,
        }
    }

    pub fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_add(b)
                .map(Number::Int)
                .unwrap_or(Number::Float(a as f64 + b as f64)),
            _ => Number::Float(self.as_f64() + other.as_f64()),
        }
    }

    pub fn sub(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_sub(b)
                .map(Number::Int)
                .unwrap_or(Number::Float(a as f64 - b as f64)),
            _ => Number::Float(self.as_f64() - other.as_f64()),
        }
    }

    pub fn mul(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_mul(b)
                .map(Number::Int)
                .unwrap_or(Number::Float(a as f64 * b as f64)),
            _ => Number::Float(self.as_f64() * other.as_f64()),
        }
    }

    /// Division always yields a float; the caller rejects zero divisors.
    pub fn div(self, other: Number) -> Number {
        Number::Float(self.as_f64() / other.as_f64())
    }

    /// Remainder with the divisor's sign, both for ints and floats.
    pub fn modulo(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => {
                let r = a % b;
                if r != 0 && (r < 0) != (b < 0) {
                    Number::Int(r + b)
                } else {
                    Number::Int(r)
                }
            }
            _ => {
                let (a, b) = (self.as_f64(), other.as_f64());
                let r = a % b;
                if r != 0.0 && (r < 0.0) != (b < 0.0) {
                    Number::Float(r + b)
                } else {
                    Number::Float(r)
                }
            }
        }
    }

    pub fn pow(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) if b >= 0 => u32::try_from(b)
                .ok()
                .and_then(|e| a.checked_pow(e))
                .map(Number::Int)
                .unwrap_or_else(|| Number::Float((a as f64).powf(b as f64))),
            _ => Number::Float(self.as_f64().powf(other.as_f64())),
        }
    }

    pub fn eq(self, other: Number) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }

    pub fn lt(self, other: Number) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a < b,
            _ => self.as_f64() < other.as_f64(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{}", v),
            Number::Float(v) => {
                // Whole floats keep their decimal point so the two tags
                // stay distinguishable in output.
                if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
                    write!(f, "{:.1}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
        }
    }
}

/// A user-defined function: body, parameter names, and the scope it was
/// defined in (closures are lexical).
#[derive(Debug)]
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Rc<Node>,
    pub auto_return: bool,
    pub scope: ScopeId,
}

impl Function {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}

/// A built-in function: a fixed parameter list (which drives argument-count
/// checking exactly like user functions) and a native operation.
pub struct Builtin {
    pub name: &'static str,
    pub params: &'static [&'static str],
    pub run: crate::builtins::NativeFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    /// The distinguished "no value" marker. Prints as a single newline for
    /// compatibility with existing programs.
    Null,
    Number(Number),
    Str(String),
    /// Lists are shared: assignment aliases the container, and mutation is
    /// visible through every handle.
    List(Rc<RefCell<Vec<Value>>>),
    Function(Rc<Function>),
    Builtin(&'static Builtin),
}

impl Value {
    pub fn int(v: i64) -> Value {
        Value::Number(Number::Int(v))
    }

    pub fn float(v: f64) -> Value {
        Value::Number(Number::Float(v))
    }

    pub fn list(elements: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(elements)))
    }

    pub fn bool(v: bool) -> Value {
        Value::int(if v { 1 } else { 0 })
    }

    pub fn is_true(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Number(n) => !n.is_zero(),
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Function(_) | Value::Builtin(_) => true,
        }
    }

    /// The repr form: like the print form except strings are quoted and
    /// list elements are shown quoted too.
    pub fn repr(&self) -> String {
        match self {
            Value::Str(s) => format!("\"{}\"", s),
            Value::List(items) => {
                let parts: Vec<String> = items.borrow().iter().map(|v| v.repr()).collect();
                format!("[{}]", parts.join(", "))
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "\n"),
            Value::Number(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                let parts: Vec<String> = items.borrow().iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
            Value::Function(func) => write!(f, "<function {}>", func.display_name()),
            Value::Builtin(b) => write!(f, "<built-in function {}>", b.name),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Number(a), Value::Number(b)) => Number::eq(*a, *b),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }
}

/// What went wrong in an operator; the evaluator attaches spans and builds
/// the diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpError {
    /// Spans left start to right end.
    Illegal,
    /// Spans the right operand.
    DivisionByZero,
    /// Spans the right operand (list `-` with a bad index).
    RemoveIndex,
    /// Spans the right operand (list `/` with a bad index).
    RetrieveIndex,
}

pub const REMOVE_INDEX_MSG: &str =
    "Element at this index could not be removed from list because index is out of bounds";
pub const RETRIEVE_INDEX_MSG: &str =
    "Element at this index could not be retrieved from list because index is out of bounds";

/// Resolve a possibly-negative index against `len` the way the language
/// counts: `-1` is the last element.
fn resolve_index(index: Number, len: usize) -> Option<usize> {
    let idx = match index {
        Number::Int(v) => v,
        Number::Float(_) => return None,
    };
    let len = len as i64;
    let idx = if idx < 0 { idx + len } else { idx };
    if (0..len).contains(&idx) {
        Some(idx as usize)
    } else {
        None
    }
}

fn extend_shared(target: &Rc<RefCell<Vec<Value>>>, source: &Rc<RefCell<Vec<Value>>>) {
    if Rc::ptr_eq(target, source) {
        let snapshot = target.borrow().clone();
        target.borrow_mut().extend(snapshot);
    } else {
        target.borrow_mut().extend(source.borrow().iter().cloned());
    }
}

/// All binary operators in one match over `(op, left, right)`.
pub fn binary_op(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, OpError> {
    use BinOp::*;

    match (op, lhs, rhs) {
        // numbers
        (Add, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.add(*b))),
        (Sub, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.sub(*b))),
        (Mul, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.mul(*b))),
        (Div, Value::Number(a), Value::Number(b)) => {
            if b.is_zero() {
                Err(OpError::DivisionByZero)
            } else {
                Ok(Value::Number(a.div(*b)))
            }
        }
        (Mod, Value::Number(a), Value::Number(b)) => {
            if b.is_zero() {
                Err(OpError::DivisionByZero)
            } else {
                Ok(Value::Number(a.modulo(*b)))
            }
        }
        (Pow, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.pow(*b))),
        (Eq, Value::Number(a), Value::Number(b)) => Ok(Value::bool(Number::eq(*a, *b))),
        (Ne, Value::Number(a), Value::Number(b)) => Ok(Value::bool(!Number::eq(*a, *b))),
        (Lt, Value::Number(a), Value::Number(b)) => Ok(Value::bool(a.lt(*b))),
        (Gt, Value::Number(a), Value::Number(b)) => Ok(Value::bool(b.lt(*a))),
        (Lte, Value::Number(a), Value::Number(b)) => Ok(Value::bool(!b.lt(*a))),
        (Gte, Value::Number(a), Value::Number(b)) => Ok(Value::bool(!a.lt(*b))),
        // Logical operators combine truthiness; both sides are already
        // evaluated by the time we get here (no short-circuit).
        (And, Value::Number(_), Value::Number(_)) => {
            Ok(Value::bool(lhs.is_true() && rhs.is_true()))
        }
        (Or, Value::Number(_), Value::Number(_)) => {
            Ok(Value::bool(lhs.is_true() || rhs.is_true()))
        }

        // strings
        (Add, Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
        (Mul, Value::Str(s), Value::Number(Number::Int(n))) => {
            Ok(Value::Str(s.repeat((*n).max(0) as usize)))
        }
        (Eq, Value::Str(a), Value::Str(b)) => Ok(Value::bool(a == b)),

        // lists: `+` appends, `-` removes by index, `*` and `%` extend,
        // `/` indexes. All mutations go through the shared container.
        (Add, Value::List(items), other) => {
            items.borrow_mut().push(other.clone());
            Ok(Value::List(Rc::clone(items)))
        }
        (Sub, Value::List(items), Value::Number(index)) => {
            let resolved = resolve_index(*index, items.borrow().len());
            match resolved {
                Some(i) => {
                    items.borrow_mut().remove(i);
                    Ok(Value::List(Rc::clone(items)))
                }
                None => Err(OpError::RemoveIndex),
            }
        }
        (Mul, Value::List(a), Value::List(b)) | (Mod, Value::List(a), Value::List(b)) => {
            extend_shared(a, b);
            Ok(Value::List(Rc::clone(a)))
        }
        (Div, Value::List(items), Value::Number(index)) => {
            let resolved = resolve_index(*index, items.borrow().len());
            match resolved {
                Some(i) => Ok(items.borrow()[i].clone()),
                None => Err(OpError::RetrieveIndex),
            }
        }

        _ => Err(OpError::Illegal),
    }
}

pub fn unary_op(op: UnaryOp, value: &Value) -> Result<Value, OpError> {
    match (op, value) {
        (UnaryOp::Pos, _) => Ok(value.clone()),
        // Negation is multiplication by -1, so it also empties a string.
        (UnaryOp::Neg, _) => binary_op(BinOp::Mul, value, &Value::int(-1)),
        (UnaryOp::Not, Value::Number(n)) => Ok(Value::bool(n.is_zero())),
        (UnaryOp::Not, _) => Err(OpError::Illegal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_arithmetic_keeps_tag() {
        assert_eq!(
            binary_op(BinOp::Add, &Value::int(1), &Value::int(2)),
            Ok(Value::int(3))
        );
        assert_eq!(
            binary_op(BinOp::Mul, &Value::int(4), &Value::int(5)),
            Ok(Value::int(20))
        );
        assert_eq!(
            binary_op(BinOp::Pow, &Value::int(2), &Value::int(10)),
            Ok(Value::int(1024))
        );
    }

    #[test]
    fn test_mixed_arithmetic_coerces_to_float() {
        assert_eq!(
            binary_op(BinOp::Add, &Value::int(1), &Value::float(0.5)),
            Ok(Value::float(1.5))
        );
    }

    #[test]
    fn test_division_always_floats() {
        assert_eq!(
            binary_op(BinOp::Div, &Value::int(6), &Value::int(2)),
            Ok(Value::float(3.0))
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            binary_op(BinOp::Div, &Value::int(1), &Value::int(0)),
            Err(OpError::DivisionByZero)
        );
        assert_eq!(
            binary_op(BinOp::Mod, &Value::int(1), &Value::int(0)),
            Err(OpError::DivisionByZero)
        );
    }

    #[test]
    fn test_modulo_sign_follows_divisor() {
        assert_eq!(
            binary_op(BinOp::Mod, &Value::int(-7), &Value::int(3)),
            Ok(Value::int(2))
        );
        assert_eq!(
            binary_op(BinOp::Mod, &Value::int(7), &Value::int(-3)),
            Ok(Value::int(-2))
        );
    }

    #[test]
    fn test_comparisons_yield_zero_or_one() {
        assert_eq!(
            binary_op(BinOp::Lt, &Value::int(1), &Value::int(2)),
            Ok(Value::int(1))
        );
        assert_eq!(
            binary_op(BinOp::Gte, &Value::int(1), &Value::int(2)),
            Ok(Value::int(0))
        );
        assert_eq!(
            binary_op(BinOp::Eq, &Value::int(1), &Value::float(1.0)),
            Ok(Value::int(1))
        );
    }

    #[test]
    fn test_string_operations() {
        assert_eq!(
            binary_op(BinOp::Add, &Value::Str("ab".into()), &Value::Str("cd".into())),
            Ok(Value::Str("abcd".into()))
        );
        assert_eq!(
            binary_op(BinOp::Mul, &Value::Str("ab".into()), &Value::int(3)),
            Ok(Value::Str("ababab".into()))
        );
        assert_eq!(
            binary_op(BinOp::Eq, &Value::Str("x".into()), &Value::Str("x".into())),
            Ok(Value::int(1))
        );
        // Subtraction of strings has no rule.
        assert_eq!(
            binary_op(BinOp::Sub, &Value::Str("a".into()), &Value::Str("b".into())),
            Err(OpError::Illegal)
        );
    }

    #[test]
    fn test_negating_a_string_empties_it() {
        assert_eq!(
            unary_op(UnaryOp::Neg, &Value::Str("abc".into())),
            Ok(Value::Str(String::new()))
        );
    }

    #[test]
    fn test_list_append_is_shared() {
        let list = Value::list(vec![Value::int(1)]);
        let result = binary_op(BinOp::Add, &list, &Value::int(2)).unwrap();
        // The original handle sees the appended element.
        match (&list, &result) {
            (Value::List(a), Value::List(b)) => {
                assert!(Rc::ptr_eq(a, b));
                assert_eq!(a.borrow().len(), 2);
            }
            _ => panic!("expected lists"),
        }
    }

    #[test]
    fn test_list_indexing() {
        let list = Value::list(vec![Value::int(10), Value::int(20)]);
        assert_eq!(
            binary_op(BinOp::Div, &list, &Value::int(1)),
            Ok(Value::int(20))
        );
        assert_eq!(
            binary_op(BinOp::Div, &list, &Value::int(-1)),
            Ok(Value::int(20))
        );
        assert_eq!(
            binary_op(BinOp::Div, &list, &Value::int(2)),
            Err(OpError::RetrieveIndex)
        );
    }

    #[test]
    fn test_list_remove() {
        let list = Value::list(vec![Value::int(10), Value::int(20)]);
        binary_op(BinOp::Sub, &list, &Value::int(0)).unwrap();
        match &list {
            Value::List(items) => assert_eq!(*items.borrow(), vec![Value::int(20)]),
            _ => panic!("expected list"),
        }
        assert_eq!(
            binary_op(BinOp::Sub, &list, &Value::int(5)),
            Err(OpError::RemoveIndex)
        );
    }

    #[test]
    fn test_list_extend_with_itself() {
        let list = Value::list(vec![Value::int(1), Value::int(2)]);
        let result = binary_op(BinOp::Mul, &list, &list).unwrap();
        match result {
            Value::List(items) => assert_eq!(items.borrow().len(), 4),
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_and_or_combine_truthiness() {
        assert_eq!(
            binary_op(BinOp::And, &Value::int(2), &Value::int(3)),
            Ok(Value::int(1))
        );
        assert_eq!(
            binary_op(BinOp::And, &Value::int(0), &Value::int(3)),
            Ok(Value::int(0))
        );
        assert_eq!(
            binary_op(BinOp::Or, &Value::int(0), &Value::int(0)),
            Ok(Value::int(0))
        );
        // Logical operators are defined over numbers only.
        assert_eq!(
            binary_op(BinOp::And, &Value::Str("a".into()), &Value::int(1)),
            Err(OpError::Illegal)
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_true());
        assert!(!Value::int(0).is_true());
        assert!(Value::int(-1).is_true());
        assert!(!Value::Str(String::new()).is_true());
        assert!(Value::Str("x".into()).is_true());
        assert!(!Value::list(vec![]).is_true());
        assert!(Value::list(vec![Value::int(0)]).is_true());
    }

    #[test]
    fn test_print_and_repr_forms() {
        assert_eq!(Value::int(7).to_string(), "7");
        assert_eq!(Value::float(3.0).to_string(), "3.0");
        assert_eq!(Value::float(2.5).to_string(), "2.5");
        assert_eq!(Value::Str("hi".into()).to_string(), "hi");
        assert_eq!(Value::Str("hi".into()).repr(), "\"hi\"");

        let list = Value::list(vec![Value::int(1), Value::Str("a".into())]);
        assert_eq!(list.to_string(), "1, a");
        assert_eq!(list.repr(), "[1, \"a\"]");

        assert_eq!(Value::Null.to_string(), "\n");
    }
}
