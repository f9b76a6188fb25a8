// ABOUTME: Tree-walking evaluator with sum-typed control-flow signalling

use crate::ast::{Node, NodeKind};
use crate::builtins;
use crate::config;
use crate::error::{Diagnostic, TraceFrame};
use crate::position::{Position, Span};
use crate::scope::{ScopeId, Scopes};
use crate::value::{
    binary_op, unary_op, Function, Number, OpError, Value, REMOVE_INDEX_MSG, RETRIEVE_INDEX_MSG,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::rc::Rc;

/// Everything a visit can produce besides a plain value. Loops absorb
/// `Break`/`Continue`, calls absorb `Return`, errors propagate to the top.
#[derive(Debug)]
pub enum Signal {
    Error(Box<Diagnostic>),
    Return(Value),
    Break,
    Continue,
}

pub type EvalResult = Result<Value, Signal>;

impl From<Diagnostic> for Signal {
    fn from(diag: Diagnostic) -> Self {
        Signal::Error(Box::new(diag))
    }
}

/// One evaluation frame, for tracebacks and the call-depth cap.
struct Frame {
    name: String,
    /// Where this frame was entered in its parent; `None` for the program
    /// frame.
    entry: Option<Position>,
}

pub struct Interpreter {
    scopes: Scopes,
    globals: ScopeId,
    frames: Vec<Frame>,
    max_depth: usize,
}

impl Interpreter {
    /// A fresh interpreter with the pre-seeded global table.
    pub fn new() -> Self {
        let mut scopes = Scopes::new();
        let globals = scopes.root();

        scopes.set(globals, "null".to_string(), Value::Null);
        scopes.set(globals, "true".to_string(), Value::int(1));
        scopes.set(globals, "false".to_string(), Value::int(0));
        scopes.set(
            globals,
            "math_pi".to_string(),
            Value::float(std::f64::consts::PI),
        );
        builtins::register(&mut scopes, globals);

        Interpreter {
            scopes,
            globals,
            frames: Vec::new(),
            max_depth: config::MAX_CALL_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Evaluate a parsed program in the global scope. Stray loop or return
    /// signals reaching the top are reset to null.
    pub fn run_program(&mut self, ast: &Node) -> Result<Value, Diagnostic> {
        self.frames.push(Frame {
            name: "<program>".to_string(),
            entry: None,
        });
        let result = self.eval(ast, self.globals);
        self.frames.pop();

        match result {
            Ok(value) => Ok(value),
            Err(Signal::Error(diag)) => Err(*diag),
            Err(Signal::Return(_)) | Err(Signal::Break) | Err(Signal::Continue) => Ok(Value::Null),
        }
    }

    /// Lookup in the global table, mostly for tests and the driver.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.scopes.get(self.globals, name)
    }

    /// A runtime error carrying the current call traceback.
    pub fn runtime_err(&self, span: &Span, details: impl Into<String>) -> Signal {
        let mut trace = Vec::new();
        let mut pos = span.start.clone();
        for frame in self.frames.iter().rev() {
            trace.push(TraceFrame {
                pos: pos.clone(),
                name: frame.name.clone(),
            });
            match &frame.entry {
                Some(entry) => pos = entry.clone(),
                None => break,
            }
        }
        trace.reverse();
        Signal::Error(Box::new(Diagnostic::runtime(span.clone(), details, trace)))
    }

    fn op_err(&self, err: OpError, lhs: &Span, rhs: &Span) -> Signal {
        match err {
            OpError::Illegal => self.runtime_err(&Span::merge(lhs, rhs), "Illegal operation"),
            OpError::DivisionByZero => self.runtime_err(rhs, "Division by zero"),
            OpError::RemoveIndex => self.runtime_err(rhs, REMOVE_INDEX_MSG),
            OpError::RetrieveIndex => self.runtime_err(rhs, RETRIEVE_INDEX_MSG),
        }
    }

    // ---- visitors ---------------------------------------------------------

    pub fn eval(&mut self, node: &Node, scope: ScopeId) -> EvalResult {
        match &node.kind {
            NodeKind::Int(v) => Ok(Value::int(*v)),
            NodeKind::Float(v) => Ok(Value::float(*v)),
            NodeKind::Str(s) => Ok(Value::Str(s.clone())),

            NodeKind::List(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval(element, scope)?);
                }
                Ok(Value::list(values))
            }

            NodeKind::VarAccess(name) => match self.scopes.get(scope, name) {
                Some(value) => Ok(value),
                None => Err(self.runtime_err(&node.span, format!("'{}' is not defined", name))),
            },

            NodeKind::VarAssign(name, value_node) => {
                let value = self.eval(value_node, scope)?;
                self.scopes.set(scope, name.clone(), value.clone());
                Ok(value)
            }

            NodeKind::BinOp { op, lhs, rhs } => {
                let left = self.eval(lhs, scope)?;
                let right = self.eval(rhs, scope)?;
                binary_op(*op, &left, &right).map_err(|e| self.op_err(e, &lhs.span, &rhs.span))
            }

            NodeKind::UnaryOp { op, operand } => {
                let value = self.eval(operand, scope)?;
                unary_op(*op, &value).map_err(|e| self.op_err(e, &node.span, &operand.span))
            }

            NodeKind::If { cases, else_case } => {
                for case in cases {
                    let cond = self.eval(&case.cond, scope)?;
                    if cond.is_true() {
                        let value = self.eval(&case.body, scope)?;
                        return Ok(if case.returns_null { Value::Null } else { value });
                    }
                }
                if let Some(else_case) = else_case {
                    let value = self.eval(&else_case.body, scope)?;
                    return Ok(if else_case.returns_null {
                        Value::Null
                    } else {
                        value
                    });
                }
                Ok(Value::Null)
            }

            NodeKind::For {
                var,
                start,
                end,
                step,
                body,
                returns_null,
            } => self.eval_for(var, start, end, step.as_deref(), body, *returns_null, scope),

            NodeKind::While {
                cond,
                body,
                returns_null,
            } => {
                let mut collected = Vec::new();
                loop {
                    let condition = self.eval(cond, scope)?;
                    if !condition.is_true() {
                        break;
                    }

                    match self.eval(body, scope) {
                        Ok(value) => collected.push(value),
                        Err(Signal::Continue) => continue,
                        Err(Signal::Break) => break,
                        Err(other) => return Err(other),
                    }
                }

                Ok(if *returns_null {
                    Value::Null
                } else {
                    Value::list(collected)
                })
            }

            NodeKind::FuncDef {
                name,
                params,
                body,
                auto_return,
            } => {
                let func = Value::Function(Rc::new(Function {
                    name: name.clone(),
                    params: params.clone(),
                    body: Rc::clone(body),
                    auto_return: *auto_return,
                    scope,
                }));
                if let Some(name) = name {
                    self.scopes.set(scope, name.clone(), func.clone());
                }
                Ok(func)
            }

            NodeKind::Call { callee, args } => {
                let target = self.eval(callee, scope)?;
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.eval(arg, scope)?);
                }
                self.call_value(&target, arg_values, &node.span)
            }

            NodeKind::Return(value) => {
                let value = match value {
                    Some(node) => self.eval(node, scope)?,
                    None => Value::Null,
                };
                Err(Signal::Return(value))
            }
            NodeKind::Continue => Err(Signal::Continue),
            NodeKind::Break => Err(Signal::Break),

            NodeKind::Include { path, .. } => self.eval_include(node, path, scope),
            NodeKind::Exit { code, .. } => self.eval_exit(code, scope),
            NodeKind::Argv { index, .. } => self.eval_argv(node, index, scope),
            NodeKind::MakeInt { value, .. } => {
                let text = self.eval(value, scope)?.to_string();
                let parsed = text
                    .parse::<i64>()
                    .ok()
                    .or_else(|| text.parse::<f64>().ok().map(|f| f as i64));
                match parsed {
                    Some(v) => Ok(Value::int(v)),
                    None => Err(self.runtime_err(
                        &node.span,
                        format!("Could not convert \"{}\" to an int", text.trim_end()),
                    )),
                }
            }
            NodeKind::MakeFloat { value, .. } => {
                let text = self.eval(value, scope)?.to_string();
                match text.parse::<f64>() {
                    Ok(v) => Ok(Value::float(v)),
                    Err(_) => Err(self.runtime_err(
                        &node.span,
                        format!("Could not convert \"{}\" to a float", text.trim_end()),
                    )),
                }
            }
            NodeKind::MakeStr { value, .. } => {
                let value = self.eval(value, scope)?;
                Ok(Value::Str(value.to_string()))
            }
            NodeKind::Shuffle { list, .. } => {
                let value = self.eval(list, scope)?;
                match &value {
                    Value::List(items) => {
                        items.borrow_mut().shuffle(&mut rand::thread_rng());
                        Ok(value.clone())
                    }
                    _ => Err(self.runtime_err(&list.span, "Argument must be list")),
                }
            }
            NodeKind::LenStr { value, .. } => {
                let text = self.eval(value, scope)?.to_string();
                Ok(Value::int(text.chars().count() as i64))
            }
            NodeKind::TakeElement {
                container, index, ..
            } => self.eval_take_element(container, index, scope),
            NodeKind::RandInt { lo, hi, .. } => self.eval_rand_int(node, lo, hi, scope),
            NodeKind::System { command, .. } => {
                let text = self.eval(command, scope)?.to_string();
                let _status = std::process::Command::new("sh")
                    .arg("-c")
                    .arg(&text)
                    .status()
                    .map_err(|e| {
                        self.runtime_err(&node.span, format!("Failed to run command: {}", e))
                    })?;
                Ok(Value::Null)
            }
            NodeKind::Sleep { seconds, .. } => self.eval_sleep(seconds, scope),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn eval_for(
        &mut self,
        var: &str,
        start: &Node,
        end: &Node,
        step: Option<&Node>,
        body: &Node,
        returns_null: bool,
        scope: ScopeId,
    ) -> EvalResult {
        let start_value = self.eval_number(start, scope)?;
        let end_value = self.eval_number(end, scope)?;
        let step_value = match step {
            Some(step) => self.eval_number(step, scope)?,
            None => Number::Int(1),
        };

        let ascending = !step_value.lt(Number::Int(0));
        let mut i = start_value;
        let mut collected = Vec::new();

        loop {
            let more = if ascending {
                i.lt(end_value)
            } else {
                end_value.lt(i)
            };
            if !more {
                break;
            }

            self.scopes.set(scope, var.to_string(), Value::Number(i));
            i = i.add(step_value);

            match self.eval(body, scope) {
                Ok(value) => collected.push(value),
                Err(Signal::Continue) => continue,
                Err(Signal::Break) => break,
                Err(other) => return Err(other),
            }
        }

        Ok(if returns_null {
            Value::Null
        } else {
            Value::list(collected)
        })
    }

    fn eval_number(&mut self, node: &Node, scope: ScopeId) -> Result<Number, Signal> {
        match self.eval(node, scope)? {
            Value::Number(n) => Ok(n),
            _ => Err(self.runtime_err(&node.span, "Expected number")),
        }
    }

    fn eval_include(&mut self, node: &Node, path: &Node, scope: ScopeId) -> EvalResult {
        let name = self.eval(path, scope)?.to_string();

        let file = if name == "all" || name == "stdlib" {
            config::STDLIB_FILE.to_string()
        } else if name.ends_with(config::HUSTLE_EXT) {
            name.clone()
        } else {
            return Err(self.runtime_err(
                &node.span,
                format!("\"{}\" does not have a {} extension", name, config::HUSTLE_EXT),
            ));
        };

        let script = std::fs::read_to_string(&file).map_err(|e| {
            self.runtime_err(&node.span, format!("Failed to load script \"{}\"\n{}", file, e))
        })?;

        // Unlike `run`, inclusion evaluates in this program's global table,
        // so the file's definitions stay bound afterwards; the file's result
        // value flows back to the caller.
        let wrap = |interp: &Interpreter, e: Diagnostic| {
            interp.runtime_err(
                &node.span,
                format!("Failed to finish executing script \"{}\"\n{}", file, e),
            )
        };
        let tokens = crate::lexer::Lexer::new(&file, &script)
            .tokenize()
            .map_err(|e| wrap(self, e))?;
        let ast = crate::parser::Parser::new(tokens)
            .parse()
            .map_err(|e| wrap(self, e))?;

        match self.eval(&ast, self.globals) {
            Ok(value) => Ok(value),
            Err(Signal::Error(diag)) => Err(wrap(self, *diag)),
            Err(Signal::Return(_)) | Err(Signal::Break) | Err(Signal::Continue) => Ok(Value::Null),
        }
    }

    fn eval_exit(&mut self, code: &Node, scope: ScopeId) -> EvalResult {
        let value = self.eval(code, scope)?;
        match value {
            Value::Number(Number::Int(n)) => std::process::exit(n as i32),
            other => {
                eprintln!("{}", other);
                std::process::exit(1);
            }
        }
    }

    fn eval_argv(&mut self, node: &Node, index: &Node, scope: ScopeId) -> EvalResult {
        let n = match self.eval(index, scope)? {
            Value::Number(Number::Int(n)) => n,
            _ => return Err(self.runtime_err(&index.span, "Expected int")),
        };

        // The host CLI consumes two leading arguments (the subcommand and
        // the script path), so Argv[0] is the script itself.
        let arg = n
            .checked_add(2)
            .and_then(|k| usize::try_from(k).ok())
            .and_then(|k| std::env::args().nth(k));
        match arg {
            Some(text) => Ok(Value::list(vec![Value::Str(text)])),
            None => Err(self.runtime_err(
                &node.span,
                format!("Argument {} is out of range", n),
            )),
        }
    }

    fn eval_take_element(&mut self, container: &Node, index: &Node, scope: ScopeId) -> EvalResult {
        let target = self.eval(container, scope)?;
        let idx = match self.eval(index, scope)? {
            Value::Number(Number::Int(n)) => n,
            _ => return Err(self.runtime_err(&index.span, "Second argument must be number")),
        };

        let pick = |idx: i64, len: usize| -> Option<usize> {
            let len = len as i64;
            let idx = if idx < 0 { idx + len } else { idx };
            (0..len).contains(&idx).then_some(idx as usize)
        };

        match target {
            Value::List(items) => {
                let items = items.borrow();
                match pick(idx, items.len()) {
                    Some(i) => Ok(Value::list(vec![items[i].clone()])),
                    None => Err(self.runtime_err(&index.span, RETRIEVE_INDEX_MSG)),
                }
            }
            Value::Str(text) => {
                let chars: Vec<char> = text.chars().collect();
                match pick(idx, chars.len()) {
                    Some(i) => Ok(Value::list(vec![Value::Str(chars[i].to_string())])),
                    None => Err(self.runtime_err(
                        &index.span,
                        "Element at this index could not be retrieved from string because index is out of bounds",
                    )),
                }
            }
            _ => Err(self.runtime_err(&container.span, "First argument must be list or string")),
        }
    }

    fn eval_rand_int(&mut self, node: &Node, lo: &Node, hi: &Node, scope: ScopeId) -> EvalResult {
        let low = match self.eval(lo, scope)? {
            Value::Number(Number::Int(n)) => n,
            _ => return Err(self.runtime_err(&lo.span, "Arguments must be ints")),
        };
        let high = match self.eval(hi, scope)? {
            Value::Number(Number::Int(n)) => n,
            _ => return Err(self.runtime_err(&hi.span, "Arguments must be ints")),
        };

        if low > high {
            return Err(self.runtime_err(
                &node.span,
                "Lower bound cannot be greater than upper bound",
            ));
        }

        Ok(Value::int(rand::thread_rng().gen_range(low..=high)))
    }

    fn eval_sleep(&mut self, seconds: &Node, scope: ScopeId) -> EvalResult {
        let secs = match self.eval(seconds, scope)? {
            Value::Number(n) => n.as_f64(),
            Value::Str(s) => match s.parse::<f64>() {
                Ok(v) => v,
                Err(_) => return Err(self.runtime_err(&seconds.span, "Expected number")),
            },
            _ => return Err(self.runtime_err(&seconds.span, "Expected number")),
        };

        if secs <= 0.0 {
            return Err(self.runtime_err(&seconds.span, "Sleep duration must be positive"));
        }

        std::thread::sleep(std::time::Duration::from_secs_f64(secs));
        Ok(Value::Null)
    }

    // ---- calls ------------------------------------------------------------

    /// The shared call protocol for user functions and built-ins: arity
    /// check, fresh frame, parameter binding, signal absorption.
    pub fn call_value(&mut self, callee: &Value, args: Vec<Value>, span: &Span) -> EvalResult {
        match callee {
            Value::Function(func) => {
                self.check_arity(func.params.len(), args.len(), callee, span)?;
                self.enter_frame(func.display_name().to_string(), span)?;

                let call_scope = self.scopes.child(func.scope);
                for (param, arg) in func.params.iter().zip(args) {
                    self.scopes.set(call_scope, param.clone(), arg);
                }

                let func = Rc::clone(func);
                let result = self.eval(&func.body, call_scope);
                self.frames.pop();

                match result {
                    Ok(value) => Ok(if func.auto_return { value } else { Value::Null }),
                    Err(Signal::Return(value)) => Ok(value),
                    // Loop signals never cross a function boundary.
                    Err(Signal::Break) | Err(Signal::Continue) => Ok(Value::Null),
                    Err(error) => Err(error),
                }
            }
            Value::Builtin(builtin) => {
                self.check_arity(builtin.params.len(), args.len(), callee, span)?;
                self.enter_frame(builtin.name.to_string(), span)?;
                let result = (builtin.run)(self, &args, span);
                self.frames.pop();
                result
            }
            _ => Err(self.runtime_err(span, "Illegal operation")),
        }
    }

    fn check_arity(
        &self,
        expected: usize,
        actual: usize,
        callee: &Value,
        span: &Span,
    ) -> Result<(), Signal> {
        if actual > expected {
            return Err(self.runtime_err(
                span,
                format!("{} too many args passed into {}", actual - expected, callee),
            ));
        }
        if actual < expected {
            return Err(self.runtime_err(
                span,
                format!("{} too few args passed into {}", expected - actual, callee),
            ));
        }
        Ok(())
    }

    fn enter_frame(&mut self, name: String, span: &Span) -> Result<(), Signal> {
        if self.frames.len() >= self.max_depth {
            return Err(self.runtime_err(span, "maximum call depth exceeded"));
        }
        self.frames.push(Frame {
            name,
            entry: Some(span.start.clone()),
        });
        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}
