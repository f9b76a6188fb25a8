// ABOUTME: Arena of symbol tables addressed by stable ids

use crate::value::Value;
use std::collections::HashMap;

/// Stable handle to one symbol table in the arena. Function values store
/// their defining scope id, which keeps closure capture cycle-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(u32);

#[derive(Debug, Default)]
struct SymbolTable {
    symbols: HashMap<String, Value>,
    parent: Option<ScopeId>,
}

/// All symbol tables of one interpreter. Tables live for the interpreter's
/// lifetime; a run allocates one per function call.
#[derive(Debug, Default)]
pub struct Scopes {
    tables: Vec<SymbolTable>,
}

impl Scopes {
    pub fn new() -> Self {
        Scopes::default()
    }

    /// A fresh table with no parent (the global table).
    pub fn root(&mut self) -> ScopeId {
        self.push(None)
    }

    /// A fresh table whose lookups fall back to `parent`.
    pub fn child(&mut self, parent: ScopeId) -> ScopeId {
        self.push(Some(parent))
    }

    fn push(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.tables.len() as u32);
        self.tables.push(SymbolTable {
            symbols: HashMap::new(),
            parent,
        });
        id
    }

    /// Walks the parent chain.
    pub fn get(&self, scope: ScopeId, name: &str) -> Option<Value> {
        let mut current = Some(scope);
        while let Some(ScopeId(id)) = current {
            let table = &self.tables[id as usize];
            if let Some(value) = table.symbols.get(name) {
                return Some(value.clone());
            }
            current = table.parent;
        }
        None
    }

    /// Binds in the given table only, never in a parent.
    pub fn set(&mut self, scope: ScopeId, name: String, value: Value) {
        self.tables[scope.0 as usize].symbols.insert(name, value);
    }

    pub fn remove(&mut self, scope: ScopeId, name: &str) {
        self.tables[scope.0 as usize].symbols.remove(name);
    }
}
