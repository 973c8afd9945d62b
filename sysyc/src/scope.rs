//! Lexical scoping: `ScopeStack` (`spec.md` §4.1) and the `Symbol` table
//! entries it holds.
//!
//! Grounded on `original_source/src/SymbolTable.hpp`'s `TableStack`: each
//! scope gets a process-wide unique `tableId`; `insert` always writes the
//! innermost scope; `rename` and `query` walk innermost-first and the first
//! hit wins, which is what makes shadowing a pure renaming scheme at the IR
//! level (no IR-level notion of shadowing survives lowering).

use std::collections::HashMap;

use crate::slot::IdGen;
use sysyc_parser::ast::BaseType;

/// One lexically-scoped binding.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    /// A `const` scalar whose value is known at compile time.
    Const(i32),
    /// A local or global scalar variable. `is_global` selects whether the IR
    /// reference is `@name_k` (global) or `%name_k` is materialised via a
    /// local `alloc` (the renamed name is always used as the alloc's
    /// identifier either way).
    Var { is_global: bool },
    /// An integer function parameter, before it is copied into a local alloc
    /// by the prologue (`spec.md` §4.2, "Locals and parameters").
    FuncParamVar,
    /// A fixed-shape array, local or global. `shape` lists every dimension.
    Array { shape: Vec<i32>, is_global: bool },
    /// An array function parameter: `shape[0]` is always the decayed
    /// (pointer) dimension; the rest are the fixed trailing dimensions.
    FuncParamArrayVar { shape: Vec<i32> },
    /// A pointer-typed local produced by decaying a `FuncParamArrayVar` (or
    /// a partial index into one) into a local `alloc *T` slot.
    ArrayPtr { elem_shape: Vec<i32> },
    /// A user or library function.
    Func {
        ret_ty: BaseType,
        param_count: usize,
    },
    /// A loop-tag label bound under a reserved key (`$while_entry` etc.) so
    /// that `break`/`continue` can find the enclosing loop's labels by
    /// walking the scope stack exactly like any other lookup.
    Label(String),
}

struct SymbolTable {
    table_id: u32,
    bindings: HashMap<String, Symbol>,
}

impl SymbolTable {
    fn new(ids: &mut IdGen) -> Self {
        Self {
            table_id: ids.next(),
            bindings: HashMap::new(),
        }
    }

    fn insert(&mut self, name: &str, symbol: Symbol) {
        self.bindings.insert(name.to_string(), symbol);
    }

    fn query(&self, name: &str) -> Option<&Symbol> {
        self.bindings.get(name)
    }

    fn rename(&self, name: &str) -> String {
        format!("{name}_{}", self.table_id)
    }
}

/// Reserved keys used to bind the three loop-tag labels in a fresh scope
/// pushed by `while` lowering (`spec.md` §4.2).
pub const LOOP_ENTRY: &str = "$while_entry";
pub const LOOP_BODY: &str = "$while_body";
pub const LOOP_END: &str = "$while_end";

/// Ordered stack of lexical scopes.
#[derive(Default)]
pub struct ScopeStack {
    stack: Vec<SymbolTable>,
    ban_next_push: bool,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a fresh scope, unless a one-shot `ban_push` is armed — used so a
    /// function body's top-level `Block` shares the scope already opened for
    /// its parameters instead of opening a second, redundant one.
    pub fn push(&mut self, ids: &mut IdGen) {
        if self.ban_next_push {
            self.ban_next_push = false;
        } else {
            self.stack.push(SymbolTable::new(ids));
        }
    }

    pub fn pop(&mut self) {
        self.stack.pop();
    }

    pub fn ban_push(&mut self) {
        self.ban_next_push = true;
    }

    pub fn insert(&mut self, name: &str, symbol: Symbol) {
        self.stack
            .last_mut()
            .expect("insert called with no active scope")
            .insert(name, symbol);
    }

    /// Whether `name` is already bound in the innermost scope only — used to
    /// reject redeclaration within the same block (`spec.md` §4.1 shadowing
    /// is only legal across scope boundaries, never within one).
    pub fn declared_in_current_scope(&self, name: &str) -> bool {
        self.stack
            .last()
            .is_some_and(|t| t.query(name).is_some())
    }

    pub fn query(&self, name: &str) -> Option<&Symbol> {
        self.stack.iter().rev().find_map(|t| t.query(name))
    }

    /// The renamed IR identifier for `name`'s innermost binding, e.g.
    /// `x_3`. Returns `None` if `name` is unbound (a parser/lowering bug).
    pub fn rename(&self, name: &str) -> Option<String> {
        self.stack
            .iter()
            .rev()
            .find(|t| t.query(name).is_some())
            .map(|t| t.rename(name))
    }

    pub fn is_global(&self) -> bool {
        self.stack.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadowing_resolves_to_innermost_binding() {
        let mut ids = IdGen::new();
        let mut scopes = ScopeStack::new();
        scopes.push(&mut ids);
        scopes.insert("x", Symbol::Const(1));
        scopes.push(&mut ids);
        scopes.insert("x", Symbol::Const(2));
        assert_eq!(scopes.query("x"), Some(&Symbol::Const(2)));
        scopes.pop();
        assert_eq!(scopes.query("x"), Some(&Symbol::Const(1)));
    }

    #[test]
    fn rename_is_unique_per_scope() {
        let mut ids = IdGen::new();
        let mut scopes = ScopeStack::new();
        scopes.push(&mut ids);
        scopes.insert("x", Symbol::Var { is_global: false });
        let outer = scopes.rename("x").unwrap();
        scopes.push(&mut ids);
        scopes.insert("x", Symbol::Var { is_global: false });
        let inner = scopes.rename("x").unwrap();
        assert_ne!(outer, inner);
    }

    #[test]
    fn ban_push_skips_exactly_one_push() {
        let mut ids = IdGen::new();
        let mut scopes = ScopeStack::new();
        scopes.push(&mut ids);
        scopes.insert("p", Symbol::FuncParamVar);
        scopes.ban_push();
        scopes.push(&mut ids); // no-op: body block shares the parameter scope
        assert_eq!(scopes.query("p"), Some(&Symbol::FuncParamVar));
        scopes.push(&mut ids); // a real nested scope
        assert!(!scopes.is_global());
    }

    #[test]
    fn declared_in_current_scope_ignores_outer_bindings() {
        let mut ids = IdGen::new();
        let mut scopes = ScopeStack::new();
        scopes.push(&mut ids);
        scopes.insert("x", Symbol::Const(1));
        scopes.push(&mut ids);
        assert!(!scopes.declared_in_current_scope("x"));
        scopes.insert("x", Symbol::Const(2));
        assert!(scopes.declared_in_current_scope("x"));
    }

    #[test]
    fn is_global_true_only_at_one_live_scope() {
        let mut ids = IdGen::new();
        let mut scopes = ScopeStack::new();
        scopes.push(&mut ids);
        assert!(scopes.is_global());
        scopes.push(&mut ids);
        assert!(!scopes.is_global());
    }
}
