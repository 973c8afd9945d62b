//! `Ctx`: the explicit emission context `spec.md` §9's Design Notes ask for
//! in place of the reference compiler's global `SlotAllocator`/`TableStack`/
//! `GenID` singletons. One `Ctx` is constructed per compilation and threaded
//! by `&mut` through every lowering function in this module; nothing here is
//! `static` or thread-local, so two compilations (even concurrent ones, each
//! with its own `Ctx`) can never interfere (`spec.md` §5).

use std::collections::HashMap;

use crate::raw_ir::{BlockId, Program, Type, ValueData, ValueId, ValueKind};
use crate::scope::ScopeStack;
use crate::slot::{IdGen, SlotAllocator};

pub struct Ctx {
    pub prog: Program,
    pub scopes: ScopeStack,
    ids: IdGen,
    slots: SlotAllocator,
    cur_func: Option<usize>,
    cur_block: Option<BlockId>,
    /// Renamed identifier (`x_3`) -> the `ValueId` of the `alloc`/param that
    /// backs it. `ScopeStack` only tracks *names*; this is where the actual
    /// IR handle behind each name lives.
    bindings: HashMap<String, ValueId>,
    /// Block label -> `BlockId`, so `break`/`continue` can resolve the
    /// `Symbol::Label` text bound by `while` lowering back to a real block
    /// without scanning every function.
    block_labels: HashMap<String, BlockId>,
}

impl Ctx {
    pub fn new() -> Self {
        Self {
            prog: Program::new(),
            scopes: ScopeStack::new(),
            ids: IdGen::new(),
            slots: SlotAllocator::new(),
            cur_func: None,
            cur_block: None,
            bindings: HashMap::new(),
            block_labels: HashMap::new(),
        }
    }

    pub fn bind(&mut self, renamed: impl Into<String>, value: ValueId) {
        self.bindings.insert(renamed.into(), value);
    }

    pub fn binding(&self, renamed: &str) -> ValueId {
        *self
            .bindings
            .get(renamed)
            .unwrap_or_else(|| panic!("no binding recorded for '{renamed}'"))
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(&mut self.ids);
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// A fresh globally-unique suffix, shared by `ScopeStack` `tableId`s and
    /// control-flow label suffixes (`spec.md` §4.3's single `GenID()`).
    pub fn gen_id(&mut self) -> u32 {
        self.ids.next()
    }

    /// `%<tag>_<id>` block label, e.g. `%then_7`.
    pub fn fresh_label(&mut self, tag: &str) -> String {
        format!("%{tag}_{}", self.gen_id())
    }

    /// `%<n>` numeric temporary name for an anonymous computed value.
    fn fresh_temp(&mut self) -> String {
        self.slots.next_slot().to_string()
    }

    pub fn enter_function(&mut self, idx: usize) {
        self.cur_func = Some(idx);
        self.slots = SlotAllocator::new();
    }

    pub fn leave_function(&mut self) {
        self.cur_func = None;
        self.cur_block = None;
    }

    pub fn current_block(&self) -> BlockId {
        self.cur_block.expect("no active basic block")
    }

    pub fn switch_to(&mut self, block: BlockId) {
        self.cur_block = Some(block);
    }

    /// Open a new block under `label` and append it to the current
    /// function's block list, without switching to it.
    pub fn new_block(&mut self, label: &str) -> BlockId {
        let id = self.prog.new_block(label.to_string());
        let idx = self.cur_func.expect("no active function");
        self.prog.function_mut(idx).blocks.push(id);
        self.block_labels.insert(label.to_string(), id);
        id
    }

    pub fn block_by_label(&self, label: &str) -> BlockId {
        *self
            .block_labels
            .get(label)
            .unwrap_or_else(|| panic!("no block registered for label '{label}'"))
    }

    pub fn block_terminated(&self, block: BlockId) -> bool {
        self.prog.block_terminated(block)
    }

    pub fn current_block_terminated(&self) -> bool {
        self.block_terminated(self.current_block())
    }

    /// Append `value` as an instruction to the current block, unless it is
    /// already terminated — dead code after an early `return`/`break`/
    /// `continue` is dropped rather than rejected (`spec.md` §4.2).
    fn push_current(&mut self, value: ValueId) {
        let block = self.current_block();
        if !self.block_terminated(block) {
            self.prog.push_inst(block, value);
        }
    }

    /// Emit an instruction that produces a value, naming it with a fresh
    /// numeric temporary (`%7`). Returns the new value's id.
    pub fn emit(&mut self, kind: ValueKind, ty: Type) -> ValueId {
        let name = self.fresh_temp();
        let id = self.prog.new_value(ValueData::named(kind, ty, name));
        self.push_current(id);
        id
    }

    /// Emit an instruction under an explicit, already-renamed name (used for
    /// `alloc`s of named locals, e.g. `%x_3`).
    pub fn emit_named(&mut self, kind: ValueKind, ty: Type, name: impl Into<String>) -> ValueId {
        let id = self.prog.new_value(ValueData::named(kind, ty, name));
        self.push_current(id);
        id
    }

    /// Emit an instruction with no result value (`store`, `br`, `jump`,
    /// `ret`, a void `call`).
    pub fn emit_void(&mut self, kind: ValueKind) -> ValueId {
        let id = self.prog.new_value(ValueData::unnamed(kind, Type::Unit));
        self.push_current(id);
        id
    }

    pub fn const_int(&mut self, n: i32) -> ValueId {
        self.prog
            .new_value(ValueData::unnamed(ValueKind::Integer(n), Type::Int32))
    }
}

impl Default for Ctx {
    fn default() -> Self {
        Self::new()
    }
}
