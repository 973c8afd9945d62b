use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::function::{BasicBlockData, FunctionData};
use super::value::{BlockId, ValueData, ValueId};

/// The whole compilation unit's IR, arena-allocated (`spec.md` §9's Design
/// Notes): every `ValueData`/`BasicBlockData` lives here and is referenced
/// by index, never by pointer or lifetime-bound reference.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Program {
    values: Vec<ValueData>,
    blocks: Vec<BasicBlockData>,
    functions: Vec<FunctionData>,
    func_index: HashMap<String, usize>,
    /// Global `alloc`s in declaration order, for the `-koopa` printer.
    pub globals: Vec<ValueId>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_value(&mut self, data: ValueData) -> ValueId {
        self.values.push(data);
        (self.values.len() - 1) as ValueId
    }

    pub fn value(&self, id: ValueId) -> &ValueData {
        &self.values[id as usize]
    }

    pub fn value_mut(&mut self, id: ValueId) -> &mut ValueData {
        &mut self.values[id as usize]
    }

    pub fn new_block(&mut self, name: impl Into<String>) -> BlockId {
        self.blocks.push(BasicBlockData {
            name: name.into(),
            insts: Vec::new(),
        });
        (self.blocks.len() - 1) as BlockId
    }

    pub fn block(&self, id: BlockId) -> &BasicBlockData {
        &self.blocks[id as usize]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut BasicBlockData {
        &mut self.blocks[id as usize]
    }

    pub fn push_inst(&mut self, block: BlockId, value: ValueId) {
        self.blocks[block as usize].insts.push(value);
    }

    /// True once `block`'s last instruction is a terminator
    /// (`Branch`/`Jump`/`Return`) — used to skip appending any further
    /// instructions to a block whose control flow has already concluded
    /// (dead code after an early `return`, `spec.md` §4.2 "Dead code").
    pub fn block_terminated(&self, block: BlockId) -> bool {
        use super::value::ValueKind::*;
        self.blocks[block as usize]
            .insts
            .last()
            .is_some_and(|&id| matches!(self.value(id).kind, Branch { .. } | Jump(_) | Return(_)))
    }

    pub fn new_function(&mut self, data: FunctionData) -> usize {
        let idx = self.functions.len();
        self.func_index.insert(data.name.clone(), idx);
        self.functions.push(data);
        idx
    }

    pub fn function(&self, idx: usize) -> &FunctionData {
        &self.functions[idx]
    }

    pub fn function_mut(&mut self, idx: usize) -> &mut FunctionData {
        &mut self.functions[idx]
    }

    pub fn function_by_name(&self, name: &str) -> Option<&FunctionData> {
        self.func_index.get(name).map(|&i| &self.functions[i])
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionData> {
        self.functions.iter()
    }
}
