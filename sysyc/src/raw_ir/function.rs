use serde::{Deserialize, Serialize};

use super::types::Type;
use super::value::{BlockId, ValueId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicBlockData {
    pub name: String,
    /// Instructions in program order. The last entry is always a
    /// `Branch`/`Jump`/`Return` terminator (`spec.md` §3: "each basic block
    /// ... ends in exactly one terminator").
    pub insts: Vec<ValueId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionData {
    pub name: String,
    pub param_tys: Vec<Type>,
    pub param_values: Vec<ValueId>,
    pub ret_ty: Type,
    /// Empty for a `decl` (library function signature, no body).
    pub blocks: Vec<BlockId>,
}

impl FunctionData {
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }
}
