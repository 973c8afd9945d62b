//! The arena-allocated value graph `spec.md` §9's Design Notes ask for in
//! place of the reference compiler's pointer-linked IR nodes: every `Value`
//! and `BasicBlock` lives in a `Program`-owned `Vec` and is referred to by a
//! stable small index instead of a reference, so the graph is plain data and
//! survives being serialised, parsed back, or diffed in a snapshot test.

use serde::{Deserialize, Serialize};

use super::types::Type;

pub type ValueId = u32;
pub type BlockId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl BinOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::Div => "div",
            BinOp::Mod => "mod",
            BinOp::Eq => "eq",
            BinOp::NotEq => "ne",
            BinOp::Lt => "lt",
            BinOp::Gt => "gt",
            BinOp::Le => "le",
            BinOp::Ge => "ge",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }

    pub fn from_mnemonic(s: &str) -> Option<BinOp> {
        Some(match s {
            "add" => BinOp::Add,
            "sub" => BinOp::Sub,
            "mul" => BinOp::Mul,
            "div" => BinOp::Div,
            "mod" => BinOp::Mod,
            "eq" => BinOp::Eq,
            "ne" => BinOp::NotEq,
            "lt" => BinOp::Lt,
            "gt" => BinOp::Gt,
            "le" => BinOp::Le,
            "ge" => BinOp::Ge,
            "and" => BinOp::And,
            "or" => BinOp::Or,
            _ => return None,
        })
    }
}

/// The operation a `ValueData` node performs. Operands are always other
/// `ValueId`s, including inlined integer literals — `Operand` never needs to
/// branch on "is this a constant or a reference", which keeps every
/// downstream pass (codegen, printing) uniform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ValueKind {
    /// An inlined constant. Never assigned a `%n` slot; referenced directly
    /// by its decimal text at every use site.
    Integer(i32),
    /// `zeroinit` — used as a `GlobalAlloc`/`Aggregate` initialiser only.
    ZeroInit,
    /// The `n`th formal parameter of the enclosing function.
    FuncArgRef(u32),
    /// `alloc <ty>` — a local stack slot.
    Alloc,
    /// `global alloc <ty>, <init>` — a global slot holding `init`.
    GlobalAlloc(ValueId),
    Load(ValueId),
    Store {
        value: ValueId,
        dest: ValueId,
    },
    Binary {
        op: BinOp,
        lhs: ValueId,
        rhs: ValueId,
    },
    Branch {
        cond: ValueId,
        then_bb: BlockId,
        else_bb: BlockId,
    },
    Jump(BlockId),
    Call {
        callee: String,
        args: Vec<ValueId>,
    },
    Return(Option<ValueId>),
    GetElemPtr {
        src: ValueId,
        index: ValueId,
    },
    GetPtr {
        src: ValueId,
        index: ValueId,
    },
    /// A braced initialiser list, e.g. `{1, 2, {3, 4}}`, built out of other
    /// `Integer`/`ZeroInit`/`Aggregate` values.
    Aggregate(Vec<ValueId>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueData {
    pub kind: ValueKind,
    pub ty: Type,
    /// `Some("x_3")` for a value that owns a textual slot (`%x_3` locally,
    /// `@x_3` globally); `None` for values that are only ever referenced
    /// inline (constants, and operands of `Aggregate`/`GlobalAlloc`).
    pub name: Option<String>,
}

impl ValueData {
    pub fn unnamed(kind: ValueKind, ty: Type) -> Self {
        Self {
            kind,
            ty,
            name: None,
        }
    }

    pub fn named(kind: ValueKind, ty: Type, name: impl Into<String>) -> Self {
        Self {
            kind,
            ty,
            name: Some(name.into()),
        }
    }

    pub fn is_inline_literal(&self) -> bool {
        matches!(self.kind, ValueKind::Integer(_) | ValueKind::ZeroInit)
    }
}
