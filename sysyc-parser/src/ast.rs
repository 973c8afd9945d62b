//! AST node definitions for the SysY language.
//!
//! This is a closed sum type per node kind rather than a single polymorphic
//! `Node` — each variant carries exactly the fields it needs and is matched
//! exhaustively by the lowering code in `sysyc`.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// The root of a parsed translation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompUnit {
    pub items: Vec<Item>,
}

/// A top-level declaration or function definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    Decl(Decl),
    FuncDef(FuncDef),
}

/// Scalar base type. SysY only has `int` and `void` (for function returns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseType {
    Int,
    Void,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDef {
    pub ret_ty: BaseType,
    pub name: String,
    pub params: Vec<FuncParam>,
    pub body: Block,
    pub span: Span,
}

/// A function parameter. `shape` is `None` for scalar `int` parameters and
/// `Some(dims)` for array parameters, where `dims[0]` is always the decayed
/// leading dimension (conceptually 0, omitted from the source but present in
/// the lowered shape vector — see `spec.md` §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncParam {
    pub name: String,
    pub is_array: bool,
    /// Fixed trailing dimensions for an array parameter, e.g. `a[][3]` -> `[3]`.
    pub shape: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub items: Vec<BlockItem>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockItem {
    Decl(Decl),
    Stmt(Stmt),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclKind {
    Const,
    Var,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decl {
    pub kind: DeclKind,
    pub base_ty: BaseType,
    pub defs: Vec<Def>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Def {
    pub name: String,
    /// Array dimension sizes, empty for a scalar definition. Every entry must
    /// be a compile-time constant expression (checked during lowering).
    pub shape: Vec<Expr>,
    pub init: Option<Init>,
    pub span: Span,
}

/// Initialiser for a `Def`: either a plain scalar expression or a (possibly
/// nested) brace-list for an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Init {
    Expr(Expr),
    List(Vec<Init>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Assign {
        target: LVal,
        value: Expr,
        span: Span,
    },
    ExprStmt(Expr),
    Null,
    Block(Block),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        span: Span,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
        span: Span,
    },
    Break(Span),
    Continue(Span),
    Return {
        value: Option<Expr>,
        span: Span,
    },
}

/// An lvalue: a bare variable or an indexed array element/reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LVal {
    pub name: String,
    pub indices: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number(i32),
    LVal(LVal),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Number(_) => Span::empty(),
            Expr::LVal(l) => l.span,
            Expr::Unary { span, .. } => *span,
            Expr::Binary { span, .. } => *span,
            Expr::Call { span, .. } => *span,
        }
    }
}
