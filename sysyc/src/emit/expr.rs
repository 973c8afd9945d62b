//! Expression lowering: constant folding (`eval`), ordinary value emission,
//! the short-circuit `&&`/`||` diamond, and array-reference/decay handling
//! (`spec.md` §4.2).

use sysyc_parser::ast::{self, Expr, LVal};

use crate::compile_error::{CompileError, Result};
use crate::raw_ir::{BinOp as IrBinOp, Type, ValueId, ValueKind};
use crate::scope::Symbol;

use super::context::Ctx;

/// Fold a compile-time-constant expression to its value. Returns `None` the
/// moment any operand isn't itself foldable (a non-`const` variable, a call,
/// or a partially/under-indexed array reference) — callers in array-size and
/// `const`-initialiser position turn that into `CompileError::NotConstant`.
pub fn eval(ctx: &Ctx, expr: &Expr) -> Option<i32> {
    match expr {
        Expr::Number(n) => Some(*n),
        Expr::LVal(l) => {
            if !l.indices.is_empty() {
                return None;
            }
            match ctx.scopes.query(&l.name)? {
                Symbol::Const(v) => Some(*v),
                _ => None,
            }
        }
        Expr::Unary { op, operand, .. } => {
            let v = eval(ctx, operand)?;
            Some(match op {
                ast::UnaryOp::Plus => v,
                ast::UnaryOp::Neg => -v,
                ast::UnaryOp::Not => i32::from(v == 0),
            })
        }
        Expr::Binary { op, lhs, rhs, .. } => {
            let l = eval(ctx, lhs)?;
            let r = eval(ctx, rhs)?;
            match op {
                ast::BinOp::Div => return l.checked_div(r),
                ast::BinOp::Mod => return l.checked_rem(r),
                _ => {}
            }
            Some(match op {
                ast::BinOp::Add => l.wrapping_add(r),
                ast::BinOp::Sub => l.wrapping_sub(r),
                ast::BinOp::Mul => l.wrapping_mul(r),
                ast::BinOp::Div | ast::BinOp::Mod => unreachable!(),
                ast::BinOp::Lt => i32::from(l < r),
                ast::BinOp::Gt => i32::from(l > r),
                ast::BinOp::Le => i32::from(l <= r),
                ast::BinOp::Ge => i32::from(l >= r),
                ast::BinOp::Eq => i32::from(l == r),
                ast::BinOp::Ne => i32::from(l != r),
                ast::BinOp::And => i32::from(l != 0 && r != 0),
                ast::BinOp::Or => i32::from(l != 0 || r != 0),
            })
        }
        Expr::Call { .. } => None,
    }
}

/// Peel one array dimension off a pointer type, as `getelemptr`/`getptr` do:
/// `*[i32, N]` -> `*i32`, `*[[i32,N],M]` -> `*[i32,N]`.
fn step_elem_ty(ptr_ty: &Type) -> Type {
    let inner = ptr_ty
        .pointee()
        .expect("getelemptr/getptr source must be pointer-typed");
    let elem = inner.array_elem().cloned().unwrap_or(Type::Int32);
    Type::Pointer(Box::new(elem))
}

pub fn emit_expr(ctx: &mut Ctx, expr: &Expr) -> Result<ValueId> {
    if let Some(v) = eval(ctx, expr) {
        return Ok(ctx.const_int(v));
    }
    match expr {
        Expr::Number(n) => Ok(ctx.const_int(*n)),
        Expr::LVal(l) => emit_lval(ctx, l),
        Expr::Unary { op, operand, .. } => emit_unary(ctx, *op, operand),
        Expr::Binary {
            op: ast::BinOp::And,
            lhs,
            rhs,
            ..
        } => emit_short_circuit(ctx, true, lhs, rhs),
        Expr::Binary {
            op: ast::BinOp::Or,
            lhs,
            rhs,
            ..
        } => emit_short_circuit(ctx, false, lhs, rhs),
        Expr::Binary { op, lhs, rhs, .. } => {
            let l = emit_expr(ctx, lhs)?;
            let r = emit_expr(ctx, rhs)?;
            Ok(emit_binary(ctx, ir_binop(*op), l, r))
        }
        Expr::Call { callee, args, .. } => emit_call(ctx, callee, args),
    }
}

fn ir_binop(op: ast::BinOp) -> IrBinOp {
    match op {
        ast::BinOp::Add => IrBinOp::Add,
        ast::BinOp::Sub => IrBinOp::Sub,
        ast::BinOp::Mul => IrBinOp::Mul,
        ast::BinOp::Div => IrBinOp::Div,
        ast::BinOp::Mod => IrBinOp::Mod,
        ast::BinOp::Lt => IrBinOp::Lt,
        ast::BinOp::Gt => IrBinOp::Gt,
        ast::BinOp::Le => IrBinOp::Le,
        ast::BinOp::Ge => IrBinOp::Ge,
        ast::BinOp::Eq => IrBinOp::Eq,
        ast::BinOp::Ne => IrBinOp::NotEq,
        ast::BinOp::And | ast::BinOp::Or => unreachable!("short-circuit ops never reach ir_binop"),
    }
}

fn emit_binary(ctx: &mut Ctx, op: IrBinOp, lhs: ValueId, rhs: ValueId) -> ValueId {
    ctx.emit(ValueKind::Binary { op, lhs, rhs }, Type::Int32)
}

fn emit_unary(ctx: &mut Ctx, op: ast::UnaryOp, operand: &Expr) -> Result<ValueId> {
    let v = emit_expr(ctx, operand)?;
    Ok(match op {
        ast::UnaryOp::Plus => v,
        ast::UnaryOp::Neg => {
            let zero = ctx.const_int(0);
            emit_binary(ctx, IrBinOp::Sub, zero, v)
        }
        ast::UnaryOp::Not => {
            let zero = ctx.const_int(0);
            emit_binary(ctx, IrBinOp::Eq, v, zero)
        }
    })
}

/// `a && b` / `a || b` (`spec.md` §4.2's short-circuit diamond). `is_and`
/// selects which operator this is; the cell and the block names are local to
/// each call so nested `&&`/`||` never collide.
fn emit_short_circuit(ctx: &mut Ctx, is_and: bool, lhs: &Expr, rhs: &Expr) -> Result<ValueId> {
    let tag = if is_and { "and" } else { "or" };
    let entry = ctx.current_block();
    let rhs_bb = ctx.new_block(&format!("shortcut_then_{tag}"));
    let skip_bb = ctx.new_block(&format!("shortcut_else_{tag}"));
    let end_bb = ctx.new_block(&format!("shortcut_end_{tag}"));

    let cell = ctx.emit(ValueKind::Alloc, Type::Pointer(Box::new(Type::Int32)));
    let _ = entry;

    let l = emit_expr(ctx, lhs)?;
    let zero = ctx.const_int(0);
    let l_bool = emit_binary(ctx, IrBinOp::NotEq, l, zero);
    // `&&`: short-circuit (skip rhs) the moment lhs is false; `||`: the
    // moment lhs is true. Either way the "skip" branch writes lhs's own
    // truth value into the cell and the "evaluate rhs" branch writes rhs's.
    if is_and {
        ctx.emit_void(ValueKind::Branch {
            cond: l_bool,
            then_bb: rhs_bb,
            else_bb: skip_bb,
        });
    } else {
        ctx.emit_void(ValueKind::Branch {
            cond: l_bool,
            then_bb: skip_bb,
            else_bb: rhs_bb,
        });
    }

    ctx.switch_to(rhs_bb);
    let r = emit_expr(ctx, rhs)?;
    let r_bool = emit_binary(ctx, IrBinOp::NotEq, r, zero);
    ctx.emit_void(ValueKind::Store {
        value: r_bool,
        dest: cell,
    });
    ctx.emit_void(ValueKind::Jump(end_bb));

    ctx.switch_to(skip_bb);
    ctx.emit_void(ValueKind::Store {
        value: l_bool,
        dest: cell,
    });
    ctx.emit_void(ValueKind::Jump(end_bb));

    ctx.switch_to(end_bb);
    Ok(ctx.emit(ValueKind::Load(cell), Type::Int32))
}

fn emit_call(ctx: &mut Ctx, callee: &str, args: &[Expr]) -> Result<ValueId> {
    let sym = ctx
        .scopes
        .query(callee)
        .ok_or_else(|| CompileError::UnresolvedIdent(callee.to_string()))?
        .clone();
    let Symbol::Func { ret_ty, param_count } = sym else {
        return Err(CompileError::NotCallable(callee.to_string()));
    };
    if args.len() != param_count {
        return Err(CompileError::ArgCountMismatch {
            name: callee.to_string(),
            expected: param_count,
            got: args.len(),
        });
    }
    let mut arg_values = Vec::with_capacity(args.len());
    for arg in args {
        let v = match arg {
            Expr::LVal(l) => emit_lval(ctx, l)?,
            other => emit_expr(ctx, other)?,
        };
        arg_values.push(v);
    }
    let ret = match ret_ty {
        ast::BaseType::Int => Type::Int32,
        ast::BaseType::Void => Type::Unit,
    };
    let kind = ValueKind::Call {
        callee: callee.to_string(),
        args: arg_values,
    };
    Ok(if matches!(ret, Type::Unit) {
        ctx.emit_void(kind)
    } else {
        ctx.emit(kind, ret)
    })
}

/// Resolve an `LVal` to the `ValueId` it denotes: a loaded scalar when fully
/// indexed (or a bare scalar variable), or a decayed pointer value when
/// under-indexed (the only other legal use — a function-call argument).
pub fn emit_lval(ctx: &mut Ctx, lval: &LVal) -> Result<ValueId> {
    let sym = ctx
        .scopes
        .query(&lval.name)
        .ok_or_else(|| CompileError::UnresolvedIdent(lval.name.clone()))?
        .clone();
    match sym {
        Symbol::Const(v) => Ok(ctx.const_int(v)),
        Symbol::Var { .. } | Symbol::FuncParamVar => {
            let renamed = ctx.scopes.rename(&lval.name).unwrap();
            let slot = ctx.binding(&renamed);
            Ok(ctx.emit(ValueKind::Load(slot), Type::Int32))
        }
        Symbol::Array { shape, .. } => {
            let renamed = ctx.scopes.rename(&lval.name).unwrap();
            let base = ctx.binding(&renamed);
            emit_indexed(ctx, base, &lval.indices, shape.len(), false)
        }
        Symbol::FuncParamArrayVar { shape } => {
            let renamed = ctx.scopes.rename(&lval.name).unwrap();
            let slot = ctx.binding(&renamed);
            let ptr_ty = ctx.prog.value(slot).ty.pointee().cloned().unwrap();
            let ptr = ctx.emit(ValueKind::Load(slot), ptr_ty);
            if lval.indices.is_empty() {
                return Ok(ptr);
            }
            emit_indexed(ctx, ptr, &lval.indices, shape.len(), true)
        }
        Symbol::ArrayPtr { elem_shape } => {
            let renamed = ctx.scopes.rename(&lval.name).unwrap();
            let slot = ctx.binding(&renamed);
            let ptr_ty = ctx.prog.value(slot).ty.pointee().cloned().unwrap();
            let ptr = ctx.emit(ValueKind::Load(slot), ptr_ty);
            if lval.indices.is_empty() {
                return Ok(ptr);
            }
            emit_indexed(ctx, ptr, &lval.indices, elem_shape.len() + 1, true)
        }
        Symbol::Func { .. } => Err(CompileError::NotAVariable(lval.name.clone())),
        Symbol::Label(_) => unreachable!("loop-tag symbols are never referenced as lvalues"),
    }
}

/// Walk `indices` through `base` (already a pointer) with `getelemptr`, using
/// `getptr` for the very first step when `first_is_decayed` (a
/// function-parameter array's already-loaded pointer). If fewer indices are
/// given than `total_dims`, append one more `getelemptr ..., 0` to decay the
/// remaining array-typed location into a pointer — the partial-reference
/// rule `spec.md` §9 flags (array-to-pointer decay always peels exactly one
/// more dimension than was explicitly indexed, never "the rest of them").
fn emit_indexed(
    ctx: &mut Ctx,
    base: ValueId,
    indices: &[Expr],
    total_dims: usize,
    first_is_decayed: bool,
) -> Result<ValueId> {
    let mut cur = base;
    let mut cur_ty = ctx.prog.value(base).ty.clone();
    for (i, idx_expr) in indices.iter().enumerate() {
        let idx = emit_expr(ctx, idx_expr)?;
        let elem_ty = step_elem_ty(&cur_ty);
        let kind = if i == 0 && first_is_decayed {
            ValueKind::GetPtr { src: cur, index: idx }
        } else {
            ValueKind::GetElemPtr { src: cur, index: idx }
        };
        cur = ctx.emit(kind, elem_ty.clone());
        cur_ty = elem_ty;
    }
    if indices.len() == total_dims {
        Ok(ctx.emit(ValueKind::Load(cur), Type::Int32))
    } else {
        let zero = ctx.const_int(0);
        let elem_ty = step_elem_ty(&cur_ty);
        Ok(ctx.emit(
            ValueKind::GetElemPtr {
                src: cur,
                index: zero,
            },
            elem_ty,
        ))
    }
}

/// `lval` as an assignment target: the pointer its final store should target
/// (always fully indexed — `spec.md`'s grammar never allows a partial index
/// on the left of `=`).
pub fn emit_lval_addr(ctx: &mut Ctx, lval: &LVal) -> Result<ValueId> {
    let sym = ctx
        .scopes
        .query(&lval.name)
        .ok_or_else(|| CompileError::UnresolvedIdent(lval.name.clone()))?
        .clone();
    match sym {
        Symbol::Const(_) => Err(CompileError::NotAVariable(lval.name.clone())),
        Symbol::Var { .. } | Symbol::FuncParamVar => {
            let renamed = ctx.scopes.rename(&lval.name).unwrap();
            Ok(ctx.binding(&renamed))
        }
        Symbol::Array { .. } | Symbol::FuncParamArrayVar { .. } | Symbol::ArrayPtr { .. } => {
            emit_indexed_addr(ctx, lval)
        }
        Symbol::Func { .. } => Err(CompileError::NotAVariable(lval.name.clone())),
        Symbol::Label(_) => unreachable!(),
    }
}

fn emit_indexed_addr(ctx: &mut Ctx, lval: &LVal) -> Result<ValueId> {
    let sym = ctx.scopes.query(&lval.name).unwrap().clone();
    let (base, first_is_decayed) = match &sym {
        Symbol::Array { .. } => {
            let renamed = ctx.scopes.rename(&lval.name).unwrap();
            (ctx.binding(&renamed), false)
        }
        Symbol::FuncParamArrayVar { .. } | Symbol::ArrayPtr { .. } => {
            let renamed = ctx.scopes.rename(&lval.name).unwrap();
            let slot = ctx.binding(&renamed);
            let ptr_ty = ctx.prog.value(slot).ty.pointee().cloned().unwrap();
            (ctx.emit(ValueKind::Load(slot), ptr_ty), true)
        }
        _ => unreachable!(),
    };
    let mut cur = base;
    let mut cur_ty = ctx.prog.value(base).ty.clone();
    for (i, idx_expr) in lval.indices.iter().enumerate() {
        let idx = emit_expr(ctx, idx_expr)?;
        let elem_ty = step_elem_ty(&cur_ty);
        let kind = if i == 0 && first_is_decayed {
            ValueKind::GetPtr { src: cur, index: idx }
        } else {
            ValueKind::GetElemPtr { src: cur, index: idx }
        };
        cur = ctx.emit(kind, elem_ty.clone());
        cur_ty = elem_ty;
    }
    Ok(cur)
}
