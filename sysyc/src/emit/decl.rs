//! Declaration lowering: `const`/`var` scalars and arrays, both at global and
//! local scope (`spec.md` §4.2, "Locals and parameters" / "Array semantics"
//! / "Array initialisers").

use sysyc_parser::ast::{BaseType, Decl, DeclKind, Expr, Init};

use crate::compile_error::{CompileError, Result};
use crate::raw_ir::{Type, ValueData, ValueId, ValueKind};
use crate::scope::Symbol;

use super::context::Ctx;
use super::expr::{emit_expr, eval};

pub fn lower_decl(ctx: &mut Ctx, decl: &Decl) -> Result<()> {
    for def in &decl.defs {
        if def.shape.is_empty() {
            lower_scalar_def(ctx, decl.kind, &def.name, def.init.as_ref())?;
        } else {
            lower_array_def(ctx, decl.kind, &def.name, &def.shape, def.init.as_ref())?;
        }
    }
    let _ = decl.base_ty; // always BaseType::Int — SysY has no other declarable scalar type
    Ok(())
}

fn lower_scalar_def(ctx: &mut Ctx, kind: DeclKind, name: &str, init: Option<&Init>) -> Result<()> {
    if ctx.scopes.declared_in_current_scope(name) {
        return Err(CompileError::Redefinition(name.to_string()));
    }
    let init_expr = match init {
        Some(Init::Expr(e)) => Some(e),
        Some(Init::List(_)) => return Err(CompileError::InvalidArrayDimension(0)),
        None => None,
    };

    if matches!(kind, DeclKind::Const) {
        let e = init_expr.ok_or_else(|| CompileError::NotConstant(name.to_string()))?;
        let v = eval(ctx, e).ok_or_else(|| CompileError::NotConstant(name.to_string()))?;
        ctx.scopes.insert(name, Symbol::Const(v));
        return Ok(());
    }

    let is_global = ctx.scopes.is_global();
    ctx.scopes.insert(name, Symbol::Var { is_global });
    let renamed = ctx.scopes.rename(name).unwrap();

    if is_global {
        let v = match init_expr {
            Some(e) => eval(ctx, e).ok_or_else(|| CompileError::NotConstant(name.to_string()))?,
            None => 0,
        };
        let init_val = ctx.const_int(v);
        let slot = ctx.prog.new_value(ValueData::named(
            ValueKind::GlobalAlloc(init_val),
            Type::Pointer(Box::new(Type::Int32)),
            renamed.clone(),
        ));
        ctx.prog.globals.push(slot);
        ctx.bind(renamed, slot);
    } else {
        let slot = ctx.emit_named(ValueKind::Alloc, Type::Pointer(Box::new(Type::Int32)), renamed.clone());
        ctx.bind(renamed, slot);
        if let Some(e) = init_expr {
            let v = emit_expr(ctx, e)?;
            ctx.emit_void(ValueKind::Store { value: v, dest: slot });
        }
    }
    Ok(())
}

fn lower_array_def(
    ctx: &mut Ctx,
    _kind: DeclKind,
    name: &str,
    shape_exprs: &[Expr],
    init: Option<&Init>,
) -> Result<()> {
    if ctx.scopes.declared_in_current_scope(name) {
        return Err(CompileError::Redefinition(name.to_string()));
    }
    let shape = const_dims(ctx, shape_exprs)?;
    let shape_usize: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
    let is_global = ctx.scopes.is_global();
    ctx.scopes.insert(
        name,
        Symbol::Array {
            shape: shape.clone(),
            is_global,
        },
    );
    let renamed = ctx.scopes.rename(name).unwrap();
    let ty = Type::array_of(&shape_usize);

    if is_global {
        let flat = match init {
            Some(i) => flatten_array_init(i, &shape_usize),
            None => vec![None; shape_usize.iter().product()],
        };
        let init_val = build_global_aggregate(ctx, &flat, &shape_usize, name)?;
        let slot = ctx.prog.new_value(ValueData::named(
            ValueKind::GlobalAlloc(init_val),
            Type::Pointer(Box::new(ty)),
            renamed.clone(),
        ));
        ctx.prog.globals.push(slot);
        ctx.bind(renamed, slot);
        return Ok(());
    }

    let slot = ctx.emit_named(ValueKind::Alloc, Type::Pointer(Box::new(ty.clone())), renamed.clone());
    ctx.bind(renamed, slot);
    let Some(init) = init else { return Ok(()) };

    let zero = ctx.prog.new_value(ValueData::unnamed(ValueKind::ZeroInit, ty));
    ctx.emit_void(ValueKind::Store { value: zero, dest: slot });

    let flat = flatten_array_init(init, &shape_usize);
    for (i, elem) in flat.iter().enumerate() {
        let Some(expr) = elem else { continue };
        if eval(ctx, expr) == Some(0) {
            continue;
        }
        let value = emit_expr(ctx, expr)?;
        let indices = unravel(i, &shape_usize);
        let addr = elem_addr(ctx, slot, &indices);
        ctx.emit_void(ValueKind::Store { value, dest: addr });
    }
    Ok(())
}

/// Constant-fold every dimension expression; SysY array bounds must be known
/// at compile time (`spec.md` §4.2: "Required in three places: array
/// dimension sizes; ...").
fn const_dims(ctx: &Ctx, exprs: &[Expr]) -> Result<Vec<i32>> {
    exprs
        .iter()
        .map(|e| {
            let v = eval(ctx, e).ok_or_else(|| CompileError::NotConstant("<array dimension>".to_string()))?;
            if v < 0 {
                return Err(CompileError::InvalidArrayDimension(v));
            }
            Ok(v)
        })
        .collect()
}

/// Flatten a (possibly nested) brace initialiser into a row-major vector of
/// length `Π shape`, `None` marking an omitted (implicitly zero) slot
/// (`spec.md` §4.2, "Array initialisers").
pub fn flatten_array_init<'a>(init: &'a Init, shape: &[usize]) -> Vec<Option<&'a Expr>> {
    let total: usize = shape.iter().product();
    let mut out = Vec::with_capacity(total);
    let owned;
    let elems: &[Init] = match init {
        Init::List(l) => l,
        Init::Expr(_) => {
            owned = [init.clone()];
            &owned
        }
    };
    let mut pos = 0usize;
    flatten_into(elems, shape, &mut pos, total, &mut out);
    while out.len() < total {
        out.push(None);
    }
    out
}

fn flatten_into<'a>(
    elems: &'a [Init],
    shape: &[usize],
    pos: &mut usize,
    total: usize,
    out: &mut Vec<Option<&'a Expr>>,
) {
    for elem in elems {
        if *pos >= total {
            break;
        }
        match elem {
            Init::Expr(e) => {
                out.push(Some(e));
                *pos += 1;
            }
            Init::List(sub) => {
                let mut chosen = shape.len().saturating_sub(1);
                for cand in (0..shape.len()).rev() {
                    let prod: usize = shape[cand..].iter().product();
                    if prod > 0 && *pos % prod == 0 {
                        chosen = cand;
                        break;
                    }
                }
                let sub_shape = &shape[chosen..];
                let sub_total: usize = sub_shape.iter().product();
                let mut sub_pos = 0usize;
                flatten_into(sub, sub_shape, &mut sub_pos, sub_total, out);
                while sub_pos < sub_total {
                    out.push(None);
                    sub_pos += 1;
                }
                *pos += sub_total;
            }
        }
    }
}

fn unravel(mut i: usize, shape: &[usize]) -> Vec<i32> {
    let mut out = vec![0i32; shape.len()];
    for (k, &dim) in shape.iter().enumerate().rev() {
        out[k] = (i % dim) as i32;
        i /= dim;
    }
    out
}

fn elem_addr(ctx: &mut Ctx, base: ValueId, indices: &[i32]) -> ValueId {
    let mut cur = base;
    let mut cur_ty = ctx.prog.value(base).ty.clone();
    for &idx in indices {
        let inner = cur_ty.pointee().expect("array address must be a pointer");
        let elem = inner.array_elem().cloned().unwrap_or(Type::Int32);
        let elem_ty = Type::Pointer(Box::new(elem));
        let idx_val = ctx.const_int(idx);
        cur = ctx.emit(
            ValueKind::GetElemPtr {
                src: cur,
                index: idx_val,
            },
            elem_ty.clone(),
        );
        cur_ty = elem_ty;
    }
    cur
}

fn build_global_aggregate(
    ctx: &mut Ctx,
    flat: &[Option<&Expr>],
    shape: &[usize],
    name: &str,
) -> Result<ValueId> {
    if flat.iter().all(|e| e.is_none()) {
        let ty = Type::array_of(shape);
        return Ok(ctx.prog.new_value(ValueData::unnamed(ValueKind::ZeroInit, ty)));
    }
    build_aggregate_level(ctx, flat, shape, name)
}

fn build_aggregate_level(
    ctx: &mut Ctx,
    flat: &[Option<&Expr>],
    shape: &[usize],
    name: &str,
) -> Result<ValueId> {
    if shape.len() == 1 {
        let mut elems = Vec::with_capacity(shape[0]);
        for slot in flat {
            let v = match slot {
                Some(e) => eval(ctx, e).ok_or_else(|| CompileError::NotConstant(name.to_string()))?,
                None => 0,
            };
            elems.push(ctx.const_int(v));
        }
        return Ok(ctx
            .prog
            .new_value(ValueData::unnamed(ValueKind::Aggregate(elems), Type::array_of(shape))));
    }
    let chunk: usize = shape[1..].iter().product();
    let mut elems = Vec::with_capacity(shape[0]);
    for piece in flat.chunks(chunk) {
        elems.push(build_aggregate_level(ctx, piece, &shape[1..], name)?);
    }
    Ok(ctx
        .prog
        .new_value(ValueData::unnamed(ValueKind::Aggregate(elems), Type::array_of(shape))))
}

/// Register the fixed SysY I/O runtime (`spec.md` §4.2, "Lib functions") as
/// `decl`s, and bind each in the global scope so calls resolve normally.
pub fn register_lib_functions(ctx: &mut Ctx) {
    let sigs: &[(&str, &[Type], Type)] = &[
        ("getint", &[], Type::Int32),
        ("getch", &[], Type::Int32),
        ("getarray", &[Type::Pointer(Box::new(Type::Int32))], Type::Int32),
        ("putint", &[Type::Int32], Type::Unit),
        ("putch", &[Type::Int32], Type::Unit),
        (
            "putarray",
            &[Type::Int32, Type::Pointer(Box::new(Type::Int32))],
            Type::Unit,
        ),
        ("starttime", &[], Type::Unit),
        ("stoptime", &[], Type::Unit),
    ];
    for (name, params, ret) in sigs {
        let ret_ty = if matches!(ret, Type::Unit) {
            BaseType::Void
        } else {
            BaseType::Int
        };
        ctx.scopes.insert(
            name,
            Symbol::Func {
                ret_ty,
                param_count: params.len(),
            },
        );
        let data = crate::raw_ir::FunctionData {
            name: name.to_string(),
            param_tys: params.to_vec(),
            param_values: Vec::new(),
            ret_ty: ret.clone(),
            blocks: Vec::new(),
        };
        ctx.prog.new_function(data);
    }
}
