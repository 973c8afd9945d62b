//! Function definition lowering: signature, parameter prologue, and body
//! (`spec.md` §4.2, "Locals and parameters").

use sysyc_parser::ast::{BaseType, FuncDef};

use crate::compile_error::Result;
use crate::raw_ir::{FunctionData, Type, ValueData, ValueId, ValueKind};
use crate::scope::Symbol;

use super::context::Ctx;
use super::stmt::lower_block;

fn ret_ty(bt: BaseType) -> Type {
    match bt {
        BaseType::Int => Type::Int32,
        BaseType::Void => Type::Unit,
    }
}

pub fn lower_func_def(ctx: &mut Ctx, f: &FuncDef) -> Result<()> {
    let mut param_tys = Vec::with_capacity(f.params.len());
    for p in &f.params {
        param_tys.push(if p.is_array {
            let trailing: Vec<usize> = p
                .shape
                .iter()
                .map(|e| super::expr::eval(ctx, e).expect("array param dims are constant") as usize)
                .collect();
            Type::decayed_ptr(&trailing)
        } else {
            Type::Int32
        });
    }

    let data = FunctionData {
        name: f.name.clone(),
        param_tys: param_tys.clone(),
        param_values: Vec::new(),
        ret_ty: ret_ty(f.ret_ty),
        blocks: Vec::new(),
    };
    let idx = ctx.prog.new_function(data);

    let mut arg_refs: Vec<ValueId> = Vec::with_capacity(f.params.len());
    for (i, (p, ty)) in f.params.iter().zip(&param_tys).enumerate() {
        let v = ctx
            .prog
            .new_value(ValueData::named(ValueKind::FuncArgRef(i as u32), ty.clone(), p.name.clone()));
        arg_refs.push(v);
    }
    ctx.prog.function_mut(idx).param_values = arg_refs.clone();

    ctx.enter_function(idx);
    ctx.push_scope();
    let entry = ctx.new_block("%entry");
    ctx.switch_to(entry);

    for (p, (ty, &arg_ref)) in f.params.iter().zip(param_tys.iter().zip(&arg_refs)) {
        if p.is_array {
            let mut shape = vec![0i32];
            shape.extend(p.shape.iter().map(|e| super::expr::eval(ctx, e).unwrap()));
            ctx.scopes.insert(&p.name, Symbol::FuncParamArrayVar { shape });
        } else {
            ctx.scopes.insert(&p.name, Symbol::Var { is_global: false });
        }
        let renamed = ctx.scopes.rename(&p.name).unwrap();
        let slot = ctx.emit_named(ValueKind::Alloc, Type::Pointer(Box::new(ty.clone())), renamed.clone());
        ctx.bind(renamed, slot);
        ctx.emit_void(ValueKind::Store {
            value: arg_ref,
            dest: slot,
        });
    }

    ctx.scopes.ban_push();
    // `lower_block` pushes (a no-op, thanks to `ban_push`) and pops a scope
    // of its own; that pop is what actually closes the parameter scope we
    // opened above, so there is no matching `pop_scope` call after it here.
    lower_block(ctx, &f.body)?;

    if !ctx.current_block_terminated() {
        let default = match f.ret_ty {
            BaseType::Void => None,
            BaseType::Int => Some(ctx.const_int(0)),
        };
        ctx.emit_void(ValueKind::Return(default));
    }

    ctx.leave_function();
    Ok(())
}
