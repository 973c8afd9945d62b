//! Top-level lowering: registers the library runtime, then lowers every
//! global declaration and function definition in source order
//! (`spec.md` §4.2, "Lib functions").

use sysyc_parser::ast::{CompUnit, Item};

use crate::compile_error::{CompileError, Result};
use crate::scope::Symbol;

use super::context::Ctx;
use super::decl::{lower_decl, register_lib_functions};
use super::func::lower_func_def;

pub fn lower_comp_unit(unit: &CompUnit) -> Result<Ctx> {
    let mut ctx = Ctx::new();
    ctx.push_scope();
    register_lib_functions(&mut ctx);

    for item in &unit.items {
        match item {
            Item::Decl(d) => lower_decl(&mut ctx, d)?,
            Item::FuncDef(f) => {
                ctx.scopes.insert(
                    &f.name,
                    Symbol::Func {
                        ret_ty: f.ret_ty,
                        param_count: f.params.len(),
                    },
                );
            }
        }
    }

    if !matches!(ctx.scopes.query("main"), Some(Symbol::Func { .. })) {
        return Err(CompileError::MissingMain);
    }

    for item in &unit.items {
        if let Item::FuncDef(f) = item {
            lower_func_def(&mut ctx, f)?;
        }
    }

    Ok(ctx)
}
