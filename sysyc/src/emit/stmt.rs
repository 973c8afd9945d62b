//! Statement lowering: structured control flow and the `hasRetStmt`-style
//! fallthrough bookkeeping `spec.md` §4.2 describes ("If / While").

use sysyc_parser::ast::{Block, BlockItem, Stmt};

use crate::compile_error::{CompileError, Result};
use crate::raw_ir::ValueKind;
use crate::scope::{Symbol, LOOP_BODY, LOOP_END, LOOP_ENTRY};

use super::context::Ctx;
use super::decl::lower_decl;
use super::expr::{emit_expr, emit_lval_addr};

pub fn lower_block(ctx: &mut Ctx, block: &Block) -> Result<()> {
    ctx.push_scope();
    for item in &block.items {
        match item {
            BlockItem::Decl(d) => lower_decl(ctx, d)?,
            BlockItem::Stmt(s) => lower_stmt(ctx, s)?,
        }
    }
    ctx.pop_scope();
    Ok(())
}

pub fn lower_stmt(ctx: &mut Ctx, stmt: &Stmt) -> Result<()> {
    match stmt {
        Stmt::Assign { target, value, .. } => {
            let v = emit_expr(ctx, value)?;
            let addr = emit_lval_addr(ctx, target)?;
            ctx.emit_void(ValueKind::Store { value: v, dest: addr });
            Ok(())
        }
        Stmt::ExprStmt(e) => {
            emit_expr(ctx, e)?;
            Ok(())
        }
        Stmt::Null => Ok(()),
        Stmt::Block(b) => lower_block(ctx, b),
        Stmt::If {
            cond,
            then_branch,
            else_branch,
            ..
        } => lower_if(ctx, cond, then_branch, else_branch.as_deref()),
        Stmt::While { cond, body, .. } => lower_while(ctx, cond, body),
        Stmt::Break(_) => lower_loop_jump(ctx, LOOP_END, CompileError::BreakOutsideLoop),
        Stmt::Continue(_) => lower_loop_jump(ctx, LOOP_ENTRY, CompileError::ContinueOutsideLoop),
        Stmt::Return { value, .. } => {
            let v = match value {
                Some(e) => Some(emit_expr(ctx, e)?),
                None => None,
            };
            ctx.emit_void(ValueKind::Return(v));
            Ok(())
        }
    }
}

fn lower_if(
    ctx: &mut Ctx,
    cond: &sysyc_parser::ast::Expr,
    then_branch: &Stmt,
    else_branch: Option<&Stmt>,
) -> Result<()> {
    let cond_val = emit_expr(ctx, cond)?;
    let then_label = ctx.fresh_label("then");
    let then_bb = ctx.new_block(&then_label);
    let else_bb = else_branch.map(|_| {
        let label = ctx.fresh_label("else");
        ctx.new_block(&label)
    });
    let end_label = ctx.fresh_label("end");
    let end_bb = ctx.new_block(&end_label);

    ctx.emit_void(ValueKind::Branch {
        cond: cond_val,
        then_bb,
        else_bb: else_bb.unwrap_or(end_bb),
    });

    ctx.switch_to(then_bb);
    lower_stmt(ctx, then_branch)?;
    if !ctx.current_block_terminated() {
        ctx.emit_void(ValueKind::Jump(end_bb));
    }

    if let (Some(else_bb), Some(else_branch)) = (else_bb, else_branch) {
        ctx.switch_to(else_bb);
        lower_stmt(ctx, else_branch)?;
        if !ctx.current_block_terminated() {
            ctx.emit_void(ValueKind::Jump(end_bb));
        }
    }

    ctx.switch_to(end_bb);
    Ok(())
}

fn lower_while(ctx: &mut Ctx, cond: &sysyc_parser::ast::Expr, body: &Stmt) -> Result<()> {
    let entry_label = ctx.fresh_label("while_entry");
    let entry_bb = ctx.new_block(&entry_label);
    let body_label = ctx.fresh_label("while_body");
    let body_bb = ctx.new_block(&body_label);
    let end_label = ctx.fresh_label("while_end");
    let end_bb = ctx.new_block(&end_label);

    ctx.emit_void(ValueKind::Jump(entry_bb));
    ctx.switch_to(entry_bb);
    let cond_val = emit_expr(ctx, cond)?;
    ctx.emit_void(ValueKind::Branch {
        cond: cond_val,
        then_bb: body_bb,
        else_bb: end_bb,
    });

    ctx.switch_to(body_bb);
    ctx.push_scope();
    ctx.scopes.insert(LOOP_ENTRY, Symbol::Label(entry_label));
    ctx.scopes.insert(LOOP_BODY, Symbol::Label(body_label));
    ctx.scopes.insert(LOOP_END, Symbol::Label(end_label));
    // Only a braced body shares this scope (and consumes the ban); a bare
    // single statement never calls `push_scope` itself, so arming the ban
    // here would incorrectly swallow some later, unrelated block's push.
    let body_is_block = matches!(body, Stmt::Block(_));
    if body_is_block {
        ctx.scopes.ban_push();
    }
    lower_stmt(ctx, body)?;
    // A braced body already popped this scope itself (via the banned push
    // above); a bare statement never pushed one, so it's still ours to pop.
    if !body_is_block {
        ctx.pop_scope();
    }
    if !ctx.current_block_terminated() {
        ctx.emit_void(ValueKind::Jump(entry_bb));
    }

    ctx.switch_to(end_bb);
    Ok(())
}

fn lower_loop_jump(ctx: &mut Ctx, key: &str, err: CompileError) -> Result<()> {
    let Some(Symbol::Label(target_label)) = ctx.scopes.query(key).cloned() else {
        return Err(err);
    };
    let target = ctx.block_by_label(&target_label);
    ctx.emit_void(ValueKind::Jump(target));
    Ok(())
}
