//! Per-instruction RISC-V lowering (`spec.md` §4.5's instruction table),
//! grounded instruction-for-instruction on the reference compiler's
//! `Visit_*` dispatch (`RISCV.cpp`): every value that owns a frame slot
//! writes its result back to that slot before the next instruction runs, so
//! lowering one IR instruction never depends on where a prior one left a
//! register.

use crate::raw_ir::{BinOp, BlockId, Program, ValueId, ValueKind};

use super::asm;
use super::function::{emit_epilogue, Emitter};
use super::registers::arg_reg;

pub fn emit_inst(e: &mut Emitter, id: ValueId) {
    let kind = e.prog.value(id).kind.clone();
    match kind {
        // Reserves a frame slot only; the slot itself was already sized by
        // `crate::frame::plan_function`.
        ValueKind::Alloc => {}
        ValueKind::Load(src) => emit_load(e, id, src),
        ValueKind::Store { value, dest } => emit_store(e, value, dest),
        ValueKind::Binary { op, lhs, rhs } => emit_binary(e, id, op, lhs, rhs),
        ValueKind::Branch { cond, then_bb, else_bb } => emit_branch(e, cond, then_bb, else_bb),
        ValueKind::Jump(target) => emit_jump(e, target),
        ValueKind::Call { callee, args } => emit_call(e, id, &callee, &args),
        ValueKind::Return(value) => emit_return(e, value),
        ValueKind::GetElemPtr { src, index } | ValueKind::GetPtr { src, index } => {
            emit_address_step(e, id, src, index)
        }
        ValueKind::Integer(_) | ValueKind::ZeroInit | ValueKind::FuncArgRef(_) | ValueKind::GlobalAlloc(_) | ValueKind::Aggregate(_) => {
            unreachable!("{kind:?} never appears as a block-level instruction")
        }
    }
}

pub fn block_label(prog: &Program, id: BlockId) -> &str {
    let name = &prog.block(id).name;
    name.strip_prefix('%').unwrap_or(name)
}

/// Load `id`'s value into a fresh scratch register. Handles the three
/// operand shapes every instruction's operands reduce to: an inlined
/// literal, an incoming argument still sitting in its calling-convention
/// register or the caller's outgoing-argument area, or a prior instruction's
/// result in its own frame slot.
fn load_operand(e: &mut Emitter, id: ValueId) -> &'static str {
    if matches!(&e.prog.value(id).kind, ValueKind::Integer(0)) {
        return "x0";
    }
    let r = e.regs.next();
    load_operand_into(e, id, r);
    r
}

/// Land `id`'s value in a *specific* register rather than the next free
/// scratch — used to place call arguments directly into `a0..a7` without an
/// extra `mv`. Handles the same three operand shapes as `load_operand`: an
/// inlined literal, an incoming argument, or a prior instruction's slot.
fn load_operand_into(e: &mut Emitter, id: ValueId, reg: &'static str) {
    match &e.prog.value(id).kind {
        ValueKind::Integer(0) => {
            if reg != "x0" {
                e.instr(format!("li {reg}, 0"));
            }
        }
        ValueKind::Integer(n) => {
            let n = *n;
            e.instr(format!("li {reg}, {n}"));
        }
        ValueKind::FuncArgRef(i) => {
            let i = *i;
            if i < 8 {
                let src = arg_reg(i);
                if src != reg {
                    e.instr(format!("mv {reg}, {src}"));
                }
            } else {
                let off = (i - 8) * 4 + e.plan.frame_size;
                asm::load_word(e.out, reg, off, reg);
            }
        }
        _ => asm::load_word(e.out, reg, e.plan.offset(id), reg),
    }
}

/// Materialise the address `src` denotes into a fresh register: `alloc`'s
/// own slot address, a global's label, or a previously computed pointer
/// reloaded from its slot (`Load`/`GetElemPtr`/`GetPtr`'s result is always a
/// value sitting in its own slot like any other instruction).
fn load_address(e: &mut Emitter, src: ValueId) -> &'static str {
    match &e.prog.value(src).kind {
        ValueKind::Alloc => {
            let r = e.regs.next();
            asm::addr_of(e.out, r, e.plan.offset(src));
            r
        }
        ValueKind::GlobalAlloc(_) => {
            let name = e.prog.value(src).name.clone().expect("global missing a name");
            let r = e.regs.next();
            e.instr(format!("la {r}, {name}"));
            r
        }
        _ => {
            let r = e.regs.next();
            asm::load_word(e.out, r, e.plan.offset(src), r);
            r
        }
    }
}

fn emit_load(e: &mut Emitter, id: ValueId, src: ValueId) {
    let r = match &e.prog.value(src).kind {
        ValueKind::Alloc => {
            let r = e.regs.next();
            asm::load_word(e.out, r, e.plan.offset(src), r);
            r
        }
        ValueKind::GlobalAlloc(_) => {
            let name = e.prog.value(src).name.clone().expect("global missing a name");
            let r = e.regs.next();
            e.instr(format!("la {r}, {name}"));
            e.instr(format!("lw {r}, 0({r})"));
            r
        }
        // A `GetElemPtr`/`GetPtr` result is a pointer stored in its own
        // slot; reading through it means one load to fetch the address and
        // a second to dereference it.
        _ => {
            let r = e.regs.next();
            asm::load_word(e.out, r, e.plan.offset(src), r);
            e.instr(format!("lw {r}, 0({r})"));
            r
        }
    };
    let scratch = e.regs.next();
    asm::store_word(e.out, r, e.plan.offset(id), scratch);
}

fn emit_store(e: &mut Emitter, value: ValueId, dest: ValueId) {
    let vr = load_operand(e, value);
    match &e.prog.value(dest).kind {
        ValueKind::Alloc => {
            let scratch = e.regs.next();
            asm::store_word(e.out, vr, e.plan.offset(dest), scratch);
        }
        ValueKind::GlobalAlloc(_) => {
            let name = e.prog.value(dest).name.clone().expect("global missing a name");
            let ar = e.regs.next();
            e.instr(format!("la {ar}, {name}"));
            e.instr(format!("sw {vr}, 0({ar})"));
        }
        ValueKind::GetElemPtr { .. } | ValueKind::GetPtr { .. } => {
            let pr = e.regs.next();
            asm::load_word(e.out, pr, e.plan.offset(dest), pr);
            e.instr(format!("sw {vr}, 0({pr})"));
        }
        other => unreachable!("{other:?} is not a valid store destination"),
    }
}

fn emit_binary(e: &mut Emitter, id: ValueId, op: BinOp, lhs: ValueId, rhs: ValueId) {
    let l = load_operand(e, lhs);
    let r = load_operand(e, rhs);
    let d = e.regs.next();
    match op {
        BinOp::Add => e.instr(format!("add {d}, {l}, {r}")),
        BinOp::Sub => e.instr(format!("sub {d}, {l}, {r}")),
        BinOp::Mul => e.instr(format!("mul {d}, {l}, {r}")),
        BinOp::Div => e.instr(format!("div {d}, {l}, {r}")),
        BinOp::Mod => e.instr(format!("rem {d}, {l}, {r}")),
        BinOp::Eq => {
            e.instr(format!("xor {d}, {l}, {r}"));
            e.instr(format!("seqz {d}, {d}"));
        }
        BinOp::NotEq => {
            e.instr(format!("xor {d}, {l}, {r}"));
            e.instr(format!("snez {d}, {d}"));
        }
        BinOp::Lt => e.instr(format!("slt {d}, {l}, {r}")),
        BinOp::Gt => e.instr(format!("slt {d}, {r}, {l}")),
        BinOp::Le => {
            e.instr(format!("slt {d}, {r}, {l}"));
            e.instr(format!("xori {d}, {d}, 1"));
        }
        BinOp::Ge => {
            e.instr(format!("slt {d}, {l}, {r}"));
            e.instr(format!("xori {d}, {d}, 1"));
        }
        BinOp::And => {
            e.instr(format!("snez {d}, {l}"));
            let t = e.regs.next();
            e.instr(format!("snez {t}, {r}"));
            e.instr(format!("and {d}, {d}, {t}"));
        }
        BinOp::Or => {
            e.instr(format!("or {d}, {l}, {r}"));
            e.instr(format!("snez {d}, {d}"));
        }
    }
    let scratch = e.regs.next();
    asm::store_word(e.out, d, e.plan.offset(id), scratch);
}

fn emit_branch(e: &mut Emitter, cond: ValueId, then_bb: BlockId, else_bb: BlockId) {
    let r = load_operand(e, cond);
    let then_label = block_label(e.prog, then_bb).to_string();
    let else_label = block_label(e.prog, else_bb).to_string();
    e.instr(format!("bnez {r}, {then_label}"));
    e.instr(format!("j {else_label}"));
}

fn emit_jump(e: &mut Emitter, target: BlockId) {
    let label = block_label(e.prog, target).to_string();
    e.instr(format!("j {label}"));
}

/// `getelemptr`/`getptr`: the two operations compute the same thing — a
/// base address, stepped by `index * size_bytes(elem)` — and differ only in
/// which dimension of the source type they peel off, which is already
/// baked into the instruction's own result type by `crate::emit`.
fn emit_address_step(e: &mut Emitter, id: ValueId, src: ValueId, index: ValueId) {
    let base = load_address(e, src);
    let elem_size = e
        .prog
        .value(id)
        .ty
        .pointee()
        .map(|t| t.size_bytes())
        .unwrap_or(4) as i32;

    // A literal zero index needs no arithmetic at all — the common case for
    // a singly-indexed array whose remaining dimension is scalar.
    if matches!(&e.prog.value(index).kind, ValueKind::Integer(0)) {
        let scratch = e.regs.next();
        asm::store_word(e.out, base, e.plan.offset(id), scratch);
        return;
    }

    let idx = load_operand(e, index);
    let size_reg = e.regs.next();
    e.instr(format!("li {size_reg}, {elem_size}"));
    e.instr(format!("mul {size_reg}, {idx}, {size_reg}"));
    e.instr(format!("add {base}, {base}, {size_reg}"));
    let scratch = e.regs.next();
    asm::store_word(e.out, base, e.plan.offset(id), scratch);
}

fn emit_call(e: &mut Emitter, id: ValueId, callee: &str, args: &[ValueId]) {
    for (i, &arg) in args.iter().enumerate().take(8) {
        load_operand_into(e, arg, arg_reg(i as u32));
    }
    for (i, &arg) in args.iter().enumerate().skip(8) {
        let r = load_operand(e, arg);
        asm::store_word(e.out, r, ((i - 8) * 4) as u32, e.regs.next());
    }
    e.instr(format!("call {callee}"));
    if !matches!(e.prog.value(id).ty, crate::raw_ir::Type::Unit) {
        let scratch = e.regs.next();
        asm::store_word(e.out, "a0", e.plan.offset(id), scratch);
    }
}

fn emit_return(e: &mut Emitter, value: Option<ValueId>) {
    if let Some(v) = value {
        let r = load_operand(e, v);
        if r != "a0" {
            e.instr(format!("mv a0, {r}"));
        }
    }
    emit_epilogue(e);
}

#[cfg(test)]
mod tests {
    use crate::emit::compile;

    fn asm_of(src: &str) -> String {
        let unit = sysyc_parser::parse(src).unwrap();
        let prog = compile(&unit).unwrap();
        super::super::generate(&prog)
    }

    #[test]
    fn equality_lowers_to_xor_seqz() {
        let text = asm_of("int main(){ return 1 == 2; }");
        assert!(text.contains("xor"), "{text}");
        assert!(text.contains("seqz"), "{text}");
    }

    #[test]
    fn logical_and_lowers_to_double_snez() {
        let text = asm_of("int main(){ int a = 1; int b = 2; return a && b; }");
        assert!(text.matches("snez").count() >= 2, "{text}");
    }

    #[test]
    fn array_index_by_zero_skips_the_multiply() {
        let text = asm_of("int main(){ int a[4]; return a[0]; }");
        assert!(!text.contains("mul"), "{text}");
    }

    #[test]
    fn array_index_by_variable_multiplies_by_element_size() {
        let text = asm_of("int main(){ int a[4]; int i = 1; return a[i]; }");
        assert!(text.contains("mul"), "{text}");
        assert!(text.contains("li") && text.contains(", 4"), "{text}");
    }

    #[test]
    fn a_call_places_the_first_eight_args_in_argument_registers() {
        let text = asm_of("int f(int x){return x;} int main(){ return f(9); }");
        assert!(text.contains("li a0, 9"), "{text}");
        assert!(text.contains("call f"), "{text}");
    }

    #[test]
    fn a_non_literal_call_argument_is_loaded_from_its_slot() {
        let text = asm_of("int f(int x){return x;} int main(){ int a = getint(); return f(a); }");
        assert!(text.contains("lw a0,"), "{text}");
    }

    #[test]
    fn branch_tests_the_condition_then_jumps_both_ways() {
        let text = asm_of("int main(){ if (1) { return 1; } return 0; }");
        assert!(text.contains("bnez"), "{text}");
        assert!(text.contains("  j "), "{text}");
    }

    #[test]
    fn division_and_modulo_use_their_own_mnemonics() {
        let text = asm_of("int main(){ int a = 7; int b = 2; return a / b + a % b; }");
        assert!(text.contains("div"), "{text}");
        assert!(text.contains("rem"), "{text}");
    }
}
