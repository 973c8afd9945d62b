//! Per-function lowering: prologue, the block walk, and epilogue
//! (`spec.md` §4.5: "Prologue", `return` row).

use std::fmt::Write as _;

use crate::frame::{plan_function, FramePlan};
use crate::raw_ir::{FunctionData, Program};

use super::asm;
use super::inst::emit_inst;
use super::registers::RegBank;
use super::CodegenConfig;

/// Threaded through every instruction lowering function in `inst`: the
/// program being compiled, this function's frame plan, a fresh `RegBank`
/// reset before each top-level instruction, and the output buffer.
pub struct Emitter<'a> {
    pub prog: &'a Program,
    pub plan: &'a FramePlan,
    pub config: &'a CodegenConfig,
    pub regs: RegBank,
    pub out: &'a mut String,
}

impl Emitter<'_> {
    pub fn writeln(&mut self, line: impl AsRef<str>) {
        self.out.push_str(line.as_ref());
        self.out.push('\n');
    }

    /// Emit one indented instruction line, using this backend's configured
    /// indent rather than a hardcoded width.
    pub fn instr(&mut self, body: impl AsRef<str>) {
        self.out.push_str(&self.config.indent);
        self.out.push_str(body.as_ref());
        self.out.push('\n');
    }
}

pub fn emit_function(prog: &Program, func: &FunctionData, config: &CodegenConfig, out: &mut String) {
    let plan = plan_function(prog, func);
    let name = &func.name;

    writeln!(out, "  .text").unwrap();
    writeln!(out, "  .globl {name}").unwrap();
    writeln!(out, "{name}:").unwrap();

    emit_prologue(&plan, out);

    let mut emitter = Emitter {
        prog,
        plan: &plan,
        config,
        regs: RegBank::new(),
        out,
    };

    for (i, &block) in func.blocks.iter().enumerate() {
        let data = prog.block(block);
        // A join block every predecessor's early `return` made unreachable
        // is never populated (`spec.md` §3: "each basic block ends in
        // exactly one terminator" — an empty one never ran).
        if data.insts.is_empty() {
            continue;
        }
        // The entry block needs no label: control falls into it directly
        // from the function's own `name:` label emitted above.
        if i > 0 {
            writeln!(emitter.out, "{}:", strip_sigil(&data.name)).unwrap();
        }
        for &inst in &data.insts {
            emitter.regs.reset();
            if config.emit_comments {
                writeln!(emitter.out, "  # {:?}", prog.value(inst).kind).unwrap();
            }
            emit_inst(&mut emitter, inst);
        }
    }
}

fn strip_sigil(label: &str) -> &str {
    label.strip_prefix('%').unwrap_or(label)
}

fn emit_prologue(plan: &FramePlan, out: &mut String) {
    if plan.frame_size == 0 {
        return;
    }
    asm::adjust_sp(out, -(plan.frame_size as i64), "t0");
    if plan.has_call {
        asm::store_word(out, "ra", plan.frame_size - 4, "t0");
    }
}

/// Restore `ra` (if this function calls out) and pop the frame; shared by
/// every `Return` lowering site (`inst::control`).
pub fn emit_epilogue(e: &mut Emitter) {
    if e.plan.has_call {
        asm::load_word(e.out, "ra", e.plan.frame_size - 4, "t0");
    }
    if e.plan.frame_size != 0 {
        asm::adjust_sp(e.out, e.plan.frame_size as i64, "t0");
    }
    e.writeln("  ret");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::compile;

    fn asm_of(src: &str) -> String {
        let unit = sysyc_parser::parse(src).unwrap();
        let prog = compile(&unit).unwrap();
        super::super::generate(&prog)
    }

    #[test]
    fn entry_block_has_no_label() {
        let text = asm_of("int main(){ return 7; }");
        assert!(!text.contains("entry:"), "{text}");
    }

    #[test]
    fn frameless_function_skips_sp_adjustment() {
        let text = asm_of("int main(){ return 7; }");
        assert!(!text.contains("sp, sp"), "{text}");
    }

    #[test]
    fn a_call_saves_and_restores_ra() {
        let text = asm_of("int f(){return 1;} int main(){ return f(); }");
        assert!(text.contains("sw ra,"), "{text}");
        assert!(text.contains("lw ra,"), "{text}");
    }
}
