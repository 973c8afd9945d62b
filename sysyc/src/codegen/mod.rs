//! Koopa IR -> RISC-V assembly (`spec.md` §4.5). A single pass over the raw
//! IR `Program`: for each function, the `FramePlan` (`crate::frame`) is
//! computed once, then every instruction in every block is lowered in
//! emission order. No value is ever kept live in a register across
//! instructions — every def writes back to its frame slot and every use
//! reloads from it (`spec.md` §4.5, "Register usage") — which is what makes
//! a single forward pass sufficient with no liveness analysis.

mod asm;
mod function;
mod global;
mod inst;
mod registers;

use crate::raw_ir::Program;

pub use registers::RegBank;

/// Knobs for the RISC-V backend. Trimmed from the teacher's
/// `aot::codegen::CodegenConfig`: `debug_assertions`/`runtime_checks`/
/// `pure_rust` encode Julia's dynamic-dispatch concerns, which this backend
/// has no counterpart for, so only the two fields this backend actually
/// consults survive (noted in `DESIGN.md`).
#[derive(Debug, Clone)]
pub struct CodegenConfig {
    /// Annotate each lowered IR instruction with a `# <op> ...` comment
    /// above its emitted assembly.
    pub emit_comments: bool,
    /// Indentation used for instruction lines (directives and labels are
    /// never indented, matching GNU `as` convention).
    pub indent: String,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            emit_comments: false,
            indent: "  ".to_string(),
        }
    }
}

impl CodegenConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotate emitted assembly with the IR instruction each block
    /// originated from; useful when reading generated code by hand.
    pub fn with_comments() -> Self {
        Self {
            emit_comments: true,
            ..Self::default()
        }
    }
}

/// Lower a whole Koopa IR `Program` to RISC-V assembly text, default config.
pub fn generate(prog: &Program) -> String {
    generate_with_config(prog, &CodegenConfig::default())
}

pub fn generate_with_config(prog: &Program, config: &CodegenConfig) -> String {
    let mut out = String::new();

    if !prog.globals.is_empty() {
        for &g in &prog.globals {
            global::emit_global(prog, g, &mut out);
        }
        out.push('\n');
    }

    let mut first = true;
    for func in prog.functions() {
        if func.is_declaration() {
            continue;
        }
        if !first {
            out.push('\n');
        }
        first = false;
        function::emit_function(prog, func, config, &mut out);
    }

    out
}
