// Prevent accidental debug output in library code (Issue #2888).
// CLI binaries (bin/) may use eprintln!() for user-facing error messages.
#![deny(clippy::print_stderr)]

//! AST -> Koopa IR -> RISC-V compiler for the SysY language.
//!
//! [`compile_to_ir`] and [`compile_to_riscv`] are the two entry points;
//! everything else is exposed for the `compiler` binary and for tests that
//! want to inspect an intermediate stage.

pub mod compile_error;
pub mod emit;
pub mod frame;
pub mod raw_ir;
pub mod scope;
pub mod slot;

pub mod codegen;

pub use compile_error::{CompileError, Result as CompileResult};
pub use raw_ir::Program as IrProgram;

/// Compile SysY source all the way to a Koopa IR `Program`.
pub fn compile_to_ir(source: &str) -> CompileResult<IrProgram> {
    let unit = sysyc_parser::parse(source).map_err(|e| CompileError::InvalidSyntax(e.to_string()))?;
    emit::compile(&unit)
}

/// Compile SysY source all the way to RISC-V assembly text.
pub fn compile_to_riscv(source: &str) -> CompileResult<String> {
    let prog = compile_to_ir(source)?;
    Ok(codegen::generate(&prog))
}
