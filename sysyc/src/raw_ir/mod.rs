//! The in-memory Koopa IR graph: arena-allocated values and basic blocks
//! (`spec.md` §3, §9). `emit` builds a `Program` by walking the AST;
//! `printer` turns it into the textual form `spec.md` §4.2 defines;
//! `codegen` walks it directly to produce RISC-V, never through text.
//! `parse` is the inverse of `printer`, used to check the round-trip
//! property in tests (`spec.md` §8).

pub mod function;
pub mod parse;
pub mod printer;
pub mod program;
pub mod types;
pub mod value;

pub use function::{BasicBlockData, FunctionData};
pub use parse::{parse_program, IrParseError};
pub use printer::print_program;
pub use program::Program;
pub use types::Type;
pub use value::{BinOp, BlockId, ValueData, ValueId, ValueKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_minimal_program() {
        let mut prog = Program::new();
        let func = function::FunctionData {
            name: "main".to_string(),
            param_tys: vec![],
            param_values: vec![],
            ret_ty: Type::Int32,
            blocks: vec![],
        };
        let idx = prog.new_function(func);
        let entry = prog.new_block("%entry");
        prog.function_mut(idx).blocks.push(entry);
        let lit = prog.new_value(ValueData::unnamed(ValueKind::Integer(7), Type::Int32));
        let ret = prog.new_value(ValueData::unnamed(ValueKind::Return(Some(lit)), Type::Unit));
        prog.push_inst(entry, ret);

        let text = print_program(&prog);
        assert_eq!(text, "fun @main(): i32 {\n%entry:\n  ret 7\n}\n");

        let reparsed = parse_program(&text).unwrap();
        assert_eq!(print_program(&reparsed), text);
    }

    #[test]
    fn program_round_trips_through_json() {
        let unit = sysyc_parser::parse("int main(){ int a[2]={1,2}; return a[1]; }").unwrap();
        let prog = crate::emit::compile(&unit).unwrap();
        let json = serde_json::to_string(&prog).unwrap();
        let reparsed: Program = serde_json::from_str(&json).unwrap();
        assert_eq!(print_program(&prog), print_program(&reparsed));
    }

    #[test]
    fn round_trips_a_decl_with_parameter_types() {
        let mut prog = Program::new();
        prog.new_function(function::FunctionData {
            name: "getarray".to_string(),
            param_tys: vec![Type::Pointer(Box::new(Type::Int32))],
            param_values: vec![],
            ret_ty: Type::Int32,
            blocks: vec![],
        });
        prog.new_function(function::FunctionData {
            name: "putarray".to_string(),
            param_tys: vec![Type::Int32, Type::Pointer(Box::new(Type::Int32))],
            param_values: vec![],
            ret_ty: Type::Unit,
            blocks: vec![],
        });

        let text = print_program(&prog);
        assert_eq!(text, "decl @getarray(*i32): i32\n\ndecl @putarray(i32, *i32)\n");

        let reparsed = parse_program(&text).unwrap();
        assert_eq!(print_program(&reparsed), text);
    }
}
