//! Global data emission (`spec.md` §4.5, the `GlobalAlloc` row): `.data`,
//! `.globl`, a label, and the initialiser body — `.word` per integer leaf,
//! recursing through `Aggregate`, or a single `.zero` for an all-zero
//! array/scalar.

use std::fmt::Write;

use crate::raw_ir::{Program, Type, ValueId, ValueKind};

pub fn emit_global(prog: &Program, id: ValueId, out: &mut String) {
    let data = prog.value(id);
    let name = data.name.as_deref().expect("global missing a name");
    let ValueKind::GlobalAlloc(init) = data.kind else {
        unreachable!("Program::globals must only contain GlobalAlloc values")
    };
    let payload_ty = match &data.ty {
        Type::Pointer(inner) => inner.as_ref(),
        other => other,
    };

    writeln!(out, "  .data").unwrap();
    writeln!(out, "  .globl {name}").unwrap();
    writeln!(out, "{name}:").unwrap();
    emit_initializer(prog, init, payload_ty, out);
    out.push('\n');
}

fn emit_initializer(prog: &Program, id: ValueId, ty: &Type, out: &mut String) {
    match &prog.value(id).kind {
        ValueKind::Integer(n) => {
            writeln!(out, "  .word {n}").unwrap();
        }
        ValueKind::ZeroInit => {
            writeln!(out, "  .zero {}", ty.size_bytes()).unwrap();
        }
        ValueKind::Aggregate(elems) => {
            let elem_ty = ty.array_elem().cloned().unwrap_or(Type::Int32);
            for &e in elems {
                emit_initializer(prog, e, &elem_ty, out);
            }
        }
        other => unreachable!("{other:?} is not a valid global initialiser"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::compile;
    use crate::raw_ir::print_program;

    #[test]
    fn scalar_global_emits_a_single_word() {
        let unit = sysyc_parser::parse("int g = 5; int main(){ return g; }").unwrap();
        let prog = compile(&unit).unwrap();
        let mut out = String::new();
        emit_global(&prog, prog.globals[0], &mut out);
        assert!(out.contains(".word 5"), "{out}");
        assert!(out.contains(".globl g_"), "{out}");
    }

    #[test]
    fn zero_initialised_array_emits_a_single_zero_directive() {
        let unit = sysyc_parser::parse("int a[4]; int main(){ return a[0]; }").unwrap();
        let prog = compile(&unit).unwrap();
        let mut out = String::new();
        emit_global(&prog, prog.globals[0], &mut out);
        assert!(out.contains(".zero 16"), "{out}");
    }

    #[test]
    fn partially_initialised_array_fills_the_tail_with_word_zero() {
        let unit = sysyc_parser::parse("int a[4] = {1, 2}; int main(){ return a[0]; }").unwrap();
        let prog = compile(&unit).unwrap();
        let mut out = String::new();
        emit_global(&prog, prog.globals[0], &mut out);
        assert_eq!(out.matches(".word").count(), 4, "{out}");
        assert!(out.contains(".word 1"), "{out}");
        assert!(out.contains(".word 2"), "{out}");
        let _ = print_program(&prog);
    }
}
