//! Integration tests: the six end-to-end scenarios source -> IR -> assembly.

use sysyc::raw_ir::{parse_program, print_program};
use sysyc::{compile_to_ir, compile_to_riscv};

#[test]
fn constant_expression_folds_and_loads_immediate() {
    let ir = compile_to_ir("int main(){ return 1+2*3; }").unwrap();
    let text = print_program(&ir);
    assert!(text.trim_end().ends_with("ret 7\n}") || text.contains("ret 7"), "{text}");

    let asm = compile_to_riscv("int main(){ return 1+2*3; }").unwrap();
    assert!(asm.contains("li a0, 7"), "{asm}");
}

#[test]
fn locals_are_allocated_and_added() {
    let text = print_program(&compile_to_ir("int main(){ int a=1; int b=2; return a+b; }").unwrap());
    assert_eq!(text.matches("= alloc i32").count(), 2);
    assert!(text.contains("= add "), "{text}");
    assert!(text.trim_end().ends_with("}") && text.contains("ret %"), "{text}");
}

#[test]
fn or_short_circuit_builds_a_four_block_diamond_and_assigns() {
    let text = print_program(
        &compile_to_ir("int main(){ int a=0; if(1||a) a=1; return a; }").unwrap(),
    );
    assert!(text.contains("shortcut_then_or"), "{text}");
    assert!(text.contains("shortcut_else_or"), "{text}");
    assert!(text.contains("shortcut_end_or"), "{text}");
    assert_eq!(text.matches("= alloc i32").count(), 2, "{text}");
}

#[test]
fn while_loop_emits_entry_body_end_labels() {
    let src = "int main(){ int i=0; int s=0; while(i<10){s=s+i; i=i+1;} return s; }";
    let text = print_program(&compile_to_ir(src).unwrap());
    assert!(text.contains("while_entry_"), "{text}");
    assert!(text.contains("while_body_"), "{text}");
    assert!(text.contains("while_end_"), "{text}");

    let asm = compile_to_riscv(src).unwrap();
    assert!(asm.contains("main:"), "{asm}");
}

#[test]
fn nested_array_initialiser_flattens_row_major_and_stores_six_elements() {
    let src = "int main(){ int a[2][3]={{1,2,3},{4,5,6}}; return a[1][2]; }";
    let text = print_program(&compile_to_ir(src).unwrap());
    assert!(text.contains("store zeroinit"), "{text}");
    assert_eq!(text.matches("store ").count() - 1, 6, "{text}");
}

#[test]
fn array_parameter_decays_through_getelemptr_then_getptr() {
    let src = "int f(int a[]){return a[2];} int main(){int x[4]={1,2,3,4}; return f(x);}";
    let text = print_program(&compile_to_ir(src).unwrap());
    assert!(text.contains("getelemptr"), "{text}");
    assert!(text.contains("getptr"), "{text}");
}

#[test]
fn ir_text_round_trips_through_the_raw_parser() {
    let src = "int f(int a[]){return a[2];} int main(){int x[4]={1,2,3,4}; return f(x);}";
    let ir = compile_to_ir(src).unwrap();
    let text = print_program(&ir);

    let reparsed = parse_program(&text).unwrap();
    assert_eq!(print_program(&reparsed), text);
}

#[test]
fn missing_main_is_rejected() {
    assert!(compile_to_ir("int f(){ return 0; }").is_err());
}

#[test]
fn redefining_a_name_in_the_same_scope_is_rejected() {
    assert!(compile_to_ir("int main(){ int a=1; int a=2; return a; }").is_err());
}

#[test]
fn break_outside_a_loop_is_rejected() {
    assert!(compile_to_ir("int main(){ break; return 0; }").is_err());
}
