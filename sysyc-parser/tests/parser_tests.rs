use pretty_assertions::assert_eq;
use sysyc_parser::ast::{BaseType, DeclKind, Item, Stmt};
use sysyc_parser::parse;

#[test]
fn parses_main_returning_constant_expression() {
    let unit = parse("int main() { return 1 + 2 * 3; }").unwrap();
    assert_eq!(unit.items.len(), 1);
    let Item::FuncDef(func) = &unit.items[0] else {
        panic!("expected a function definition");
    };
    assert_eq!(func.name, "main");
    assert_eq!(func.ret_ty, BaseType::Int);
    assert!(func.params.is_empty());
    assert_eq!(func.body.items.len(), 1);
}

#[test]
fn parses_global_const_and_var_decls() {
    let unit = parse("const int N = 10; int arr[N];").unwrap();
    assert_eq!(unit.items.len(), 2);
    let Item::Decl(const_decl) = &unit.items[0] else {
        panic!("expected a decl");
    };
    assert_eq!(const_decl.kind, DeclKind::Const);
    let Item::Decl(var_decl) = &unit.items[1] else {
        panic!("expected a decl");
    };
    assert_eq!(var_decl.kind, DeclKind::Var);
    assert_eq!(var_decl.defs[0].shape.len(), 1);
}

#[test]
fn parses_function_with_array_parameter() {
    let unit = parse("int f(int a[], int n) { return a[0]; }").unwrap();
    let Item::FuncDef(func) = &unit.items[0] else {
        panic!("expected a function definition");
    };
    assert!(func.params[0].is_array);
    assert!(func.params[0].shape.is_empty());
    assert!(!func.params[1].is_array);
}

#[test]
fn distinguishes_assignment_from_expression_statement() {
    let unit = parse("int main() { int a; a = 1; a + 1; return a; }").unwrap();
    let Item::FuncDef(func) = &unit.items[0] else {
        panic!("expected a function definition");
    };
    let stmts: Vec<_> = func
        .body
        .items
        .iter()
        .filter_map(|item| match item {
            sysyc_parser::ast::BlockItem::Stmt(s) => Some(s),
            _ => None,
        })
        .collect();
    assert!(matches!(stmts[0], Stmt::Assign { .. }));
    assert!(matches!(stmts[1], Stmt::ExprStmt(_)));
    assert!(matches!(stmts[2], Stmt::Return { .. }));
}

#[test]
fn parses_nested_array_initialiser() {
    let unit = parse("int main() { int a[2][3] = {{1, 2, 3}, {4, 5, 6}}; return a[1][2]; }").unwrap();
    let Item::FuncDef(func) = &unit.items[0] else {
        panic!("expected a function definition");
    };
    let sysyc_parser::ast::BlockItem::Decl(decl) = &func.body.items[0] else {
        panic!("expected a decl");
    };
    assert_eq!(decl.defs[0].shape.len(), 2);
    assert!(decl.defs[0].init.is_some());
}

#[test]
fn if_else_attaches_to_nearest_if() {
    let unit = parse("int main() { if (1) if (0) return 1; else return 2; return 0; }").unwrap();
    let Item::FuncDef(func) = &unit.items[0] else {
        panic!("expected a function definition");
    };
    let sysyc_parser::ast::BlockItem::Stmt(Stmt::If { then_branch, .. }) = &func.body.items[0]
    else {
        panic!("expected an if statement");
    };
    assert!(matches!(**then_branch, Stmt::If { else_branch: Some(_), .. }));
}
