use crate::state::{BinderState, DeclKind, FileBinding};
use tsonic_parser::ast::*;
use tsonic_parser::parse_source_file;

fn bind(source: &str) -> (SourceFile, FileBinding) {
    let result = parse_source_file("test.ts", source);
    assert!(!result.has_errors(), "{:?}", result.diagnostics);
    let binding = BinderState::new().bind_file(&result.file);
    (result.file, binding)
}

fn decl_named(binding: &FileBinding, name: &str) -> u32 {
    *binding
        .decls
        .iter()
        .find(|(_, info)| info.name == name)
        .map(|(id, _)| id)
        .unwrap_or_else(|| panic!("no declaration named {name}"))
}

#[test]
fn resolves_local_use_to_declaration() {
    let (file, binding) = bind("const x = 1;\nconst y = x;");
    let Statement::Variable(y_decl) = &file.statements[1] else {
        panic!("expected variable");
    };
    let Some(Expression::Ident(x_use)) = &y_decl.initializer else {
        panic!("expected identifier initializer");
    };
    let resolved = binding.resolution.get(&x_use.id).copied();
    assert_eq!(resolved, Some(decl_named(&binding, "x")));
}

#[test]
fn inner_scope_shadows_outer() {
    let (file, binding) = bind("const x = 1;\n{ const x = 2;\nconst y = x; }");
    let Statement::Block(block) = &file.statements[1] else {
        panic!("expected block");
    };
    let Statement::Variable(inner_x) = &block.statements[0] else {
        panic!("expected inner declaration");
    };
    let Statement::Variable(y_decl) = &block.statements[1] else {
        panic!("expected y declaration");
    };
    let Some(Expression::Ident(x_use)) = &y_decl.initializer else {
        panic!("expected identifier");
    };
    let inner_decl = binding
        .decl_of_node
        .get(&inner_x.name.as_ident().unwrap().id)
        .copied();
    assert_eq!(binding.resolution.get(&x_use.id).copied(), inner_decl);
}

#[test]
fn hoisting_resolves_forward_function_use() {
    let (file, binding) = bind("const r = later();\nfunction later(): int { return 1; }");
    let Statement::Variable(decl) = &file.statements[0] else {
        panic!("expected variable");
    };
    let Some(Expression::Call(call)) = &decl.initializer else {
        panic!("expected call");
    };
    let Expression::Ident(callee) = call.callee.as_ref() else {
        panic!("expected identifier callee");
    };
    assert_eq!(
        binding.resolution.get(&callee.id).copied(),
        Some(decl_named(&binding, "later"))
    );
}

#[test]
fn assignment_marks_written() {
    let (_, binding) = bind("let a = 1;\nlet b = 2;\na = 3;");
    assert!(binding.written.contains(&decl_named(&binding, "a")));
    assert!(!binding.written.contains(&decl_named(&binding, "b")));
}

#[test]
fn compound_and_update_mark_written() {
    let (_, binding) = bind("let a = 1;\nlet b = 1;\na += 2;\nb++;");
    assert!(binding.written.contains(&decl_named(&binding, "a")));
    assert!(binding.written.contains(&decl_named(&binding, "b")));
}

#[test]
fn destructuring_assignment_marks_written() {
    let (_, binding) = bind("let a = 1;\nlet b = 2;\n[a, b] = pair;");
    assert!(binding.written.contains(&decl_named(&binding, "a")));
    assert!(binding.written.contains(&decl_named(&binding, "b")));
}

#[test]
fn for_of_non_declaring_initializer_is_written() {
    let (_, binding) = bind("let item = 0;\nfor (item of items) {}");
    assert!(binding.written.contains(&decl_named(&binding, "item")));
}

#[test]
fn effectively_const_let() {
    let (_, binding) = bind("let quiet = 1;\nlet noisy = 1;\nnoisy = 2;");
    assert!(binding.is_effectively_const(decl_named(&binding, "quiet")));
    assert!(!binding.is_effectively_const(decl_named(&binding, "noisy")));
}

#[test]
fn generic_arrow_value_is_supported() {
    let (_, binding) = bind("const id = <T>(value: T): T => value;");
    assert!(binding.generic_values.contains(&decl_named(&binding, "id")));
}

#[test]
fn generic_alias_chain_resolves_to_fixed_point() {
    let (_, binding) = bind(
        "const id = <T>(value: T): T => value;\nconst alias = id;\nconst alias2 = alias;",
    );
    assert!(binding.generic_values.contains(&decl_named(&binding, "alias")));
    assert!(binding
        .generic_values
        .contains(&decl_named(&binding, "alias2")));
}

#[test]
fn mutable_generic_value_is_not_supported() {
    let (_, binding) = bind("let f = <T>(value: T): T => value;\nf = g;");
    assert!(!binding.generic_values.contains(&decl_named(&binding, "f")));
}

#[test]
fn non_generic_arrow_is_not_supported() {
    let (_, binding) = bind("const plain = (value: int): int => value;");
    assert!(binding.generic_values.is_empty());
}

#[test]
fn alias_of_generic_function_declaration_is_supported() {
    let (_, binding) =
        bind("function pick<T>(value: T): T { return value; }\nconst alias = pick;");
    assert!(binding.generic_values.contains(&decl_named(&binding, "alias")));
}

#[test]
fn exports_include_reexports() {
    let (_, binding) = bind(
        "export const a = 1;\nexport interface B {}\nexport { helper as util } from \"./other.ts\";",
    );
    assert_eq!(binding.exports.len(), 3);
    assert_eq!(binding.exports[0].local, "a");
    let reexport = &binding.exports[2];
    assert_eq!(reexport.local, "helper");
    assert_eq!(reexport.exported, "util");
    assert_eq!(reexport.source.as_deref(), Some("./other.ts"));
}

#[test]
fn import_specifiers_bind_local_names() {
    let (file, binding) = bind("import { List as L } from \"./list.ts\";\nconst x = L;");
    let Statement::Variable(decl) = &file.statements[1] else {
        panic!("expected variable");
    };
    let Some(Expression::Ident(use_ident)) = &decl.initializer else {
        panic!("expected identifier");
    };
    let resolved = binding.decl_for_use(use_ident.id).expect("resolved");
    assert_eq!(resolved.kind, DeclKind::Import);
    assert_eq!(resolved.name, "L");
}

#[test]
fn params_and_type_params_bind_inside_functions() {
    let (file, binding) = bind("function f<T>(value: T): T { return value; }");
    let Statement::Function(func) = &file.statements[0] else {
        panic!("expected function");
    };
    let Some(body) = &func.body else {
        panic!("expected body");
    };
    let Statement::Return(ret) = &body.statements[0] else {
        panic!("expected return");
    };
    let Some(Expression::Ident(value_use)) = &ret.expression else {
        panic!("expected identifier");
    };
    let resolved = binding.decl_for_use(value_use.id).expect("resolved");
    assert_eq!(resolved.kind, DeclKind::Param);
}

#[test]
fn catch_param_binds_in_catch_block() {
    let (file, binding) = bind("try {} catch (e) { log(e); }");
    let Statement::Try(try_stmt) = &file.statements[0] else {
        panic!("expected try");
    };
    let catch = try_stmt.catch.as_ref().unwrap();
    let Statement::Expression(stmt) = &catch.body.statements[0] else {
        panic!("expected expression");
    };
    let Expression::Call(call) = &stmt.expression else {
        panic!("expected call");
    };
    let Expression::Ident(e_use) = &call.args[0] else {
        panic!("expected identifier arg");
    };
    let resolved = binding.decl_for_use(e_use.id).expect("resolved");
    assert_eq!(resolved.kind, DeclKind::CatchParam);
}
