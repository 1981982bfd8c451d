use crate::ast::*;
use crate::parser::parse_source_file;

fn parse_ok(source: &str) -> SourceFile {
    let result = parse_source_file("test.ts", source);
    assert!(
        !result.has_errors(),
        "unexpected parse errors: {:?}",
        result.diagnostics
    );
    result.file
}

fn first_statement(source: &str) -> Statement {
    let mut file = parse_ok(source);
    assert!(!file.statements.is_empty(), "no statements parsed");
    file.statements.remove(0)
}

#[test]
fn parses_const_declaration() {
    let stmt = first_statement("const x: int = 42;");
    let Statement::Variable(decl) = stmt else {
        panic!("expected variable declaration");
    };
    assert_eq!(decl.kind, VarKind::Const);
    assert_eq!(decl.name.as_ident().unwrap().name, "x");
    assert!(decl.type_annotation.is_some());
    assert!(decl.initializer.is_some());
}

#[test]
fn splits_multi_declarator_statements() {
    let file = parse_ok("let a = 1, b = 2;");
    assert_eq!(file.statements.len(), 2);
}

#[test]
fn parses_async_function() {
    let Statement::Function(func) = first_statement("async function processAsync(): Promise<void> {}")
    else {
        panic!("expected function");
    };
    assert!(func.is_async);
    assert!(!func.is_generator);
    assert_eq!(func.name.name, "processAsync");
    let Some(TypeNode::Ref(ret)) = &func.return_type else {
        panic!("expected reference return type");
    };
    assert_eq!(ret.head.name, "Promise");
    assert_eq!(ret.type_args.len(), 1);
}

#[test]
fn parses_generator_function() {
    let Statement::Function(func) = first_statement("function* gen(): Iterator<int> { yield 1; }")
    else {
        panic!("expected function");
    };
    assert!(func.is_generator);
}

#[test]
fn parses_interface_with_optional_members() {
    let Statement::Interface(iface) =
        first_statement("export interface User { id: number; name: string; active?: boolean; }")
    else {
        panic!("expected interface");
    };
    assert!(iface.export);
    assert_eq!(iface.members.len(), 3);
    let TypeMember::Property(active) = &iface.members[2] else {
        panic!("expected property");
    };
    assert!(active.optional);
}

#[test]
fn parses_interface_extends_marker() {
    let Statement::Interface(iface) =
        first_statement("interface Point extends struct { x: int; y: int; }")
    else {
        panic!("expected interface");
    };
    assert_eq!(iface.extends.len(), 1);
    let TypeNode::Ref(base) = &iface.extends[0] else {
        panic!("expected type reference");
    };
    assert_eq!(base.head.name, "struct");
}

#[test]
fn parses_index_signature() {
    let Statement::Interface(iface) = first_statement("interface Env { [key: string]: string; }")
    else {
        panic!("expected interface");
    };
    let TypeMember::Index(index) = &iface.members[0] else {
        panic!("expected index signature");
    };
    assert_eq!(index.key_name, "key");
}

#[test]
fn parses_class_with_members() {
    let source = r#"
        class Greeter extends Base implements Api {
            private count: int = 0;
            static create(): Greeter { return new Greeter(); }
            greet(name: string): string { return name; }
            get total(): int { return this.count; }
        }
    "#;
    let Statement::Class(class) = first_statement(source) else {
        panic!("expected class");
    };
    assert!(class.extends.is_some());
    assert_eq!(class.implements.len(), 1);
    assert_eq!(class.members.len(), 4);
    let ClassMember::Method(create) = &class.members[1] else {
        panic!("expected method");
    };
    assert!(create.is_static);
    let ClassMember::Method(getter) = &class.members[3] else {
        panic!("expected getter");
    };
    assert_eq!(getter.kind, MethodKind::Getter);
}

#[test]
fn parses_union_type_alias() {
    let Statement::TypeAlias(alias) = first_statement(
        "type Result<T, E> = { ok: true; value: T } | { ok: false; error: E };",
    ) else {
        panic!("expected type alias");
    };
    assert_eq!(alias.type_params.len(), 2);
    let TypeNode::Union(union) = &alias.ty else {
        panic!("expected union type");
    };
    assert_eq!(union.types.len(), 2);
}

#[test]
fn parses_tuple_and_array_types() {
    let Statement::Variable(decl) = first_statement("let pair: [string, int[]] = x;") else {
        panic!("expected variable");
    };
    let Some(TypeNode::Tuple(tuple)) = &decl.type_annotation else {
        panic!("expected tuple");
    };
    assert_eq!(tuple.elements.len(), 2);
    assert!(matches!(tuple.elements[1], TypeNode::Array(_)));
}

#[test]
fn parses_imports_and_exports() {
    let file = parse_ok(
        "import { List, Map as Dict } from \"./collections.ts\";\nimport * as sys from \"System\";\nexport { helper } from \"./util.ts\";",
    );
    let Statement::Import(import) = &file.statements[0] else {
        panic!("expected import");
    };
    assert_eq!(import.module, "./collections.ts");
    assert_eq!(import.specifiers.len(), 2);
    assert_eq!(import.specifiers[1].imported, "Map");
    assert_eq!(import.specifiers[1].local.name, "Dict");
    let Statement::ExportNamed(export) = &file.statements[2] else {
        panic!("expected named export");
    };
    assert_eq!(export.source.as_deref(), Some("./util.ts"));
}

#[test]
fn parses_bare_clr_import() {
    let Statement::Import(import) = first_statement("import \"System\";") else {
        panic!("expected import");
    };
    assert_eq!(import.module, "System");
    assert!(import.specifiers.is_empty());
}

#[test]
fn parses_call_with_type_args() {
    let Statement::Expression(stmt) = first_statement("istype<Widget>(value);") else {
        panic!("expected expression statement");
    };
    let Expression::Call(call) = &stmt.expression else {
        panic!("expected call");
    };
    assert_eq!(call.type_args.len(), 1);
}

#[test]
fn less_than_is_not_type_args() {
    let Statement::Expression(stmt) = first_statement("a < b;") else {
        panic!("expected expression statement");
    };
    let Expression::Binary(binary) = &stmt.expression else {
        panic!("expected binary");
    };
    assert_eq!(binary.op, BinaryOp::Less);
}

#[test]
fn parses_as_assertion() {
    let Statement::Variable(decl) = first_statement("const x = arr[1.5 as int];") else {
        panic!("expected variable");
    };
    let Some(Expression::ElementAccess(access)) = &decl.initializer else {
        panic!("expected element access");
    };
    assert!(matches!(*access.index, Expression::TypeAssertion(_)));
}

#[test]
fn parses_arrow_functions() {
    let Statement::Variable(decl) =
        first_statement("const id = <T>(value: T): T => value;")
    else {
        panic!("expected variable");
    };
    let Some(Expression::Arrow(arrow)) = &decl.initializer else {
        panic!("expected arrow");
    };
    assert_eq!(arrow.type_params.len(), 1);
    assert!(matches!(arrow.body, ArrowBody::Expr(_)));
}

#[test]
fn parses_single_param_arrow() {
    let Statement::Expression(stmt) = first_statement("items.map(x => x + 1);") else {
        panic!("expected expression");
    };
    let Expression::Call(call) = &stmt.expression else {
        panic!("expected call");
    };
    assert!(matches!(call.args[0], Expression::Arrow(_)));
}

#[test]
fn parses_template_literal() {
    let Statement::Expression(stmt) = first_statement("`count: ${n} of ${total}`;") else {
        panic!("expected expression");
    };
    let Expression::Template(template) = &stmt.expression else {
        panic!("expected template");
    };
    assert_eq!(template.head, "count: ");
    assert_eq!(template.spans.len(), 2);
    assert_eq!(template.spans[0].1, " of ");
}

#[test]
fn parses_for_of_and_for_in() {
    let file = parse_ok("for (const item of items) {}\nfor (const key in table) {}");
    assert!(matches!(file.statements[0], Statement::ForOf(_)));
    assert!(matches!(file.statements[1], Statement::ForIn(_)));
}

#[test]
fn parses_switch_and_try() {
    let source = r#"
        switch (mode) {
            case 1: break;
            default: break;
        }
        try { work(); } catch (e) { log(e); } finally { done(); }
    "#;
    let file = parse_ok(source);
    let Statement::Switch(switch_stmt) = &file.statements[0] else {
        panic!("expected switch");
    };
    assert_eq!(switch_stmt.cases.len(), 2);
    assert!(switch_stmt.cases[1].test.is_none());
    let Statement::Try(try_stmt) = &file.statements[1] else {
        panic!("expected try");
    };
    assert!(try_stmt.catch.is_some());
    assert!(try_stmt.finally.is_some());
}

#[test]
fn parses_object_literal_kinds() {
    let Statement::Variable(decl) =
        first_statement("const o = { a: 1, b, [k]: 2, ...rest };")
    else {
        panic!("expected variable");
    };
    let Some(Expression::ObjectLit(obj)) = &decl.initializer else {
        panic!("expected object literal");
    };
    assert_eq!(obj.properties[0].kind, PropKind::Init);
    assert_eq!(obj.properties[1].kind, PropKind::Shorthand);
    assert!(matches!(obj.properties[2].key, PropKey::Computed(_)));
    assert_eq!(obj.properties[3].kind, PropKind::Spread);
}

#[test]
fn parses_dynamic_import_and_import_meta() {
    let file = parse_ok("import(\"./lazy.ts\");\nimport.meta;");
    let Statement::Expression(first) = &file.statements[0] else {
        panic!("expected expression");
    };
    assert!(matches!(first.expression, Expression::DynamicImport(_)));
    let Statement::Expression(second) = &file.statements[1] else {
        panic!("expected expression");
    };
    assert!(matches!(second.expression, Expression::ImportMeta(_)));
}

#[test]
fn reports_unexpected_token() {
    let result = parse_source_file("test.ts", "const = 5;");
    assert!(result.has_errors());
    assert!(result.diagnostics.iter().any(|d| d.code == "TSN1005"));
}

#[test]
fn error_has_location() {
    let result = parse_source_file("test.ts", "let x = ;\n");
    assert!(result.has_errors());
    let diag = result.diagnostics.iter().find(|d| d.is_error()).unwrap();
    let loc = diag.location.as_ref().expect("diagnostic location");
    assert_eq!(loc.file, "test.ts");
    assert_eq!(loc.line, 1);
}

#[test]
fn recovers_and_keeps_parsing() {
    let result = parse_source_file("test.ts", "let 123;\nconst ok = 1;");
    assert!(result.has_errors());
    assert!(result
        .file
        .statements
        .iter()
        .any(|s| matches!(s, Statement::Variable(_))));
}
