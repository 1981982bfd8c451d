use crate::builder::{BuildOutput, build_program};
use crate::graph::build_module_graph;
use crate::model::*;
use tsonic_binder::{BinderState, FileBinding};
use tsonic_common::CompilerOptions;
use tsonic_parser::ast::SourceFile;
use tsonic_parser::parse_source_file;
use tsonic_types::{BindingsRegistry, IrType};

fn build(sources: &[(&str, &str)]) -> BuildOutput {
    let files: Vec<SourceFile> = sources
        .iter()
        .map(|(path, source)| {
            let result = parse_source_file(path, source);
            assert!(!result.has_errors(), "{:?}", result.diagnostics);
            result.file
        })
        .collect();
    let mut binder = BinderState::new();
    let bindings: Vec<FileBinding> = files.iter().map(|f| binder.bind_file(f)).collect();
    let options = CompilerOptions {
        source_root: "src".into(),
        root_namespace: "App".to_string(),
        ..CompilerOptions::default()
    };
    let registry = BindingsRegistry::new();
    let (graph, graph_diags) = build_module_graph(&files, &bindings, &options, &registry);
    assert!(graph_diags.is_empty(), "{graph_diags:?}");
    build_program(&files, &bindings, &graph, &options, &registry)
}

fn build_single(source: &str) -> BuildOutput {
    build(&[("src/main.ts", source)])
}

fn module(output: &BuildOutput) -> &IrModule {
    &output.program.modules[0]
}

#[test]
fn module_names_flow_from_graph() {
    let output = build_single("export const a: int = 1;");
    let m = module(&output);
    assert_eq!(m.namespace, "App");
    assert_eq!(m.container_name, "main");
    assert_eq!(m.exports, vec!["a".to_string()]);
}

#[test]
fn struct_marker_is_consumed() {
    let output = build_single(
        "interface struct { __brand: never; }\ninterface Point extends struct { x: int; y: int; }",
    );
    let m = module(&output);
    // The marker interface itself vanishes.
    assert_eq!(m.body.len(), 1);
    let IrStatement::InterfaceDeclaration(point) = &m.body[0] else {
        panic!("expected interface");
    };
    assert!(point.is_struct);
    assert!(point.extends.is_empty());
}

#[test]
fn index_signature_only_interface_lowers_to_dictionary() {
    let output = build_single("interface Env { [key: string]: string; }");
    let m = module(&output);
    let IrStatement::TypeAliasDeclaration(alias) = &m.body[0] else {
        panic!("expected lowered alias, got {:?}", m.body[0]);
    };
    let IrType::Dictionary { key, .. } = &alias.ty else {
        panic!("expected dictionary type");
    };
    assert_eq!(key.stable_key(), "prim:string");
}

#[test]
fn bad_dictionary_key_is_rejected() {
    let output = build_single("interface Env { [key: boolean]: string; }");
    assert!(output.diagnostics.iter().any(|d| d.code == "TSN5101"));
}

#[test]
fn anonymous_object_literals_dedupe_by_shape() {
    let output = build_single(
        "function f() { const a = { x: 1, y: 2 };\nconst b = { x: 9, y: 8 }; }",
    );
    let m = module(&output);
    assert_eq!(m.synthetics.len(), 1, "one synthetic for the shared shape");
    let synthetic = &m.synthetics[0];
    assert!(synthetic.name.starts_with("__Anon_main_"));
    assert!(synthetic.synthetic);
}

#[test]
fn distinct_shapes_get_distinct_synthetics() {
    let output = build_single(
        "function f() { const a = { x: 1 };\nconst b = { x: 1, y: 2 }; }",
    );
    assert_eq!(module(&output).synthetics.len(), 2);
}

#[test]
fn contextual_nominal_type_suppresses_synthesis() {
    let output = build_single(
        "export interface User { id: number; }\nexport const u: User = { id: 1 };",
    );
    let m = module(&output);
    assert!(m.synthetics.is_empty());
    let decl = m
        .body
        .iter()
        .find_map(|s| match s {
            IrStatement::VariableDeclaration(v) if v.name == "u" => Some(v),
            _ => None,
        })
        .expect("u declaration");
    let Some(IrExpression {
        kind: IrExpressionKind::ObjectLiteral { target_type, .. },
        ..
    }) = &decl.initializer
    else {
        panic!("expected object literal initializer");
    };
    assert!(matches!(
        target_type,
        Some(IrType::Reference { name, .. }) if name == "User"
    ));
}

#[test]
fn union_of_object_literals_promotes_arms() {
    let output = build_single(
        "export type Result<T, E> = { ok: true; value: T } | { ok: false; error: E };",
    );
    let m = module(&output);
    let names: Vec<&str> = m.synthetics.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Result__0", "Result__1"]);
    assert_eq!(m.synthetics[0].type_params.len(), 2);
    let IrStatement::TypeAliasDeclaration(alias) = &m.body[0] else {
        panic!("expected alias");
    };
    let IrType::Union { types } = &alias.ty else {
        panic!("expected union, got {:?}", alias.ty);
    };
    assert_eq!(types.len(), 2);
    assert!(types.iter().all(|t| matches!(
        t,
        IrType::Reference { name, .. } if name.starts_with("Result__")
    )));
}

#[test]
fn generic_arrow_value_lowers_to_function() {
    let output = build_single("export const id = <T>(value: T): T => value;");
    let m = module(&output);
    let IrStatement::FunctionDeclaration(func) = &m.body[0] else {
        panic!("expected lowered function, got {:?}", m.body[0]);
    };
    assert_eq!(func.name, "id");
    assert_eq!(func.type_params.len(), 1);
    assert!(matches!(func.body[0], IrStatement::Return(Some(_))));
}

#[test]
fn generic_alias_lowers_to_forwarding_function() {
    let output = build_single(
        "const id = <T>(value: T): T => value;\nexport const pick = id;",
    );
    let m = module(&output);
    let funcs: Vec<&IrFunctionDeclaration> = m
        .body
        .iter()
        .filter_map(|s| match s {
            IrStatement::FunctionDeclaration(f) => Some(f),
            _ => None,
        })
        .collect();
    assert_eq!(funcs.len(), 2);
    assert_eq!(funcs[1].name, "pick");
    assert_eq!(funcs[1].type_params.len(), 1);
}

#[test]
fn reassigned_generic_value_is_rejected() {
    let output = build_single("let pick = <T>(value: T): T => value;\npick = pick;");
    assert!(
        output.diagnostics.iter().any(|d| d.code == "TSN5104"),
        "{:?}",
        output.diagnostics
    );
    // Nothing liftable was emitted for it.
    assert!(
        !module(&output)
            .body
            .iter()
            .any(|s| matches!(s, IrStatement::FunctionDeclaration(f) if f.name == "pick")),
    );
}

#[test]
fn written_alias_of_generic_value_is_rejected() {
    let output = build_single(
        "const id = <T>(value: T): T => value;\nlet alias = id;\nalias = id;",
    );
    assert!(
        output.diagnostics.iter().any(|d| d.code == "TSN5104"),
        "{:?}",
        output.diagnostics
    );
}

#[test]
fn generic_class_field_is_rejected() {
    let output = build_single("class C { handler = <T>(value: T): T => value; }");
    assert!(
        output.diagnostics.iter().any(|d| d.code == "TSN5104"),
        "{:?}",
        output.diagnostics
    );
}

#[test]
fn explicit_array_annotation_gives_clr_indexer() {
    let output = build_single(
        "const arr: number[] = [1, 2, 3];\nconst x: number = arr[0];",
    );
    let m = module(&output);
    let decl = m
        .body
        .iter()
        .find_map(|s| match s {
            IrStatement::VariableDeclaration(v) if v.name == "x" => Some(v),
            _ => None,
        })
        .expect("x declaration");
    let Some(IrExpression {
        kind: IrExpressionKind::MemberAccess { access_kind, .. },
        ..
    }) = &decl.initializer
    else {
        panic!("expected member access");
    };
    assert_eq!(*access_kind, AccessKind::ClrIndexer);
}

#[test]
fn inferred_array_gives_js_runtime_access() {
    let output = build_single("function f() { const arr = [1, 2];\nconst x = arr[0]; }");
    let m = module(&output);
    let IrStatement::FunctionDeclaration(func) = &m.body[0] else {
        panic!("expected function");
    };
    let IrStatement::VariableDeclaration(x_decl) = &func.body[1] else {
        panic!("expected declaration");
    };
    let Some(IrExpression {
        kind: IrExpressionKind::MemberAccess { access_kind, .. },
        ..
    }) = &x_decl.initializer
    else {
        panic!("expected member access");
    };
    assert_eq!(*access_kind, AccessKind::JsRuntimeArray);
}

#[test]
fn narrowing_refines_identifier_type_in_then_branch() {
    let output = build_single(
        "class Dog { bark(): void {} }\nfunction f(pet: object) { if (pet instanceof Dog) { const d = pet; } }",
    );
    let m = module(&output);
    let IrStatement::FunctionDeclaration(func) = &m.body[1] else {
        panic!("expected function");
    };
    let IrStatement::If(if_stmt) = &func.body[0] else {
        panic!("expected if");
    };
    let IrStatement::Block(then_statements) = if_stmt.then_branch.as_ref() else {
        panic!("expected block");
    };
    let IrStatement::VariableDeclaration(d_decl) = &then_statements[0] else {
        panic!("expected declaration");
    };
    assert!(matches!(
        &d_decl.declared_type,
        Some(IrType::Reference { name, .. }) if name == "Dog"
    ));
}

#[test]
fn generator_bodies_are_lowered() {
    let output = build_single(
        "function* gen(): Iterator<number> { yield 1;\nreturn 2; }",
    );
    let m = module(&output);
    let IrStatement::FunctionDeclaration(func) = &m.body[0] else {
        panic!("expected function");
    };
    assert!(func.is_generator);
    assert!(matches!(func.body[0], IrStatement::YieldStatement(_)));
    assert!(matches!(
        func.body[1],
        IrStatement::GeneratorReturnStatement(Some(_))
    ));
}

#[test]
fn module_level_declaration_requires_a_type() {
    let output = build_single("const mystery = unknownCall();");
    assert!(output.diagnostics.iter().any(|d| d.code == "TSN6001"));
}

#[test]
fn numeric_assertion_lowers_to_narrowing() {
    let output = build_single("const x: int = 5 as int;");
    let m = module(&output);
    let IrStatement::VariableDeclaration(decl) = &m.body[0] else {
        panic!("expected declaration");
    };
    let Some(IrExpression {
        kind: IrExpressionKind::NumericNarrowing { target_kind, .. },
        ..
    }) = &decl.initializer
    else {
        panic!("expected numeric narrowing, got {:?}", decl.initializer);
    };
    assert_eq!(*target_kind, tsonic_common::NumericKind::Int32);
}

#[test]
fn trycast_and_stackalloc_lower_to_their_shapes() {
    let output = build_single(
        "function f(value: object) { const w = trycast<string>(value);\nconst buf = stackalloc<byte>(16); }",
    );
    let m = module(&output);
    let IrStatement::FunctionDeclaration(func) = &m.body[0] else {
        panic!("expected function");
    };
    let IrStatement::VariableDeclaration(w) = &func.body[0] else {
        panic!("expected declaration");
    };
    assert!(matches!(
        w.initializer.as_ref().map(|e| &e.kind),
        Some(IrExpressionKind::TryCast { .. })
    ));
    let IrStatement::VariableDeclaration(buf) = &func.body[1] else {
        panic!("expected declaration");
    };
    assert!(matches!(
        buf.initializer.as_ref().map(|e| &e.kind),
        Some(IrExpressionKind::StackAlloc { .. })
    ));
}

#[test]
fn imports_produce_bindings_through_reexports() {
    let output = build(&[
        ("src/main.ts", "import { x } from \"./hub.ts\";\nexport const y: number = x;"),
        ("src/hub.ts", "export { x } from \"./impl.ts\";"),
        ("src/impl.ts", "export const x: number = 1;"),
    ]);
    let main = output
        .program
        .modules
        .iter()
        .find(|m| m.source_path == "src/main.ts")
        .expect("main module");
    let binding = main.import_bindings.get("x").expect("binding for x");
    assert_eq!(binding.fq_container, "App.impl");
    assert_eq!(binding.export_name, "x");
}

#[test]
fn catalog_registers_nominals_and_heritage() {
    let output = build_single(
        "export interface Base<T> { value: T; }\nexport interface Derived extends Base<string> { extra: number; }",
    );
    let derived = output.catalog.get("App.Derived").expect("Derived entry");
    assert_eq!(derived.heritage.len(), 1);
    assert_eq!(derived.heritage[0].target_stable_id, "App.Base");
    let env = tsonic_types::NominalEnv::new(&output.catalog);
    let chain = env.inheritance_chain("App.Derived");
    assert_eq!(chain, vec!["App.Derived", "App.Base"]);
}
