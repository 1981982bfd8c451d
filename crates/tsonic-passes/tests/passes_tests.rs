//! Pipeline tests for the validation passes: parse, bind, build IR, run
//! the pass chain, then inspect the transformed program and diagnostics.

use rustc_hash::FxHashMap;
use tsonic_binder::{BinderState, FileBinding};
use tsonic_common::{CompilerOptions, Diagnostic, LineMap};
use tsonic_ir::{
    IrExpressionKind, IrProgram, IrStatement, MemberKey, build_module_graph, build_program,
    rewrite,
};
use tsonic_parser::ast::SourceFile;
use tsonic_parser::parse_source_file;
use tsonic_passes::{PassContext, run_validation_passes};
use tsonic_types::{BindingsRegistry, UnifiedTypeCatalog};

struct PipelineResult {
    program: IrProgram,
    catalog: UnifiedTypeCatalog,
    diagnostics: Vec<Diagnostic>,
}

fn run_pipeline(source: &str) -> PipelineResult {
    run_pipeline_with(source, CompilerOptions {
        source_root: "src".into(),
        root_namespace: "App".to_string(),
        ..CompilerOptions::default()
    })
}

fn run_pipeline_with(source: &str, options: CompilerOptions) -> PipelineResult {
    let parsed = parse_source_file("src/main.ts", source);
    assert!(!parsed.has_errors(), "{:?}", parsed.diagnostics);
    let files: Vec<SourceFile> = vec![parsed.file];
    let mut binder = BinderState::new();
    let bindings: Vec<FileBinding> = files.iter().map(|f| binder.bind_file(f)).collect();
    let registry = BindingsRegistry::new();
    let (graph, graph_diags) = build_module_graph(&files, &bindings, &options, &registry);
    assert!(graph_diags.is_empty(), "{graph_diags:?}");
    let build = build_program(&files, &bindings, &graph, &options, &registry);

    let mut line_maps = FxHashMap::default();
    for file in &files {
        line_maps.insert(file.path.clone(), LineMap::build(&file.source));
    }
    let ctx = PassContext {
        catalog: &build.catalog,
        options: &options,
        line_maps: &line_maps,
    };
    let (program, mut pass_diags) = run_validation_passes(build.program, &ctx);
    let mut diagnostics = build.diagnostics;
    diagnostics.append(&mut pass_diags);
    PipelineResult {
        program,
        catalog: build.catalog,
        diagnostics,
    }
}

fn codes(result: &PipelineResult) -> Vec<&str> {
    result.diagnostics.iter().map(|d| d.code.as_str()).collect()
}

#[test]
fn with_statement_is_rejected_and_removed() {
    let result = run_pipeline("function f(o: object) { with (o) {} }");
    assert!(codes(&result).contains(&"TSN2001"));
    let IrStatement::FunctionDeclaration(func) = &result.program.modules[0].body[0] else {
        panic!("expected function");
    };
    assert!(
        !func
            .body
            .iter()
            .any(|s| matches!(s, IrStatement::Unsupported { .. })),
        "unsupported marker must be removed"
    );
}

#[test]
fn import_meta_is_rejected() {
    let result = run_pipeline("const m: object = import.meta;");
    assert!(codes(&result).contains(&"TSN2001"));
}

#[test]
fn non_local_dynamic_import_is_rejected() {
    let result = run_pipeline("function f() { return import(\"lodash\"); }");
    assert!(codes(&result).contains(&"TSN2001"));
}

#[test]
fn redeclaring_an_intrinsic_is_rejected() {
    let result = run_pipeline("function trycast(x: object): object { return x; }");
    assert!(codes(&result).contains(&"TSN7440"));
}

#[test]
fn declaring_int_is_rejected() {
    let result = run_pipeline("const int: number = 5;");
    assert!(codes(&result).contains(&"TSN7440"));
}

#[test]
fn attribute_marker_attaches_and_vanishes() {
    let result = run_pipeline(
        "class Widget {}\nA.on(Widget).type(Serializable, \"v1\", 2, true);",
    );
    let module = &result.program.modules[0];
    let IrStatement::ClassDeclaration(class) = &module.body[0] else {
        panic!("expected class");
    };
    assert_eq!(class.attributes.len(), 1);
    assert_eq!(class.attributes[0].attribute_type, "Serializable");
    assert_eq!(class.attributes[0].arguments.len(), 3);
    assert!(
        !module
            .body
            .iter()
            .any(|s| matches!(s, IrStatement::ExpressionStatement(_))),
        "marker statement must be removed"
    );
}

#[test]
fn unmatched_attribute_target_warns() {
    let result = run_pipeline("A.on(Missing).type(Serializable);");
    let warning = result
        .diagnostics
        .iter()
        .find(|d| d.code == "TSN5002")
        .expect("TSN5002 warning");
    assert_eq!(warning.severity, tsonic_common::Severity::Warning);
    assert!(
        !result.program.modules[0]
            .body
            .iter()
            .any(|s| matches!(s, IrStatement::ExpressionStatement(_)))
    );
}

#[test]
fn unproven_index_is_rejected() {
    // Scenario B: a fractional literal narrowed to int is not a proof.
    let result = run_pipeline(
        "const arr: number[] = [1, 2, 3];\nconst x: number = arr[1.5 as int];",
    );
    assert!(codes(&result).contains(&"TSN5107"));
}

#[test]
fn proven_indexes_are_annotated_int32() {
    let result = run_pipeline(
        "const arr: number[] = [1, 2, 3];\nconst x: number = arr[1 + 2];",
    );
    assert!(!codes(&result).contains(&"TSN5107"));

    let mut found = false;
    for statement in &result.program.modules[0].body {
        rewrite::visit_expressions(statement, &mut |expr| {
            if let IrExpressionKind::MemberAccess {
                member: MemberKey::Index(index),
                access_kind,
                ..
            } = &expr.kind
                && access_kind.requires_int32_index()
            {
                found = true;
                assert_eq!(
                    index
                        .inferred_type
                        .as_ref()
                        .and_then(tsonic_types::IrType::numeric_intent),
                    Some(tsonic_common::NumericKind::Int32),
                    "surviving index must carry Int32 intent"
                );
            }
        });
    }
    assert!(found, "expected an indexed access in the program");
}

#[test]
fn int_typed_identifier_is_a_proof() {
    let result = run_pipeline(
        "const arr: number[] = [1, 2, 3];\nconst i: int = 1;\nconst x: number = arr[i];",
    );
    assert!(!codes(&result).contains(&"TSN5107"));
}

#[test]
fn dictionary_access_needs_no_proof() {
    let result = run_pipeline(
        "interface Env { [key: string]: string; }\nfunction f(env: Env): string { return env[\"HOME\"]; }",
    );
    assert!(!codes(&result).contains(&"TSN5107"));
}

#[test]
fn arrow_returns_are_finalized() {
    let result = run_pipeline("function f() { const double = (x: int) => x; }");
    let IrStatement::FunctionDeclaration(func) = &result.program.modules[0].body[0] else {
        panic!("expected function");
    };
    let IrStatement::VariableDeclaration(decl) = &func.body[0] else {
        panic!("expected declaration");
    };
    let Some(init) = &decl.initializer else {
        panic!("expected initializer");
    };
    let IrExpressionKind::FunctionValue { return_type, .. } = &init.kind else {
        panic!("expected function value");
    };
    assert!(
        return_type.is_some(),
        "expression-bodied arrow must get a concrete return type"
    );
}

#[test]
fn synthetics_are_appended_to_the_body() {
    let result = run_pipeline("function f() { const p = { x: 1, y: 2 }; }");
    let module = &result.program.modules[0];
    assert!(module.synthetics.is_empty(), "registry drained");
    assert!(
        module.body.iter().any(|s| matches!(
            s,
            IrStatement::InterfaceDeclaration(i) if i.synthetic
        )),
        "synthetic interface appended for emission"
    );
    // And it is in the catalogue.
    assert!(
        result
            .catalog
            .iter_sorted()
            .any(|e| e.name.starts_with("__Anon_main_"))
    );
}

#[test]
fn naming_collision_is_reported_with_both_originals() {
    // Scenario H: `foo` and `Foo` case-fold together under a PascalCase
    // method policy.
    let mut options = CompilerOptions {
        source_root: "src".into(),
        root_namespace: "App".to_string(),
        ..CompilerOptions::default()
    };
    options.naming_policy.methods = tsonic_common::CasePolicy::PascalCase;
    let result = run_pipeline_with(
        "class C { foo(): void {}\nFoo(): void {} }",
        options,
    );
    let diag = result
        .diagnostics
        .iter()
        .find(|d| d.code == "TSN3003")
        .expect("TSN3003");
    assert!(diag.message.contains("Foo"));
    assert!(diag.message.contains("foo"));
}

#[test]
fn container_renamed_on_type_collision() {
    let result = run_pipeline("export class main {}");
    assert_eq!(result.program.modules[0].container_name, "main__Module");
}

#[test]
fn container_rename_is_idempotent() {
    let result = run_pipeline("export class main {}");
    let module = &result.program.modules[0];
    // Re-running the passes must not stack suffixes.
    let mut line_maps = FxHashMap::default();
    line_maps.insert(module.source_path.clone(), LineMap::build(""));
    let options = CompilerOptions::default();
    let ctx = PassContext {
        catalog: &result.catalog,
        options: &options,
        line_maps: &line_maps,
    };
    let (program, _) = run_validation_passes(result.program.clone(), &ctx);
    assert_eq!(program.modules[0].container_name, "main__Module");
}
