//! End-to-end emission tests: source text in, C# text out.

use rustc_hash::FxHashMap;
use tsonic_binder::{BinderState, FileBinding};
use tsonic_common::{CompilerOptions, LineMap};
use tsonic_emitter::{EmitOptions, emit_program};
use tsonic_ir::{build_module_graph, build_program};
use tsonic_parser::ast::SourceFile;
use tsonic_parser::parse_source_file;
use tsonic_passes::{PassContext, run_validation_passes};
use tsonic_types::BindingsRegistry;

fn compile_to_csharp(source: &str) -> String {
    let parsed = parse_source_file("src/main.ts", source);
    assert!(!parsed.has_errors(), "{:?}", parsed.diagnostics);
    let files: Vec<SourceFile> = vec![parsed.file];
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
    let build = build_program(&files, &bindings, &graph, &options, &registry);
    assert!(
        !build.diagnostics.iter().any(|d| d.is_error()),
        "{:?}",
        build.diagnostics
    );

    let mut line_maps = FxHashMap::default();
    for file in &files {
        line_maps.insert(file.path.clone(), LineMap::build(&file.source));
    }
    let ctx = PassContext {
        catalog: &build.catalog,
        options: &options,
        line_maps: &line_maps,
    };
    let (program, diags) = run_validation_passes(build.program, &ctx);
    assert!(
        !diags.iter().any(|d| d.is_error()),
        "validation failed: {diags:?}"
    );

    let files = emit_program(&program, &options, &registry, &EmitOptions::default());
    files
        .get("main.cs")
        .expect("main.cs emitted")
        .clone()
}

#[test]
fn async_promise_void_emits_bare_task() {
    // Scenario A.
    let cs = compile_to_csharp("async function processAsync(): Promise<void> {}");
    assert!(
        cs.contains("async Task processAsync()"),
        "missing fragment in:\n{cs}"
    );
    assert!(!cs.contains("Task<void>"), "Task<void> must not appear:\n{cs}");
    assert!(cs.contains("using System.Threading.Tasks;"));
}

#[test]
fn interface_emits_class_with_auto_properties() {
    // Scenario C.
    let cs = compile_to_csharp(
        "export interface User { id: number; name: string; active?: boolean; }",
    );
    assert!(cs.contains("public class User"), "{cs}");
    assert!(
        cs.contains("public required double Id { get; set; }"),
        "{cs}"
    );
    assert!(
        cs.contains("public required string Name { get; set; }"),
        "{cs}"
    );
    assert!(cs.contains("public bool? Active { get; set; }"), "{cs}");
}

#[test]
fn struct_marker_emits_struct_without_heritage() {
    // Scenario D.
    let cs = compile_to_csharp(
        "interface struct { __brand: never; }\nexport interface Point extends struct { x: int; y: int; }",
    );
    assert!(cs.contains("public struct Point"), "{cs}");
    assert!(cs.contains("public int X { get; set; }"), "{cs}");
    assert!(cs.contains("public int Y { get; set; }"), "{cs}");
    assert!(!cs.contains(": struct"), "struct marker must be consumed:\n{cs}");
}

#[test]
fn interface_with_method_emits_interface() {
    let cs = compile_to_csharp(
        "export interface Api { version: string; call(input: string): string; }",
    );
    assert!(cs.contains("public interface Api"), "{cs}");
    assert!(cs.contains("string call(string input);"), "{cs}");
}

#[test]
fn tuple_of_eight_nests_value_tuples() {
    // Scenario G.
    let cs = compile_to_csharp(
        "export const wide: [int, int, int, int, int, int, int, int] = x;",
    );
    assert!(
        cs.contains(
            "global::System.ValueTuple<int, int, int, int, int, int, int, global::System.ValueTuple<int>>"
        ),
        "{cs}"
    );
}

#[test]
fn anonymous_shapes_dedupe_to_one_synthetic() {
    // Scenario E.
    let cs = compile_to_csharp(
        "function f() { const a = { x: 1, y: 2 };\nconst b = { x: 9, y: 8 }; }",
    );
    let count = cs.matches("class __Anon_main_").count();
    assert_eq!(count, 1, "expected exactly one synthetic declaration:\n{cs}");
    assert!(cs.contains("new __Anon_main_"), "literals reference it:\n{cs}");
}

#[test]
fn union_alias_arms_are_emitted() {
    // Scenario F.
    let cs = compile_to_csharp(
        "export type Result<T, E> = { ok: true; value: T } | { ok: false; error: E };",
    );
    assert!(cs.contains("class Result__0<T, E>"), "{cs}");
    assert!(cs.contains("class Result__1<T, E>"), "{cs}");
}

#[test]
fn module_variables_become_static_fields() {
    let cs = compile_to_csharp("export const greeting: string = \"hi\";\nexport let counter: int = 0;");
    assert!(cs.contains("public static class main"), "{cs}");
    assert!(
        cs.contains("public static readonly string greeting = \"hi\";"),
        "{cs}"
    );
    assert!(cs.contains("public static int counter = 0;"), "{cs}");
}

#[test]
fn entry_point_top_level_statements_go_to_toplevel() {
    let cs = compile_to_csharp("const x: int = 1;\nwork(x);\nfunction work(v: int): void {}");
    assert!(cs.contains("public static void __TopLevel()"), "{cs}");
    assert!(cs.contains("work(x);"), "{cs}");
}

#[test]
fn explicit_arrays_emit_native_arrays() {
    let cs = compile_to_csharp(
        "export const data: number[] = [1, 2, 3];\nexport const first: number = data[0];",
    );
    assert!(cs.contains("double[] data = new double[] { 1, 2, 3 };"), "{cs}");
    assert!(cs.contains("data[0]"), "{cs}");
}

#[test]
fn index_signature_interface_expands_to_dictionary() {
    let cs = compile_to_csharp(
        "interface Env { [key: string]: string; }\nexport function lookup(env: Env, key: string): string { return env[key]; }",
    );
    assert!(
        cs.contains("global::System.Collections.Generic.Dictionary<string, string> env"),
        "{cs}"
    );
}

#[test]
fn generator_emits_wrapper_class() {
    let cs = compile_to_csharp(
        "export function* gen(): Iterator<number> { yield 1;\nreturn; }",
    );
    assert!(cs.contains("public sealed class __gen_Generator"), "{cs}");
    assert!(cs.contains("public IteratorResult<double> next()"), "{cs}");
    assert!(cs.contains("public IteratorResult<double> @return(double value)"), "{cs}");
    assert!(cs.contains("public IteratorResult<double> @throw(global::System.Exception error)"), "{cs}");
    assert!(cs.contains("yield return 1;"), "{cs}");
    assert!(cs.contains("yield break;"), "{cs}");
    assert!(cs.contains("using Tsonic.Runtime;"), "{cs}");
}

#[test]
fn template_literals_emit_interpolated_strings() {
    let cs = compile_to_csharp(
        "export function describe(n: int): string { return `value: ${n}!`; }",
    );
    assert!(cs.contains("$\"value: {n}!\""), "{cs}");
}

#[test]
fn istype_emits_type_test_and_trycast_emits_as() {
    let cs = compile_to_csharp(
        "export function check(v: object): boolean { return istype<string>(v); }\nexport function cast(v: object): string { return trycast<string>(v); }",
    );
    assert!(cs.contains("v is string"), "{cs}");
    assert!(cs.contains("(v as string)"), "{cs}");
}

#[test]
fn narrowing_emits_cast() {
    let cs = compile_to_csharp("export const small: byte = 200 as byte;");
    assert!(cs.contains("(byte)(200)"), "{cs}");
}

#[test]
fn generic_function_lowering_emits_generic_method() {
    let cs = compile_to_csharp("export const id = <T>(value: T): T => value;");
    assert!(cs.contains("public static T id<T>(T value)"), "{cs}");
    assert!(cs.contains("return value;"), "{cs}");
}

#[test]
fn using_block_is_sorted_and_first() {
    let cs = compile_to_csharp(
        "export function* gen(): Iterator<number> { yield 1; }\nexport async function go(): Promise<void> {}",
    );
    let runtime_pos = cs.find("using Tsonic.Runtime;").expect("runtime using");
    let system_pos = cs.find("using System.Collections.Generic;").expect("system using");
    assert!(runtime_pos < system_pos, "{cs}");
    let namespace_pos = cs.find("namespace App").expect("namespace");
    assert!(system_pos < namespace_pos);
}

#[test]
fn header_carries_source_and_timestamp_placeholder() {
    let cs = compile_to_csharp("export const a: int = 1;");
    assert!(cs.starts_with("// <auto-generated>"), "{cs}");
    assert!(cs.contains("src/main.ts"), "{cs}");
    assert!(cs.contains("Generated: TIMESTAMP"), "{cs}");
}

#[test]
#[should_panic(expected = "ICE")]
fn emitter_ices_when_int32_marker_is_stripped() {
    use indexmap::IndexMap;
    use tsonic_ir::{
        AccessKind, IrExpression, IrExpressionKind, IrLiteralValue, IrModule, IrStatement,
        MemberKey,
    };

    // Hand-build a CLR-indexer access whose index never went through the
    // numeric proof.
    let access = IrExpression::new(IrExpressionKind::MemberAccess {
        object: Box::new(IrExpression::new(IrExpressionKind::Identifier {
            name: "data".to_string(),
            decl: None,
        })),
        member: MemberKey::Index(Box::new(IrExpression::new(IrExpressionKind::Literal {
            value: IrLiteralValue::Number(0.0),
        }))),
        access_kind: AccessKind::ClrIndexer,
        optional: false,
    });
    let module = IrModule {
        source_path: "src/main.ts".into(),
        output_path: "main.cs".into(),
        namespace: "App".into(),
        container_name: "main".into(),
        using_imports: Vec::new(),
        body: vec![IrStatement::ExpressionStatement(access)],
        exports: Vec::new(),
        has_top_level_code: true,
        is_entry_point: false,
        import_bindings: IndexMap::new(),
        synthetics: Vec::new(),
    };
    tsonic_emitter::emit_module(
        &module,
        &CompilerOptions::default(),
        &BindingsRegistry::new(),
        &EmitOptions::default(),
    );
}

#[test]
fn deterministic_emission() {
    let source = "export interface User { id: number; }\nexport const u: User = { id: 1 };\nexport function f(): void {}";
    let first = compile_to_csharp(source);
    let second = compile_to_csharp(source);
    assert_eq!(first, second);
}
