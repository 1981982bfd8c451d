//! End-to-end pipeline tests over the public `compile` surface.

use tsonic::common::CompilerOptions;
use tsonic::compiler::{CompileOutput, compile, compile_sources};
use tsonic::emitter::EmitOptions;
use tsonic::types::BindingsRegistry;

fn options() -> CompilerOptions {
    CompilerOptions {
        source_root: "src".into(),
        root_namespace: "App".to_string(),
        ..CompilerOptions::default()
    }
}

fn run(sources: &[(&str, &str)]) -> CompileOutput {
    let sources: Vec<(String, String)> = sources
        .iter()
        .map(|(path, text)| (path.to_string(), text.to_string()))
        .collect();
    compile_sources(
        &options(),
        &sources,
        &BindingsRegistry::new(),
        &EmitOptions::default(),
    )
}

fn run_single(source: &str) -> CompileOutput {
    run(&[("src/main.ts", source)])
}

#[test]
fn scenario_a_promise_void_function() {
    let output = run_single("async function processAsync(): Promise<void> {}");
    assert!(output.succeeded(), "{:?}", output.diagnostics);
    let cs = output.files.get("main.cs").expect("main.cs");
    assert!(cs.contains("async Task processAsync()"), "{cs}");
    assert!(!cs.contains("Task<void>"));
}

#[test]
fn scenario_b_unprovable_index_fails_with_no_output() {
    let output = run_single(
        "const arr: number[] = [1, 2, 3];\nconst x: number = arr[1.5 as int];",
    );
    assert!(!output.succeeded());
    assert!(output.diagnostics.iter().any(|d| d.code == "TSN5107"));
    assert!(output.files.is_empty(), "no C# may be emitted on failure");
}

#[test]
fn scenario_c_interface_auto_properties() {
    let output =
        run_single("export interface User { id: number; name: string; active?: boolean; }");
    assert!(output.succeeded(), "{:?}", output.diagnostics);
    let cs = output.files.get("main.cs").expect("main.cs");
    assert!(cs.contains("public class User"), "{cs}");
    assert!(cs.contains("public required double Id { get; set; }"), "{cs}");
    assert!(cs.contains("public required string Name { get; set; }"), "{cs}");
    assert!(cs.contains("public bool? Active { get; set; }"), "{cs}");
}

#[test]
fn scenario_d_struct_marker() {
    let output = run_single(
        "interface struct { __brand: never; }\nexport interface Point extends struct { x: int; y: int; }",
    );
    assert!(output.succeeded(), "{:?}", output.diagnostics);
    let cs = output.files.get("main.cs").expect("main.cs");
    assert!(cs.contains("public struct Point"), "{cs}");
    assert!(cs.contains("public int X { get; set; }"), "{cs}");
    assert!(cs.contains("public int Y { get; set; }"), "{cs}");
    assert!(!cs.contains(": struct"), "{cs}");
}

#[test]
fn scenario_e_anonymous_literal_dedup() {
    let output = run_single(
        "function make() { const a = { x: 1, y: 2 };\nconst b = { x: 3, y: 4 }; }",
    );
    assert!(output.succeeded(), "{:?}", output.diagnostics);
    let cs = output.files.get("main.cs").expect("main.cs");
    assert_eq!(
        cs.matches("class __Anon_main_").count(),
        1,
        "exactly one synthetic declared:\n{cs}"
    );
    assert_eq!(
        cs.matches("new __Anon_main_").count(),
        2,
        "both literals reference it:\n{cs}"
    );
}

#[test]
fn scenario_f_union_of_object_literals() {
    let output = run_single(
        "export type Result<T, E> = { ok: true; value: T } | { ok: false; error: E };",
    );
    assert!(output.succeeded(), "{:?}", output.diagnostics);
    let cs = output.files.get("main.cs").expect("main.cs");
    assert!(cs.contains("class Result__0<T, E>"), "{cs}");
    assert!(cs.contains("class Result__1<T, E>"), "{cs}");
}

#[test]
fn scenario_g_tuple_arity_nesting() {
    let output = run_single(
        "export const wide: [int, int, int, int, int, int, int, int] = value;",
    );
    let cs = output.files.get("main.cs").expect("main.cs");
    assert!(
        cs.contains(
            "global::System.ValueTuple<int, int, int, int, int, int, int, global::System.ValueTuple<int>>"
        ),
        "{cs}"
    );
}

#[test]
fn scenario_h_naming_policy_collision() {
    let mut custom = options();
    custom.naming_policy.methods = tsonic::common::CasePolicy::PascalCase;
    let sources = vec![(
        "src/main.ts".to_string(),
        "class C { foo(): void {}\nFoo(): void {} }".to_string(),
    )];
    let output = compile_sources(
        &custom,
        &sources,
        &BindingsRegistry::new(),
        &EmitOptions::default(),
    );
    assert!(!output.succeeded());
    let diag = output
        .diagnostics
        .iter()
        .find(|d| d.code == "TSN3003")
        .expect("TSN3003");
    assert!(diag.message.contains("foo") && diag.message.contains("Foo"));
}

#[test]
fn unsupported_generic_value_is_a_validation_error() {
    // A reassigned generic function value cannot become a generic method,
    // and C# delegates cannot be generic.
    let output = run_single("let pick = <T>(value: T): T => value;\npick = pick;");
    assert!(!output.succeeded());
    assert!(output.diagnostics.iter().any(|d| d.code == "TSN5104"));
    assert!(output.files.is_empty());
}

#[test]
fn multi_module_compilation_emits_per_module_files() {
    let output = run(&[
        (
            "src/main.ts",
            "import { helper } from \"./util/strings.ts\";\nexport const banner: string = helper(\"hi\");",
        ),
        (
            "src/util/strings.ts",
            "export function helper(input: string): string { return input; }",
        ),
    ]);
    assert!(output.succeeded(), "{:?}", output.diagnostics);
    assert!(output.files.contains_key("main.cs"));
    assert!(output.files.contains_key("util/strings.cs"));
    let main = &output.files["main.cs"];
    assert!(
        main.contains("global::App.util.strings.helper(\"hi\")"),
        "{main}"
    );
    let util = &output.files["util/strings.cs"];
    assert!(util.contains("namespace App.util"), "{util}");
}

#[test]
fn import_cycle_is_fatal() {
    let output = run(&[
        ("src/a.ts", "import { b } from \"./b.ts\";\nexport const a: number = b;"),
        ("src/b.ts", "import { a } from \"./a.ts\";\nexport const b: number = a;"),
    ]);
    assert!(!output.succeeded());
    assert!(output.diagnostics.iter().any(|d| d.code == "TSN4005"));
    assert!(output.files.is_empty());
}

#[test]
fn parse_errors_skip_the_file_but_keep_others() {
    let output = run(&[
        ("src/bad.ts", "const = ;"),
        ("src/good.ts", "export const fine: int = 1;"),
    ]);
    assert!(!output.succeeded());
    assert!(output.diagnostics.iter().any(|d| d.code.starts_with("TSN10")));
}

#[test]
fn deterministic_emission_across_runs() {
    let sources = &[(
        "src/main.ts",
        "export interface User { id: number; }\nexport const u: User = { id: 1 };\nexport function go(): void {}",
    )];
    let first = run(sources);
    let second = run(sources);
    assert!(first.succeeded());
    let a = first.files.get("main.cs").expect("first");
    let b = second.files.get("main.cs").expect("second");
    assert_eq!(a, b, "two runs over identical inputs must be byte-identical");
}

#[test]
fn warnings_do_not_fail_the_compilation() {
    let output = run_single("class Widget {}\nA.on(Missing).type(Serializable);");
    assert!(output.succeeded(), "{:?}", output.diagnostics);
    assert!(output.diagnostics.iter().any(|d| d.code == "TSN5002"));
    assert!(!output.files.is_empty());
}

#[test]
fn compile_reads_files_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let src = dir.path().join("src");
    std::fs::create_dir_all(&src).expect("mkdir");
    std::fs::write(src.join("lib.ts"), "export const version: string = \"1.0\";")
        .expect("write");
    let options = CompilerOptions {
        source_root: src.clone(),
        root_namespace: "Disk".to_string(),
        ..CompilerOptions::default()
    };
    let output = compile(
        &options,
        &[src.join("lib.ts")],
        &BindingsRegistry::new(),
    )
    .expect("compile");
    assert!(output.succeeded(), "{:?}", output.diagnostics);
    let cs = output.files.get("lib.cs").expect("lib.cs");
    assert!(cs.contains("namespace Disk"), "{cs}");
    assert!(
        cs.contains("public static readonly string version = \"1.0\";"),
        "{cs}"
    );
}
