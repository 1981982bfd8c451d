//! Module & dependency graph.
//!
//! Derives each module's namespace, container class name and output path,
//! classifies its imports, and orders modules so dependencies come first.
//! Circular local imports are a hard error.

use rustc_hash::FxHashMap;
use tsonic_binder::{ExportEntry, FileBinding};
use tsonic_common::diagnostics::codes;
use tsonic_common::{CompilerOptions, Diagnostic};
use tsonic_parser::ast::{ArrowBody, Expression, ForInit, SourceFile, Statement};
use tsonic_types::BindingsRegistry;
use tsonic_types::clr_names::looks_like_clr_namespace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleImportKind {
    /// `./x.ts` - resolved to another input module.
    Local { target: usize },
    /// Bare .NET namespace (`System`).
    ClrNamespace,
    /// Package resolved through the external bindings registry.
    BoundAssembly,
    /// `import("./x.ts")` with a static local specifier; dependency edge
    /// only, no type bindings.
    Dynamic { target: usize },
}

#[derive(Debug, Clone)]
pub struct ModuleImport {
    pub specifier: String,
    pub kind: ModuleImportKind,
}

#[derive(Debug, Clone)]
pub struct ModuleGraphEntry {
    pub source_path: String,
    pub output_path: String,
    pub namespace: String,
    pub container_name: String,
    pub imports: Vec<ModuleImport>,
    pub exports: Vec<ExportEntry>,
    /// Forward edges (modules this one imports).
    pub dependencies: Vec<usize>,
    /// Reverse edges.
    pub dependents: Vec<usize>,
    pub has_top_level_code: bool,
}

impl ModuleGraphEntry {
    /// `Namespace.Container` - the fully-qualified container class.
    pub fn fq_container(&self) -> String {
        format!("{}.{}", self.namespace, self.container_name)
    }
}

#[derive(Debug, Default)]
pub struct ModuleGraph {
    pub entries: Vec<ModuleGraphEntry>,
    /// Indices into `entries`, dependencies before dependents.
    pub order: Vec<usize>,
}

impl ModuleGraph {
    pub fn index_of(&self, source_path: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.source_path == source_path)
    }

    /// Resolve an exported name of a module, following re-export chains to
    /// the defining module. Returns `(module index, local name)`.
    pub fn resolve_export(&self, module: usize, name: &str) -> Option<(usize, String)> {
        let mut current = module;
        let mut current_name = name.to_string();
        // Bounded by module count; cycles in re-exports give up.
        for _ in 0..=self.entries.len() {
            let entry = self.entries.get(current)?;
            let export = entry
                .exports
                .iter()
                .find(|e| e.exported == current_name)?;
            match &export.source {
                None => return Some((current, export.local.clone())),
                Some(source) => {
                    let target = entry
                        .imports
                        .iter()
                        .find(|i| i.specifier == *source)
                        .and_then(|i| match i.kind {
                            ModuleImportKind::Local { target } => Some(target),
                            _ => None,
                        })?;
                    current_name = export.local.clone();
                    current = target;
                }
            }
        }
        None
    }
}

/// Build the module graph for the given files. File order is preserved for
/// index stability; `order` gives the dependency-first traversal.
pub fn build_module_graph(
    files: &[SourceFile],
    bindings: &[FileBinding],
    options: &CompilerOptions,
    registry: &BindingsRegistry,
) -> (ModuleGraph, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let path_index: FxHashMap<String, usize> = files
        .iter()
        .enumerate()
        .map(|(i, f)| (normalize_path(&f.path), i))
        .collect();

    let mut entries: Vec<ModuleGraphEntry> = files
        .iter()
        .zip(bindings.iter())
        .map(|(file, binding)| {
            let (namespace, container_name, output_path) = derive_module_names(file, options);
            ModuleGraphEntry {
                source_path: file.path.clone(),
                output_path,
                namespace,
                container_name,
                imports: Vec::new(),
                exports: binding.exports.clone(),
                dependencies: Vec::new(),
                dependents: Vec::new(),
                has_top_level_code: file.statements.iter().any(is_executable_top_level),
            }
        })
        .collect();

    // Classify imports and record forward edges.
    for (index, file) in files.iter().enumerate() {
        let mut imports = Vec::new();
        let mut dependencies = Vec::new();

        for statement in &file.statements {
            let specifier = match statement {
                Statement::Import(import) => Some(import.module.clone()),
                Statement::ExportNamed(export) => export.source.clone(),
                _ => None,
            };
            let Some(specifier) = specifier else { continue };
            match classify_import(&specifier, &file.path, &path_index, registry) {
                Ok(kind) => {
                    if let ModuleImportKind::Local { target } = kind {
                        dependencies.push(target);
                    }
                    imports.push(ModuleImport { specifier, kind });
                }
                Err(diag) => diagnostics.push(diag),
            }
        }

        // Dynamic imports of static local specifiers add edges only.
        let mut dynamic_specs = Vec::new();
        for statement in &file.statements {
            collect_dynamic_imports_stmt(statement, &mut dynamic_specs);
        }
        for specifier in dynamic_specs {
            if is_local_specifier(&specifier)
                && let Some(&target) =
                    path_index.get(&resolve_relative(&file.path, &specifier))
            {
                dependencies.push(target);
                imports.push(ModuleImport {
                    specifier,
                    kind: ModuleImportKind::Dynamic { target },
                });
            }
        }

        dependencies.sort_unstable();
        dependencies.dedup();
        entries[index].imports = imports;
        entries[index].dependencies = dependencies;
    }

    // Reverse edges.
    for index in 0..entries.len() {
        for dep in entries[index].dependencies.clone() {
            if dep != index {
                entries[dep].dependents.push(index);
            }
        }
    }

    // Dependency-first ordering with cycle detection.
    let (order, cycle) = topological_order(&entries);
    if let Some(cycle) = cycle {
        let members: Vec<&str> = cycle
            .iter()
            .map(|&i| entries[i].source_path.as_str())
            .collect();
        diagnostics.push(Diagnostic::from_template(
            codes::IMPORT_CYCLE,
            &[&members.join(" -> ")],
        ));
    }

    (ModuleGraph { entries, order }, diagnostics)
}

/// Namespace (root + path parts after the source root), container class name
/// (file stem, hyphens stripped), and relative output path.
fn derive_module_names(file: &SourceFile, options: &CompilerOptions) -> (String, String, String) {
    let normalized = normalize_path(&file.path);
    let root = normalize_path(&options.source_root.to_string_lossy());
    let relative = normalized
        .strip_prefix(&format!("{root}/"))
        .or_else(|| normalized.strip_prefix(&root))
        .map(|s| s.trim_start_matches('/'))
        .unwrap_or(&normalized);

    let mut namespace = options.root_namespace.clone();
    let mut parts: Vec<&str> = relative.split('/').collect();
    let file_name = parts.pop().unwrap_or("");
    for part in parts {
        if part.is_empty() || part == "." {
            continue;
        }
        namespace.push('.');
        namespace.push_str(&sanitize_identifier(part));
    }

    let stem = file_name.strip_suffix(".ts").unwrap_or(file_name);
    let container_name = sanitize_identifier(stem);
    let output_path = format!("{}.cs", relative.strip_suffix(".ts").unwrap_or(relative));
    (namespace, container_name, output_path)
}

fn sanitize_identifier(part: &str) -> String {
    part.chars().filter(|c| *c != '-').collect()
}

fn is_local_specifier(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

fn classify_import(
    specifier: &str,
    importer_path: &str,
    path_index: &FxHashMap<String, usize>,
    registry: &BindingsRegistry,
) -> Result<ModuleImportKind, Diagnostic> {
    if is_local_specifier(specifier) {
        let resolved = resolve_relative(importer_path, specifier);
        return match path_index.get(&resolved) {
            Some(&target) => Ok(ModuleImportKind::Local { target }),
            None => Err(Diagnostic::from_template(
                codes::UNRESOLVED_IMPORT,
                &[specifier],
            )
            .with_hint("local imports must use an explicit file extension")),
        };
    }
    if registry.has_package(specifier) {
        return Ok(ModuleImportKind::BoundAssembly);
    }
    if looks_like_clr_namespace(specifier) {
        return Ok(ModuleImportKind::ClrNamespace);
    }
    Err(Diagnostic::from_template(
        codes::UNRESOLVED_IMPORT,
        &[specifier],
    ))
}

/// Resolve `./x.ts` / `../x.ts` against the importing file's directory.
fn resolve_relative(importer_path: &str, specifier: &str) -> String {
    let importer = normalize_path(importer_path);
    let mut parts: Vec<&str> = importer.split('/').collect();
    parts.pop(); // file name
    for segment in specifier.split('/') {
        match segment {
            "." | "" => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .trim_start_matches("./")
        .to_string()
}

fn is_executable_top_level(statement: &Statement) -> bool {
    !matches!(
        statement,
        Statement::Variable(_)
            | Statement::Function(_)
            | Statement::Class(_)
            | Statement::Interface(_)
            | Statement::Enum(_)
            | Statement::TypeAlias(_)
            | Statement::Import(_)
            | Statement::ExportNamed(_)
            | Statement::Empty(_)
    )
}

/// DFS-based ordering. Returns `(order, Some(cycle))` when a cycle exists,
/// with the cycle's members in traversal order.
fn topological_order(entries: &[ModuleGraphEntry]) -> (Vec<usize>, Option<Vec<usize>>) {
    #[derive(Copy, Clone, PartialEq)]
    enum Color {
        White,
        Gray,
        Black,
    }

    let mut color = vec![Color::White; entries.len()];
    let mut order = Vec::with_capacity(entries.len());
    let mut cycle: Option<Vec<usize>> = None;

    fn visit(
        node: usize,
        entries: &[ModuleGraphEntry],
        color: &mut [Color],
        order: &mut Vec<usize>,
        stack: &mut Vec<usize>,
        cycle: &mut Option<Vec<usize>>,
    ) {
        if cycle.is_some() {
            return;
        }
        match color[node] {
            Color::Black => return,
            Color::Gray => {
                // Found a back edge; report the cycle from its first member.
                let start = stack.iter().position(|&n| n == node).unwrap_or(0);
                let mut members: Vec<usize> = stack[start..].to_vec();
                members.push(node);
                *cycle = Some(members);
                return;
            }
            Color::White => {}
        }
        color[node] = Color::Gray;
        stack.push(node);
        for &dep in &entries[node].dependencies {
            if dep != node {
                visit(dep, entries, color, order, stack, cycle);
            }
        }
        stack.pop();
        color[node] = Color::Black;
        order.push(node);
    }

    let mut stack = Vec::new();
    for node in 0..entries.len() {
        visit(node, entries, &mut color, &mut order, &mut stack, &mut cycle);
    }

    (order, cycle)
}

// =============================================================================
// Dynamic import discovery
// =============================================================================

fn collect_dynamic_imports_stmt(statement: &Statement, out: &mut Vec<String>) {
    match statement {
        Statement::Expression(stmt) => collect_dynamic_imports_expr(&stmt.expression, out),
        Statement::Variable(decl) => {
            if let Some(init) = &decl.initializer {
                collect_dynamic_imports_expr(init, out);
            }
        }
        Statement::Function(func) => {
            if let Some(body) = &func.body {
                for inner in &body.statements {
                    collect_dynamic_imports_stmt(inner, out);
                }
            }
        }
        Statement::If(stmt) => {
            collect_dynamic_imports_expr(&stmt.condition, out);
            collect_dynamic_imports_stmt(&stmt.then_branch, out);
            if let Some(else_branch) = &stmt.else_branch {
                collect_dynamic_imports_stmt(else_branch, out);
            }
        }
        Statement::While(stmt) => {
            collect_dynamic_imports_expr(&stmt.condition, out);
            collect_dynamic_imports_stmt(&stmt.body, out);
        }
        Statement::DoWhile(stmt) => {
            collect_dynamic_imports_stmt(&stmt.body, out);
            collect_dynamic_imports_expr(&stmt.condition, out);
        }
        Statement::For(stmt) => {
            if let Some(ForInit::Expression(expr)) = &stmt.init {
                collect_dynamic_imports_expr(expr, out);
            }
            if let Some(condition) = &stmt.condition {
                collect_dynamic_imports_expr(condition, out);
            }
            if let Some(update) = &stmt.update {
                collect_dynamic_imports_expr(update, out);
            }
            collect_dynamic_imports_stmt(&stmt.body, out);
        }
        Statement::ForOf(stmt) => {
            collect_dynamic_imports_expr(&stmt.iterable, out);
            collect_dynamic_imports_stmt(&stmt.body, out);
        }
        Statement::ForIn(stmt) => {
            collect_dynamic_imports_expr(&stmt.object, out);
            collect_dynamic_imports_stmt(&stmt.body, out);
        }
        Statement::Switch(stmt) => {
            collect_dynamic_imports_expr(&stmt.discriminant, out);
            for case in &stmt.cases {
                for inner in &case.statements {
                    collect_dynamic_imports_stmt(inner, out);
                }
            }
        }
        Statement::Try(stmt) => {
            for inner in &stmt.block.statements {
                collect_dynamic_imports_stmt(inner, out);
            }
            if let Some(catch) = &stmt.catch {
                for inner in &catch.body.statements {
                    collect_dynamic_imports_stmt(inner, out);
                }
            }
            if let Some(finally) = &stmt.finally {
                for inner in &finally.statements {
                    collect_dynamic_imports_stmt(inner, out);
                }
            }
        }
        Statement::Throw(stmt) => collect_dynamic_imports_expr(&stmt.expression, out),
        Statement::Block(block) => {
            for inner in &block.statements {
                collect_dynamic_imports_stmt(inner, out);
            }
        }
        Statement::Return(stmt) => {
            if let Some(expression) = &stmt.expression {
                collect_dynamic_imports_expr(expression, out);
            }
        }
        _ => {}
    }
}

fn collect_dynamic_imports_expr(expression: &Expression, out: &mut Vec<String>) {
    match expression {
        Expression::DynamicImport(import) => {
            if let Expression::Literal(lit) = import.argument.as_ref()
                && let tsonic_parser::ast::LitValue::String(specifier) = &lit.value
            {
                out.push(specifier.clone());
            }
        }
        Expression::PropertyAccess(access) => collect_dynamic_imports_expr(&access.object, out),
        Expression::ElementAccess(access) => {
            collect_dynamic_imports_expr(&access.object, out);
            collect_dynamic_imports_expr(&access.index, out);
        }
        Expression::Call(call) => {
            collect_dynamic_imports_expr(&call.callee, out);
            for arg in &call.args {
                collect_dynamic_imports_expr(arg, out);
            }
        }
        Expression::New(new) => {
            for arg in &new.args {
                collect_dynamic_imports_expr(arg, out);
            }
        }
        Expression::Binary(binary) => {
            collect_dynamic_imports_expr(&binary.left, out);
            collect_dynamic_imports_expr(&binary.right, out);
        }
        Expression::Unary(unary) => collect_dynamic_imports_expr(&unary.operand, out),
        Expression::Update(update) => collect_dynamic_imports_expr(&update.operand, out),
        Expression::Conditional(cond) => {
            collect_dynamic_imports_expr(&cond.condition, out);
            collect_dynamic_imports_expr(&cond.when_true, out);
            collect_dynamic_imports_expr(&cond.when_false, out);
        }
        Expression::Assignment(assignment) => {
            collect_dynamic_imports_expr(&assignment.target, out);
            collect_dynamic_imports_expr(&assignment.value, out);
        }
        Expression::ArrayLit(array) => {
            for element in &array.elements {
                collect_dynamic_imports_expr(element, out);
            }
        }
        Expression::ObjectLit(object) => {
            for prop in &object.properties {
                if let Some(value) = &prop.value {
                    collect_dynamic_imports_expr(value, out);
                }
            }
        }
        Expression::Arrow(arrow) => match &arrow.body {
            ArrowBody::Expr(expr) => collect_dynamic_imports_expr(expr, out),
            ArrowBody::Block(block) => {
                for inner in &block.statements {
                    collect_dynamic_imports_stmt(inner, out);
                }
            }
        },
        Expression::FunctionExpr(func) => {
            for inner in &func.body.statements {
                collect_dynamic_imports_stmt(inner, out);
            }
        }
        Expression::Template(template) => {
            for (expr, _) in &template.spans {
                collect_dynamic_imports_expr(expr, out);
            }
        }
        Expression::Spread(spread) => collect_dynamic_imports_expr(&spread.expression, out),
        Expression::Await(await_expr) => collect_dynamic_imports_expr(&await_expr.expression, out),
        Expression::Yield(yield_expr) => {
            if let Some(expr) = &yield_expr.expression {
                collect_dynamic_imports_expr(expr, out);
            }
        }
        Expression::TypeAssertion(assertion) => {
            collect_dynamic_imports_expr(&assertion.expression, out);
        }
        Expression::NonNull(non_null) => collect_dynamic_imports_expr(&non_null.expression, out),
        Expression::Paren(paren) => collect_dynamic_imports_expr(&paren.expression, out),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsonic_binder::BinderState;
    use tsonic_parser::parse_source_file;

    fn graph_for(
        files: &[(&str, &str)],
    ) -> (ModuleGraph, Vec<Diagnostic>) {
        let parsed: Vec<SourceFile> = files
            .iter()
            .map(|(path, source)| {
                let result = parse_source_file(path, source);
                assert!(!result.has_errors(), "{:?}", result.diagnostics);
                result.file
            })
            .collect();
        let mut binder = BinderState::new();
        let bindings: Vec<FileBinding> = parsed.iter().map(|f| binder.bind_file(f)).collect();
        let options = CompilerOptions {
            source_root: "src".into(),
            root_namespace: "App".to_string(),
            ..CompilerOptions::default()
        };
        build_module_graph(&parsed, &bindings, &options, &BindingsRegistry::new())
    }

    #[test]
    fn derives_namespace_and_container() {
        let (graph, diags) = graph_for(&[("src/util/string-helpers.ts", "export const a = 1;")]);
        assert!(diags.is_empty(), "{diags:?}");
        let entry = &graph.entries[0];
        assert_eq!(entry.namespace, "App.util");
        assert_eq!(entry.container_name, "stringhelpers");
        assert_eq!(entry.output_path, "util/string-helpers.cs");
        assert_eq!(entry.fq_container(), "App.util.stringhelpers");
    }

    #[test]
    fn local_imports_create_edges_in_order() {
        let (graph, diags) = graph_for(&[
            ("src/main.ts", "import { a } from \"./lib.ts\";\nconst b = a;"),
            ("src/lib.ts", "export const a = 1;"),
        ]);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(graph.entries[0].dependencies, vec![1]);
        assert_eq!(graph.entries[1].dependents, vec![0]);
        // lib before main
        assert_eq!(graph.order, vec![1, 0]);
    }

    #[test]
    fn cycle_is_a_hard_error() {
        let (_, diags) = graph_for(&[
            ("src/a.ts", "import { b } from \"./b.ts\";\nexport const a = b;"),
            ("src/b.ts", "import { a } from \"./a.ts\";\nexport const b = a;"),
        ]);
        let cycle = diags.iter().find(|d| d.code == "TSN4005").expect("cycle");
        assert!(cycle.message.contains("src/a.ts"));
        assert!(cycle.message.contains("src/b.ts"));
    }

    #[test]
    fn unresolved_local_import_is_reported() {
        let (_, diags) = graph_for(&[("src/a.ts", "import { x } from \"./missing.ts\";")]);
        assert!(diags.iter().any(|d| d.code == "TSN2003"));
    }

    #[test]
    fn clr_namespace_import_is_classified() {
        let (graph, diags) = graph_for(&[("src/a.ts", "import \"System\";")]);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(
            graph.entries[0].imports[0].kind,
            ModuleImportKind::ClrNamespace
        );
    }

    #[test]
    fn dynamic_import_adds_edge_only() {
        let (graph, diags) = graph_for(&[
            ("src/a.ts", "export function load() { return import(\"./b.ts\"); }"),
            ("src/b.ts", "export const x = 1;"),
        ]);
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(graph.entries[0].dependencies, vec![1]);
        assert!(matches!(
            graph.entries[0].imports[0].kind,
            ModuleImportKind::Dynamic { target: 1 }
        ));
    }

    #[test]
    fn reexport_resolves_to_defining_module() {
        let (graph, diags) = graph_for(&[
            ("src/hub.ts", "export { x } from \"./impl.ts\";"),
            ("src/impl.ts", "export const x = 1;"),
        ]);
        assert!(diags.is_empty(), "{diags:?}");
        let (module, local) = graph.resolve_export(0, "x").expect("resolves");
        assert_eq!(module, 1);
        assert_eq!(local, "x");
    }

    #[test]
    fn top_level_code_flag() {
        let (graph, _) = graph_for(&[
            ("src/decl.ts", "export const a = 1;"),
            ("src/run.ts", "const a = 1;\nlog(a);"),
        ]);
        assert!(!graph.entries[0].has_top_level_code);
        assert!(graph.entries[1].has_top_level_code);
    }
}
