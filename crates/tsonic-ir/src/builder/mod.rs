//! AST -> IR builder.
//!
//! One `ModuleBuilder` per module, created in dependency order. The builder
//! owns the module-scoped registries (anonymous synthetics, local type
//! names) and threads a narrowing type environment through control flow.

mod decls;
mod exprs;
mod stmts;

#[cfg(test)]
mod tests;

use crate::graph::{ModuleGraph, ModuleImport, ModuleImportKind};
use crate::model::*;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;
use tsonic_binder::{DeclId, FileBinding, TypeSyntaxTable};
use tsonic_common::diagnostics::codes;
use tsonic_common::{CompilerOptions, Diagnostic, LineMap, RuntimeMode, Span};
use tsonic_parser::ast::{self, SourceFile};
use tsonic_types::{
    BindingsRegistry, IrObjectMember, IrType, UnifiedTypeCatalog, normalized_union,
};

/// Result of IR construction.
#[derive(Debug)]
pub struct BuildOutput {
    pub program: IrProgram,
    pub catalog: UnifiedTypeCatalog,
    pub diagnostics: Vec<Diagnostic>,
}

/// Build the IR for every module, dependencies first.
pub fn build_program(
    files: &[SourceFile],
    bindings: &[FileBinding],
    graph: &ModuleGraph,
    options: &CompilerOptions,
    registry: &BindingsRegistry,
) -> BuildOutput {
    let mut catalog = UnifiedTypeCatalog::new();
    let mut diagnostics = Vec::new();
    let mut modules_by_index: Vec<Option<IrModule>> = (0..files.len()).map(|_| None).collect();

    // Register every nominal type first so cross-module references resolve
    // regardless of position.
    for &index in &graph.order {
        let mut builder = ModuleBuilder::new(
            &files[index],
            &bindings[index],
            graph,
            index,
            options,
            registry,
        );
        builder.register_module_types(&mut catalog);
        diagnostics.append(&mut builder.diagnostics);
    }

    for &index in &graph.order {
        debug!(module = %files[index].path, "building module IR");
        let mut builder = ModuleBuilder::new(
            &files[index],
            &bindings[index],
            graph,
            index,
            options,
            registry,
        );
        let module = builder.build_module(&catalog);
        // Synthetic nominals join the catalogue for later passes.
        for synthetic in &module.synthetics {
            builder.register_synthetic(&mut catalog, synthetic);
        }
        diagnostics.append(&mut builder.diagnostics);
        modules_by_index[index] = Some(module);
    }

    let modules = graph
        .order
        .iter()
        .filter_map(|&index| modules_by_index[index].take())
        .collect();

    BuildOutput {
        program: IrProgram { modules },
        catalog,
        diagnostics,
    }
}

/// Module-scoped registry deduplicating anonymous object shapes.
#[derive(Default)]
pub(crate) struct AnonymousRegistry {
    by_shape: FxHashMap<String, String>,
    pub(crate) decls: Vec<IrInterfaceDeclaration>,
}

impl AnonymousRegistry {
    /// Get or create the synthetic interface for a shape. Returns its name.
    pub(crate) fn intern(
        &mut self,
        shape_signature: &str,
        make_name: impl FnOnce() -> String,
        members: &[IrObjectMember],
    ) -> String {
        if let Some(existing) = self.by_shape.get(shape_signature) {
            return existing.clone();
        }
        let name = make_name();
        self.by_shape
            .insert(shape_signature.to_string(), name.clone());
        self.decls.push(IrInterfaceDeclaration {
            name: name.clone(),
            type_params: Vec::new(),
            extends: Vec::new(),
            members: members
                .iter()
                .map(|m| {
                    IrInterfaceMember::Property(IrPropertySignature {
                        name: m.name.clone(),
                        ty: m.ty.clone(),
                        optional: m.optional,
                        readonly: m.readonly,
                    })
                })
                .collect(),
            is_struct: false,
            exported: false,
            synthetic: true,
            span: Span::dummy(),
        });
        name
    }
}

pub(crate) struct ModuleBuilder<'a> {
    pub(crate) file: &'a SourceFile,
    pub(crate) binding: &'a FileBinding,
    pub(crate) graph: &'a ModuleGraph,
    pub(crate) module_index: usize,
    pub(crate) options: &'a CompilerOptions,
    pub(crate) registry: &'a BindingsRegistry,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) line_map: LineMap,
    pub(crate) anon: AnonymousRegistry,
    /// Value declaration types (declared or inferred).
    pub(crate) decl_types: FxHashMap<DeclId, IrType>,
    /// Narrowing frames; innermost last.
    pub(crate) type_env: Vec<FxHashMap<DeclId, IrType>>,
    /// Captured type syntax awaiting resolution against the catalogue
    /// (narrowing targets hold handles until their frame is applied).
    pub(crate) type_syntax: TypeSyntaxTable,
    /// Type parameter names currently in scope.
    pub(crate) type_param_scope: Vec<FxHashSet<String>>,
    /// Whether the body currently being converted is a generator.
    pub(crate) in_generator: bool,
    /// How imported local names resolve for type references.
    pub(crate) imported_names: FxHashMap<String, ImportedName>,
    /// Generic value declarations already lowered to functions in this
    /// module (for alias forwarding).
    pub(crate) lowered_generics: FxHashMap<DeclId, LoweredGenericSignature>,
}

/// Resolution of an imported local name when used in type position.
#[derive(Debug, Clone)]
pub(crate) enum ImportedName {
    /// A type declared by another input module.
    LocalType { stable_id: String },
    /// A type from the external bindings registry.
    Clr { clr_name: String },
    /// A member of an imported CLR namespace (`import { Console } from "System"`).
    ClrAmbient { fq_name: String },
}

/// Signature of a lowered generic function value, kept for alias forwarding.
#[derive(Debug, Clone)]
pub(crate) struct LoweredGenericSignature {
    pub(crate) name: String,
    pub(crate) type_params: Vec<IrTypeParamDecl>,
    pub(crate) params: Vec<IrParamDecl>,
    pub(crate) return_type: Option<IrType>,
}

impl<'a> ModuleBuilder<'a> {
    pub(crate) fn new(
        file: &'a SourceFile,
        binding: &'a FileBinding,
        graph: &'a ModuleGraph,
        module_index: usize,
        options: &'a CompilerOptions,
        registry: &'a BindingsRegistry,
    ) -> Self {
        let imported_names = resolve_imported_names(file, graph, module_index, registry);
        Self {
            file,
            binding,
            graph,
            module_index,
            options,
            registry,
            diagnostics: Vec::new(),
            line_map: LineMap::build(&file.source),
            anon: AnonymousRegistry::default(),
            decl_types: FxHashMap::default(),
            type_env: Vec::new(),
            type_syntax: TypeSyntaxTable::new(),
            type_param_scope: Vec::new(),
            in_generator: false,
            imported_names,
            lowered_generics: FxHashMap::default(),
        }
    }

    pub(crate) fn entry(&self) -> &crate::graph::ModuleGraphEntry {
        &self.graph.entries[self.module_index]
    }

    pub(crate) fn namespace(&self) -> &str {
        &self.entry().namespace
    }

    /// Stable id of a nominal type declared in this module.
    pub(crate) fn local_stable_id(&self, name: &str) -> String {
        format!("{}.{}", self.namespace(), name)
    }

    pub(crate) fn error(&mut self, code: &str, args: &[&str], span: Span) {
        let location = self.line_map.locate(&self.file.path, span);
        self.diagnostics
            .push(Diagnostic::from_template(code, args).with_location(location));
    }

    // =========================================================================
    // Module construction
    // =========================================================================

    pub(crate) fn build_module(&mut self, catalog: &UnifiedTypeCatalog) -> IrModule {
        let entry = self.entry().clone();
        let (using_imports, import_bindings) = self.resolve_imports(&entry.imports);

        let file = self.file;
        let mut body = Vec::new();
        for statement in &file.statements {
            self.build_top_level_statement(statement, catalog, &mut body);
        }

        let is_entry_point = self.options.is_entry_point
            && self
                .options
                .entry_point_path
                .as_ref()
                .is_some_and(|p| p.to_string_lossy() == entry.source_path.as_str());

        IrModule {
            source_path: entry.source_path.clone(),
            output_path: entry.output_path.clone(),
            namespace: entry.namespace.clone(),
            container_name: entry.container_name.clone(),
            using_imports,
            body,
            exports: entry
                .exports
                .iter()
                .map(|e| e.exported.clone())
                .collect(),
            has_top_level_code: entry.has_top_level_code,
            is_entry_point,
            import_bindings,
            synthetics: std::mem::take(&mut self.anon.decls),
        }
    }

    /// Resolve classified imports into `using` directives and per-name
    /// import bindings.
    fn resolve_imports(
        &mut self,
        imports: &[ModuleImport],
    ) -> (Vec<String>, IndexMap<String, ImportBinding>) {
        let mut usings = Vec::new();
        let mut import_bindings = IndexMap::new();

        for statement in &self.file.statements {
            let ast::Statement::Import(import) = statement else {
                continue;
            };
            let Some(classified) = imports.iter().find(|i| i.specifier == import.module) else {
                continue;
            };
            match &classified.kind {
                ModuleImportKind::ClrNamespace => {
                    usings.push(import.module.clone());
                }
                ModuleImportKind::BoundAssembly => {
                    usings.push(import.module.clone());
                    for specifier in &import.specifiers {
                        if let Some(bound) = self.registry.lookup(&specifier.imported) {
                            import_bindings.insert(
                                specifier.local.name.clone(),
                                ImportBinding {
                                    fq_container: bound.clr_name.clone(),
                                    export_name: specifier.imported.clone(),
                                    kind: ImportBindingKind::Type,
                                },
                            );
                        }
                    }
                }
                ModuleImportKind::Local { target } => {
                    for specifier in &import.specifiers {
                        // Follow re-export chains to the defining module.
                        let (def_module, export_name) = self
                            .graph
                            .resolve_export(*target, &specifier.imported)
                            .unwrap_or((*target, specifier.imported.clone()));
                        let fq_container = self.graph.entries[def_module].fq_container();
                        import_bindings.insert(
                            specifier.local.name.clone(),
                            ImportBinding {
                                fq_container,
                                export_name,
                                kind: ImportBindingKind::Value,
                            },
                        );
                    }
                }
                ModuleImportKind::Dynamic { .. } => {}
            }
        }

        usings.sort();
        usings.dedup();
        (usings, import_bindings)
    }

    // =========================================================================
    // Shared helpers
    // =========================================================================

    pub(crate) fn runtime(&self) -> RuntimeMode {
        self.options.runtime
    }

    pub(crate) fn push_type_params(&mut self, params: &[ast::TypeParam]) {
        self.type_param_scope
            .push(params.iter().map(|p| p.name.name.clone()).collect());
    }

    pub(crate) fn pop_type_params(&mut self) {
        self.type_param_scope.pop();
    }

    pub(crate) fn is_type_param(&self, name: &str) -> bool {
        self.type_param_scope
            .iter()
            .rev()
            .any(|scope| scope.contains(name))
    }

    /// Narrowed-then-declared type of a value declaration.
    pub(crate) fn lookup_decl_type(&self, decl: DeclId) -> Option<IrType> {
        for frame in self.type_env.iter().rev() {
            if let Some(ty) = frame.get(&decl) {
                return Some(ty.clone());
            }
        }
        self.decl_types.get(&decl).cloned()
    }

    /// The stem used in synthetic anonymous names.
    pub(crate) fn file_stem(&self) -> String {
        self.entry().container_name.clone()
    }

    /// Synthesize (or reuse) the anonymous interface for an object shape.
    /// Returns the reference type literals of that shape construct.
    pub(crate) fn intern_anonymous(
        &mut self,
        members: &[IrObjectMember],
        span: Span,
    ) -> IrType {
        let shape = IrType::Object {
            members: members.to_vec(),
        };
        let signature = shape.stable_key();
        let (line, col) = self.line_map.line_col(span.start);
        let stem = self.file_stem();
        let name = self
            .anon
            .intern(&signature, || format!("__Anon_{stem}_{line}_{col}"), members);
        IrType::Reference {
            name: name.clone(),
            type_id: Some(self.local_stable_id(&name)),
            resolved_clr_type: None,
            type_arguments: Vec::new(),
            members: Some(members.to_vec()),
        }
    }

    /// Build a normalized union from converted member types.
    pub(crate) fn union_of(&self, types: Vec<IrType>) -> IrType {
        normalized_union(types)
    }

    pub(crate) fn unsupported(&mut self, what: &str, span: Span) {
        self.error(codes::UNSUPPORTED_SYNTAX, &[what], span);
    }
}

/// Classify every imported local name for type-position resolution.
fn resolve_imported_names(
    file: &SourceFile,
    graph: &ModuleGraph,
    module_index: usize,
    registry: &BindingsRegistry,
) -> FxHashMap<String, ImportedName> {
    let mut out = FxHashMap::default();
    let entry = &graph.entries[module_index];

    for statement in &file.statements {
        let ast::Statement::Import(import) = statement else {
            continue;
        };
        let Some(classified) = entry.imports.iter().find(|i| i.specifier == import.module)
        else {
            continue;
        };
        match &classified.kind {
            ModuleImportKind::Local { target } => {
                for specifier in &import.specifiers {
                    let (def_module, export_name) = graph
                        .resolve_export(*target, &specifier.imported)
                        .unwrap_or((*target, specifier.imported.clone()));
                    let namespace = &graph.entries[def_module].namespace;
                    out.insert(
                        specifier.local.name.clone(),
                        ImportedName::LocalType {
                            stable_id: format!("{namespace}.{export_name}"),
                        },
                    );
                }
            }
            ModuleImportKind::BoundAssembly => {
                for specifier in &import.specifiers {
                    if let Some(bound) = registry.lookup(&specifier.imported) {
                        out.insert(
                            specifier.local.name.clone(),
                            ImportedName::Clr {
                                clr_name: bound.clr_name.clone(),
                            },
                        );
                    }
                }
            }
            ModuleImportKind::ClrNamespace => {
                for specifier in &import.specifiers {
                    out.insert(
                        specifier.local.name.clone(),
                        ImportedName::ClrAmbient {
                            fq_name: format!("{}.{}", import.module, specifier.imported),
                        },
                    );
                }
            }
            ModuleImportKind::Dynamic { .. } => {}
        }
    }

    out
}
