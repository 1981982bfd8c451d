//! Emitter context: the state threaded through every emitter.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use tsonic_common::{CompilerOptions, NamingPolicy, RuntimeMode};
use tsonic_ir::{ImportBinding, IrModule, IrStatement, IrTypeAliasDeclaration};
use tsonic_types::{BindingsRegistry, IrType};

/// What a module-level value name refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Function,
    Field,
}

/// Per-module emitter context. Scoped pieces (type-parameter scope, flags)
/// are saved and restored around nested declarations.
pub struct EmitterContext<'a> {
    pub options: &'a CompilerOptions,
    pub registry: &'a BindingsRegistry,
    pub namespace: String,
    pub container_name: String,
    /// `using` directives required so far.
    pub usings: BTreeSet<String>,
    /// Type parameters in scope, with their constraint kinds.
    pub type_params: FxHashSet<String>,
    /// Local type-alias declarations (checked before the external registry
    /// so local names win over same-named CLR types).
    pub type_aliases: FxHashMap<String, IrTypeAliasDeclaration>,
    /// Local interface/class/enum names.
    pub local_types: FxHashSet<String>,
    /// Import-binding table (local name -> fully-qualified origin).
    pub import_bindings: IndexMap<String, ImportBinding>,
    /// Module-level value symbols in the enclosing container.
    pub value_symbols: FxHashMap<String, SymbolKind>,
    pub is_static: bool,
    pub is_async: bool,
    pub is_array_index: bool,
}

impl<'a> EmitterContext<'a> {
    pub fn for_module(
        module: &IrModule,
        options: &'a CompilerOptions,
        registry: &'a BindingsRegistry,
    ) -> Self {
        let mut type_aliases = FxHashMap::default();
        let mut local_types = FxHashSet::default();
        let mut value_symbols = FxHashMap::default();
        for statement in &module.body {
            match statement {
                IrStatement::TypeAliasDeclaration(alias) => {
                    type_aliases.insert(alias.name.clone(), alias.clone());
                }
                IrStatement::InterfaceDeclaration(iface) => {
                    local_types.insert(iface.name.clone());
                }
                IrStatement::ClassDeclaration(class) => {
                    local_types.insert(class.name.clone());
                }
                IrStatement::EnumDeclaration(decl) => {
                    local_types.insert(decl.name.clone());
                }
                IrStatement::FunctionDeclaration(func) => {
                    value_symbols.insert(func.name.clone(), SymbolKind::Function);
                }
                IrStatement::VariableDeclaration(decl) => {
                    value_symbols.insert(decl.name.clone(), SymbolKind::Field);
                }
                _ => {}
            }
        }

        let mut usings = BTreeSet::new();
        for using in &module.using_imports {
            usings.insert(using.clone());
        }

        Self {
            options,
            registry,
            namespace: module.namespace.clone(),
            container_name: module.container_name.clone(),
            usings,
            type_params: FxHashSet::default(),
            type_aliases,
            local_types,
            import_bindings: module.import_bindings.clone(),
            value_symbols,
            is_static: true,
            is_async: false,
            is_array_index: false,
        }
    }

    pub fn policy(&self) -> &NamingPolicy {
        &self.options.naming_policy
    }

    pub fn runtime(&self) -> RuntimeMode {
        self.options.runtime
    }

    pub fn add_using(&mut self, using: &str) {
        self.usings.insert(using.to_string());
    }

    /// Whether a local alias resolves (transitively) to an object type,
    /// which emits as a generated `__Alias` class.
    pub fn alias_is_object(&self, name: &str) -> bool {
        matches!(
            self.type_aliases.get(name).map(|a| &a.ty),
            Some(IrType::Object { .. })
        )
    }

    /// Order the collected usings: Tsonic.Runtime first, then System*, then
    /// Microsoft*, then the rest alphabetically.
    pub fn sorted_usings(&self) -> Vec<String> {
        let mut runtime = Vec::new();
        let mut system = Vec::new();
        let mut microsoft = Vec::new();
        let mut rest = Vec::new();
        for using in &self.usings {
            if using == "Tsonic.Runtime" || using.starts_with("Tsonic.Runtime.") {
                runtime.push(using.clone());
            } else if using == "System" || using.starts_with("System.") {
                system.push(using.clone());
            } else if using == "Microsoft" || using.starts_with("Microsoft.") {
                microsoft.push(using.clone());
            } else {
                rest.push(using.clone());
            }
        }
        let mut out = Vec::new();
        out.extend(runtime);
        out.extend(system);
        out.extend(microsoft);
        out.extend(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsonic_common::CompilerOptions;

    #[test]
    fn using_order_is_runtime_system_microsoft_alpha() {
        let options = CompilerOptions::default();
        let registry = BindingsRegistry::new();
        let module = IrModule {
            source_path: "a.ts".into(),
            output_path: "a.cs".into(),
            namespace: "App".into(),
            container_name: "a".into(),
            using_imports: Vec::new(),
            body: Vec::new(),
            exports: Vec::new(),
            has_top_level_code: false,
            is_entry_point: false,
            import_bindings: IndexMap::new(),
            synthetics: Vec::new(),
        };
        let mut ctx = EmitterContext::for_module(&module, &options, &registry);
        ctx.add_using("Newtonsoft.Json");
        ctx.add_using("System.Collections.Generic");
        ctx.add_using("Tsonic.Runtime");
        ctx.add_using("Microsoft.Extensions.Logging");
        ctx.add_using("System");
        assert_eq!(
            ctx.sorted_usings(),
            vec![
                "Tsonic.Runtime",
                "System",
                "System.Collections.Generic",
                "Microsoft.Extensions.Logging",
                "Newtonsoft.Json",
            ]
        );
    }
}
