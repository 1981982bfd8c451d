//! Type emission.
//!
//! Reference types resolve in a fixed order: `resolved_clr_type`, then the
//! import-binding table, then built-in globals, then local types, then the
//! external bindings registry. An unresolved reference is an ICE: validation
//! should have caught it.

use crate::context::EmitterContext;
use tsonic_common::RuntimeMode;
use tsonic_types::bindings::strip_clr_decorations;
use tsonic_types::clr_names::csharp_keyword_for_primitive;
use tsonic_types::{ArrayOrigin, IrType, LiteralValue};

pub(crate) fn emit_type(ty: &IrType, ctx: &mut EmitterContext<'_>) -> String {
    match ty {
        IrType::Primitive { name, .. } => emit_primitive(name),
        IrType::Literal { value } => match value {
            LiteralValue::String(_) => "string".to_string(),
            LiteralValue::Number(_) => "double".to_string(),
            LiteralValue::Bool(_) => "bool".to_string(),
        },
        IrType::TypeParameter { name } => name.clone(),
        IrType::Array { element, origin } => {
            let element_text = emit_type(element, ctx);
            let native = ctx.runtime() == RuntimeMode::Dotnet && *origin == ArrayOrigin::Explicit;
            if native {
                format!("{element_text}[]")
            } else {
                ctx.add_using("System.Collections.Generic");
                format!("List<{element_text}>")
            }
        }
        IrType::Tuple { elements } => emit_tuple(elements, ctx),
        IrType::Dictionary { key, value } => {
            let key_text = match key.as_ref() {
                IrType::Primitive { name, .. } if name == "string" => "string",
                IrType::Primitive { name, .. } if name == "number" => "double",
                other => panic!(
                    "ICE: dictionary key must be string or number, found {}",
                    other.stable_key()
                ),
            };
            let value_text = emit_type(value, ctx);
            format!("global::System.Collections.Generic.Dictionary<{key_text}, {value_text}>")
        }
        IrType::Function {
            params,
            return_type,
        } => {
            let mut args: Vec<String> = params.iter().map(|p| emit_type(&p.ty, ctx)).collect();
            if return_type.is_void_like() {
                if args.is_empty() {
                    "global::System.Action".to_string()
                } else {
                    format!("global::System.Action<{}>", args.join(", "))
                }
            } else {
                args.push(emit_type(return_type, ctx));
                format!("global::System.Func<{}>", args.join(", "))
            }
        }
        // Inline object types are extracted to sibling classes during
        // interface emission; anywhere else they degrade to object.
        IrType::Object { .. } => "object".to_string(),
        IrType::Union { types } => emit_union(types, ctx),
        IrType::Intersection { types } => match types.first() {
            Some(first) => emit_type(first, ctx),
            None => "object".to_string(),
        },
        IrType::Reference { .. } => emit_reference(ty, ctx),
    }
}

fn emit_primitive(name: &str) -> String {
    if let Some(keyword) = csharp_keyword_for_primitive(name) {
        return keyword.to_string();
    }
    match name {
        "null" | "never" => "object".to_string(),
        other => panic!("ICE: unknown primitive type '{other}'"),
    }
}

/// Tuples emit `global::System.ValueTuple<...>`; eight or more elements
/// nest the tail recursively.
fn emit_tuple(elements: &[IrType], ctx: &mut EmitterContext<'_>) -> String {
    if elements.is_empty() {
        return "global::System.ValueTuple".to_string();
    }
    if elements.len() <= 7 {
        let parts: Vec<String> = elements.iter().map(|e| emit_type(e, ctx)).collect();
        return format!("global::System.ValueTuple<{}>", parts.join(", "));
    }
    let mut parts: Vec<String> = elements[..7].iter().map(|e| emit_type(e, ctx)).collect();
    parts.push(emit_tuple(&elements[7..], ctx));
    format!("global::System.ValueTuple<{}>", parts.join(", "))
}

/// Unions have no direct C# spelling. `T | null`/`T | undefined` becomes
/// `T?`; anything else rides on the runtime union wrapper.
fn emit_union(types: &[IrType], ctx: &mut EmitterContext<'_>) -> String {
    let (null_like, concrete): (Vec<&IrType>, Vec<&IrType>) = types.iter().partition(|t| {
        matches!(
            t,
            IrType::Primitive { name, .. } if name == "null" || name == "undefined"
        )
    });
    if concrete.len() == 1 && !null_like.is_empty() {
        return format!("{}?", emit_type(concrete[0], ctx));
    }
    if concrete.len() == 1 {
        return emit_type(concrete[0], ctx);
    }
    if concrete.is_empty() {
        return "object".to_string();
    }
    ctx.add_using("Tsonic.Runtime");
    let parts: Vec<String> = concrete.iter().map(|t| emit_type(t, ctx)).collect();
    let text = format!("Union<{}>", parts.join(", "));
    if null_like.is_empty() {
        text
    } else {
        format!("{text}?")
    }
}

fn emit_reference(ty: &IrType, ctx: &mut EmitterContext<'_>) -> String {
    let IrType::Reference {
        name,
        type_id,
        resolved_clr_type,
        type_arguments,
        ..
    } = ty
    else {
        unreachable!("emit_reference requires a reference type");
    };

    let args = emit_type_args(type_arguments, ctx);

    // 1. Pre-resolved CLR type.
    if let Some(clr) = resolved_clr_type {
        // Builtins may carry a resolved name and still need special shapes.
        if let Some(special) = emit_builtin(name, type_arguments, ctx) {
            return special;
        }
        return format!("global::{}{args}", strip_clr_decorations(clr));
    }

    // 2. Import bindings (types from other input modules).
    if let Some(stable_id) = type_id {
        return emit_nominal_by_stable_id(stable_id, name, &args, ctx);
    }
    if let Some(binding) = ctx.import_bindings.get(name).cloned() {
        return format!(
            "global::{}{args}",
            strip_clr_decorations(&binding.fq_container)
        );
    }

    // 3. Built-in globals.
    if let Some(special) = emit_builtin(name, type_arguments, ctx) {
        return special;
    }

    // 4. Local types (aliases first; local names win over CLR names).
    if ctx.type_aliases.contains_key(name) {
        return emit_local_alias(name, &args, ctx);
    }
    if ctx.local_types.contains(name) {
        return format!("{}{args}", local_type_name(name, ctx));
    }
    if ctx.type_params.contains(name) {
        return name.clone();
    }

    // 5. External bindings registry.
    if let Some(binding) = ctx.registry.lookup(name) {
        return format!("global::{}{args}", strip_clr_decorations(&binding.clr_name));
    }

    panic!("ICE: unresolved type reference '{name}'");
}

/// A nominal type by stable id (`Namespace.Name`). Same-namespace types emit
/// their simple name; foreign ones are fully qualified.
fn emit_nominal_by_stable_id(
    stable_id: &str,
    name: &str,
    args: &str,
    ctx: &mut EmitterContext<'_>,
) -> String {
    // A local alias to an object type emits its generated class.
    if ctx.type_aliases.contains_key(name) {
        return emit_local_alias(name, args, ctx);
    }
    let prefix = format!("{}.", ctx.namespace);
    if let Some(simple) = stable_id.strip_prefix(&prefix) {
        if !simple.contains('.') {
            return format!("{}{args}", local_type_name(simple, ctx));
        }
    }
    format!("global::{stable_id}{args}")
}

/// Local names convert nested-type syntax (`Outer$Inner` -> `Outer.Inner`)
/// and apply the class naming policy per segment. Compiler-generated names
/// (`__Anon_*`, `X__0`, `X__Alias`) are never case-mangled.
pub(crate) fn local_type_name(name: &str, ctx: &EmitterContext<'_>) -> String {
    name.split('$')
        .map(|segment| {
            if segment.contains("__") {
                segment.to_string()
            } else {
                ctx.policy()
                    .apply(tsonic_common::NameBucket::Classes, segment)
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// References to a local alias expand the alias, except object-type aliases
/// which emit their generated `__Alias` class.
fn emit_local_alias(name: &str, args: &str, ctx: &mut EmitterContext<'_>) -> String {
    if ctx.alias_is_object(name) {
        return format!("{name}__Alias{args}");
    }
    let Some(alias) = ctx.type_aliases.get(name).cloned() else {
        panic!("ICE: alias '{name}' vanished from the local table");
    };
    emit_type(&alias.ty, ctx)
}

fn emit_type_args(type_arguments: &[IrType], ctx: &mut EmitterContext<'_>) -> String {
    if type_arguments.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = type_arguments.iter().map(|t| emit_type(t, ctx)).collect();
    format!("<{}>", parts.join(", "))
}

/// Built-in ambient globals with special emission shapes.
fn emit_builtin(
    name: &str,
    type_arguments: &[IrType],
    ctx: &mut EmitterContext<'_>,
) -> Option<String> {
    Some(match name {
        "Promise" | "PromiseLike" | "Task" => {
            ctx.add_using("System.Threading.Tasks");
            match type_arguments.first() {
                // Promise<void> is a bare Task, never Task<void>.
                Some(inner) if !inner.is_void_like() => {
                    format!("Task<{}>", emit_type(inner, ctx))
                }
                _ => "Task".to_string(),
            }
        }
        "Span" => {
            let inner = type_arguments.first()?;
            format!("global::System.Span<{}>", emit_type(inner, ctx))
        }
        "ptr" => {
            let inner = type_arguments.first()?;
            format!("{}*", emit_type(inner, ctx))
        }
        "Error" => "global::System.Exception".to_string(),
        "Iterator" | "Iterable" => {
            ctx.add_using("System.Collections.Generic");
            let inner = type_arguments.first()?;
            format!("IEnumerator<{}>", emit_type(inner, ctx))
        }
        "IteratorResult" => {
            ctx.add_using("Tsonic.Runtime");
            let inner = type_arguments.first()?;
            format!("IteratorResult<{}>", emit_type(inner, ctx))
        }
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use tsonic_common::CompilerOptions;
    use tsonic_ir::IrModule;
    use tsonic_types::BindingsRegistry;

    fn empty_module() -> IrModule {
        IrModule {
            source_path: "main.ts".into(),
            output_path: "main.cs".into(),
            namespace: "App".into(),
            container_name: "main".into(),
            using_imports: Vec::new(),
            body: Vec::new(),
            exports: Vec::new(),
            has_top_level_code: false,
            is_entry_point: false,
            import_bindings: IndexMap::new(),
            synthetics: Vec::new(),
        }
    }

    fn with_ctx(f: impl FnOnce(&mut EmitterContext<'_>)) {
        let options = CompilerOptions::default();
        let registry = BindingsRegistry::new();
        let module = empty_module();
        let mut ctx = EmitterContext::for_module(&module, &options, &registry);
        f(&mut ctx);
    }

    #[test]
    fn explicit_array_is_native_in_dotnet_mode() {
        with_ctx(|ctx| {
            let ty = IrType::Array {
                element: Box::new(IrType::primitive("number")),
                origin: ArrayOrigin::Explicit,
            };
            assert_eq!(emit_type(&ty, ctx), "double[]");
        });
    }

    #[test]
    fn inferred_array_is_a_list() {
        with_ctx(|ctx| {
            let ty = IrType::Array {
                element: Box::new(IrType::primitive("int")),
                origin: ArrayOrigin::Inferred,
            };
            assert_eq!(emit_type(&ty, ctx), "List<int>");
            assert!(ctx.usings.contains("System.Collections.Generic"));
        });
    }

    #[test]
    fn tuple_of_eight_nests() {
        with_ctx(|ctx| {
            let elements: Vec<IrType> = (0..8).map(|_| IrType::primitive("int")).collect();
            let text = emit_type(&IrType::Tuple { elements }, ctx);
            assert_eq!(
                text,
                "global::System.ValueTuple<int, int, int, int, int, int, int, global::System.ValueTuple<int>>"
            );
        });
    }

    #[test]
    fn empty_tuple_is_nongeneric() {
        with_ctx(|ctx| {
            let text = emit_type(&IrType::Tuple { elements: vec![] }, ctx);
            assert_eq!(text, "global::System.ValueTuple");
        });
    }

    #[test]
    fn promise_void_is_bare_task() {
        with_ctx(|ctx| {
            let ty = IrType::Reference {
                name: "Promise".into(),
                type_id: None,
                resolved_clr_type: None,
                type_arguments: vec![IrType::primitive("void")],
                members: None,
            };
            assert_eq!(emit_type(&ty, ctx), "Task");
            assert!(ctx.usings.contains("System.Threading.Tasks"));
        });
    }

    #[test]
    fn promise_of_value_is_generic_task() {
        with_ctx(|ctx| {
            let ty = IrType::Reference {
                name: "Promise".into(),
                type_id: None,
                resolved_clr_type: None,
                type_arguments: vec![IrType::primitive("string")],
                members: None,
            };
            assert_eq!(emit_type(&ty, ctx), "Task<string>");
        });
    }

    #[test]
    fn ptr_emits_pointer() {
        with_ctx(|ctx| {
            let ty = IrType::Reference {
                name: "ptr".into(),
                type_id: None,
                resolved_clr_type: None,
                type_arguments: vec![IrType::primitive("byte")],
                members: None,
            };
            assert_eq!(emit_type(&ty, ctx), "byte*");
        });
    }

    #[test]
    fn arity_markers_are_stripped() {
        with_ctx(|ctx| {
            let ty = IrType::Reference {
                name: "List".into(),
                type_id: None,
                resolved_clr_type: Some("System.Collections.Generic.List`1".into()),
                type_arguments: vec![IrType::primitive("int")],
                members: None,
            };
            assert_eq!(
                emit_type(&ty, ctx),
                "global::System.Collections.Generic.List<int>"
            );
        });
    }

    #[test]
    fn nullable_union_collapses() {
        with_ctx(|ctx| {
            let ty = tsonic_types::normalized_union(vec![
                IrType::primitive("string"),
                IrType::primitive("null"),
            ]);
            assert_eq!(emit_type(&ty, ctx), "string?");
        });
    }

    #[test]
    #[should_panic(expected = "ICE")]
    fn unresolved_reference_is_an_ice() {
        with_ctx(|ctx| {
            let ty = IrType::reference("Phantom");
            emit_type(&ty, ctx);
        });
    }
}
