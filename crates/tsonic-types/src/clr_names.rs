//! Deterministic CLR name mapping for primitives and ambient globals.
//!
//! `Map` and `Set` are deliberately absent: they are not ambient and must
//! arrive through an import binding.

use tsonic_common::NumericKind;

/// The fully-qualified CLR name behind a primitive type name, when one
/// exists.
pub fn clr_name_for_primitive(name: &str) -> Option<&'static str> {
    if let Some(kind) = NumericKind::from_alias(name) {
        return Some(kind.clr_name());
    }
    Some(match name {
        "string" => "System.String",
        "number" => "System.Double",
        "boolean" => "System.Boolean",
        "object" => "System.Object",
        "any" | "unknown" => "System.Object",
        _ => return None,
    })
}

/// The C# keyword spelling of a primitive, when one exists.
pub fn csharp_keyword_for_primitive(name: &str) -> Option<&'static str> {
    if let Some(kind) = NumericKind::from_alias(name) {
        return Some(kind.csharp_keyword());
    }
    Some(match name {
        "string" => "string",
        "number" => "double",
        "boolean" => "bool",
        "object" => "object",
        "any" | "unknown" => "object",
        "void" | "undefined" => "void",
        _ => return None,
    })
}

/// Ambient generic globals with built-in emission rules. The names here are
/// special-cased by the backend (`Array<T>` becomes `T[]`, `Promise<T>`
/// becomes `Task`/`Task<T>`, and so on).
pub fn is_builtin_global(name: &str) -> bool {
    matches!(
        name,
        "Array" | "Promise" | "PromiseLike" | "Span" | "ptr" | "Error" | "Iterator" | "IteratorResult"
    )
}

/// Whether a bare import specifier looks like a .NET namespace
/// (`System`, `System.Collections.Generic`, ...).
pub fn looks_like_clr_namespace(specifier: &str) -> bool {
    !specifier.is_empty()
        && specifier.split('.').all(|part| {
            part.chars().next().is_some_and(char::is_uppercase)
                && part.chars().all(|c| c.is_ascii_alphanumeric())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_mapping() {
        assert_eq!(clr_name_for_primitive("string"), Some("System.String"));
        assert_eq!(clr_name_for_primitive("number"), Some("System.Double"));
        assert_eq!(clr_name_for_primitive("int"), Some("System.Int32"));
        assert_eq!(clr_name_for_primitive("Widget"), None);
    }

    #[test]
    fn keyword_mapping() {
        assert_eq!(csharp_keyword_for_primitive("number"), Some("double"));
        assert_eq!(csharp_keyword_for_primitive("boolean"), Some("bool"));
        assert_eq!(csharp_keyword_for_primitive("void"), Some("void"));
    }

    #[test]
    fn clr_namespace_shape() {
        assert!(looks_like_clr_namespace("System"));
        assert!(looks_like_clr_namespace("System.Collections.Generic"));
        assert!(!looks_like_clr_namespace("./local.ts"));
        assert!(!looks_like_clr_namespace("lodash"));
    }

    #[test]
    fn map_and_set_are_not_ambient() {
        assert!(!is_builtin_global("Map"));
        assert!(!is_builtin_global("Set"));
    }
}
