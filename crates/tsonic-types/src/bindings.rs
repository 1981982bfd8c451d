//! Pre-resolved external CLR type bindings.
//!
//! Bindings are supplied by the caller (the package-manager side of the
//! toolchain resolves them); the core only consumes them. A `clrName` may
//! carry arity markers (`` `N ``) and nested-type separators (`+`), both of
//! which are stripped at emission time.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// One bound external type.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClrBinding {
    /// The name user code refers to.
    pub ts_emit_name: String,
    /// Fully-qualified CLR name, possibly with `` `N `` and `+` markers.
    pub clr_name: String,
    #[serde(default)]
    pub members: Vec<String>,
    /// `As_IInterface` explicit-view properties the emitter turns into
    /// interface casts.
    #[serde(default)]
    pub explicit_views: Vec<String>,
}

/// Registry of external bindings, searchable by the name user code uses and
/// by the assembly/package that provides it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BindingsRegistry {
    /// Package name -> bindings it provides.
    packages: FxHashMap<String, Vec<ClrBinding>>,
}

impl BindingsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_package(&mut self, package: impl Into<String>, bindings: Vec<ClrBinding>) {
        self.packages.insert(package.into(), bindings);
    }

    pub fn has_package(&self, package: &str) -> bool {
        self.packages.contains_key(package)
    }

    pub fn package_bindings(&self, package: &str) -> Option<&[ClrBinding]> {
        self.packages.get(package).map(Vec::as_slice)
    }

    /// Look a type up by its user-facing name across all packages.
    /// Deterministic: packages are consulted in sorted name order.
    pub fn lookup(&self, ts_name: &str) -> Option<&ClrBinding> {
        let mut names: Vec<&String> = self.packages.keys().collect();
        names.sort();
        for package in names {
            if let Some(binding) = self.packages[package]
                .iter()
                .find(|b| b.ts_emit_name == ts_name || b.clr_name == ts_name)
            {
                return Some(binding);
            }
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Strip CLR metadata decorations from a name: `` List`1 `` loses its arity
/// marker, `Outer+Inner` becomes `Outer.Inner`.
pub fn strip_clr_decorations(clr_name: &str) -> String {
    let mut out = String::with_capacity(clr_name.len());
    let mut chars = clr_name.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '`' => {
                // Skip the arity digits.
                while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                    chars.next();
                }
            }
            '+' => out.push('.'),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_arity_and_nesting() {
        assert_eq!(
            strip_clr_decorations("System.Collections.Generic.List`1"),
            "System.Collections.Generic.List"
        );
        assert_eq!(strip_clr_decorations("Outer+Inner"), "Outer.Inner");
        assert_eq!(
            strip_clr_decorations("Ns.Outer`2+Inner`1"),
            "Ns.Outer.Inner"
        );
    }

    #[test]
    fn lookup_is_deterministic_across_packages() {
        let mut registry = BindingsRegistry::new();
        registry.add_package(
            "zeta",
            vec![ClrBinding {
                ts_emit_name: "List".into(),
                clr_name: "Zeta.List`1".into(),
                members: Vec::new(),
                explicit_views: Vec::new(),
            }],
        );
        registry.add_package(
            "alpha",
            vec![ClrBinding {
                ts_emit_name: "List".into(),
                clr_name: "System.Collections.Generic.List`1".into(),
                members: Vec::new(),
                explicit_views: Vec::new(),
            }],
        );
        let binding = registry.lookup("List").expect("binding");
        assert_eq!(binding.clr_name, "System.Collections.Generic.List`1");
    }
}
