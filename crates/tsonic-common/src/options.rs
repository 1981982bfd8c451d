//! Compiler options.
//!
//! Options are plain data resolved once by the driver and threaded through
//! the pipeline by reference. The external bindings registry travels
//! separately (see `tsonic-types`).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Target runtime flavor. Affects a small set of type-emission choices
/// (array emission, `Error` mapping).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    #[default]
    Dotnet,
    Js,
}

/// Case policy applied to one bucket of emitted identifiers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CasePolicy {
    /// Emit identifiers unchanged.
    #[default]
    None,
    PascalCase,
    CamelCase,
}

impl CasePolicy {
    /// Apply this policy to a source identifier.
    pub fn apply(self, name: &str) -> String {
        match self {
            CasePolicy::None => name.to_string(),
            CasePolicy::PascalCase => to_pascal_case(name),
            CasePolicy::CamelCase => to_camel_case(name),
        }
    }
}

/// Identifier buckets the naming policy distinguishes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NameBucket {
    Classes,
    Methods,
    Properties,
    Fields,
    EnumMembers,
}

/// Per-bucket identifier case policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NamingPolicy {
    pub classes: CasePolicy,
    pub methods: CasePolicy,
    pub properties: CasePolicy,
    pub fields: CasePolicy,
    pub enum_members: CasePolicy,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        // Properties surface as C# auto-properties and follow CLR
        // conventions; everything else keeps its source spelling unless the
        // project opts in.
        Self {
            classes: CasePolicy::None,
            methods: CasePolicy::None,
            properties: CasePolicy::PascalCase,
            fields: CasePolicy::None,
            enum_members: CasePolicy::None,
        }
    }
}

impl NamingPolicy {
    pub fn for_bucket(&self, bucket: NameBucket) -> CasePolicy {
        match bucket {
            NameBucket::Classes => self.classes,
            NameBucket::Methods => self.methods,
            NameBucket::Properties => self.properties,
            NameBucket::Fields => self.fields,
            NameBucket::EnumMembers => self.enum_members,
        }
    }

    pub fn apply(&self, bucket: NameBucket, name: &str) -> String {
        self.for_bucket(bucket).apply(name)
    }
}

/// Options for one compilation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    /// Root directory input paths are made relative to when deriving
    /// namespaces and output paths.
    pub source_root: PathBuf,
    /// Namespace prefix for all emitted modules.
    pub root_namespace: String,
    pub runtime: RuntimeMode,
    pub naming_policy: NamingPolicy,
    /// Whether this compilation produces an executable entry point.
    pub is_entry_point: bool,
    /// The module whose top-level statements form the entry point.
    pub entry_point_path: Option<PathBuf>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            source_root: PathBuf::from("."),
            root_namespace: "App".to_string(),
            runtime: RuntimeMode::Dotnet,
            naming_policy: NamingPolicy::default(),
            is_entry_point: false,
            entry_point_path: None,
        }
    }
}

/// Convert an identifier to PascalCase. Separator characters (`_`, `-`)
/// start a new capitalized segment; interior capitals are preserved.
pub fn to_pascal_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut upper_next = true;
    for ch in name.chars() {
        if ch == '_' || ch == '-' {
            upper_next = true;
            continue;
        }
        if upper_next {
            result.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}

/// Convert an identifier to camelCase.
pub fn to_camel_case(name: &str) -> String {
    let pascal = to_pascal_case(name);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => pascal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pascal_case_conversion() {
        assert_eq!(to_pascal_case("foo"), "Foo");
        assert_eq!(to_pascal_case("fooBar"), "FooBar");
        assert_eq!(to_pascal_case("foo_bar"), "FooBar");
        assert_eq!(to_pascal_case("foo-bar"), "FooBar");
        assert_eq!(to_pascal_case("Already"), "Already");
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(to_camel_case("FooBar"), "fooBar");
        assert_eq!(to_camel_case("foo_bar"), "fooBar");
    }

    #[test]
    fn default_policy_pascalizes_members() {
        let policy = NamingPolicy::default();
        assert_eq!(policy.apply(NameBucket::Properties, "active"), "Active");
        assert_eq!(policy.apply(NameBucket::Fields, "arr"), "arr");
    }
}
