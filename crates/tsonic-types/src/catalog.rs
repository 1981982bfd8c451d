//! The unified nominal type catalogue.
//!
//! Every nominal type declared across all modules gets a stable string id
//! (`<namespace>.<name>`). Types reference each other only through those ids;
//! no back-pointers are stored, so cyclic heritage graphs are harmless.

use crate::ir_type::IrType;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

/// Stable program-wide identifier of a nominal type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeId {
    pub stable_id: String,
}

impl TypeId {
    pub fn new(stable_id: impl Into<String>) -> Self {
        Self {
            stable_id: stable_id.into(),
        }
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.stable_id)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NominalKind {
    Class,
    Interface,
    Enum,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeritageKind {
    Extends,
    Implements,
}

#[derive(Clone, Debug)]
pub struct HeritageEdge {
    pub target_stable_id: String,
    pub type_arguments: Vec<IrType>,
    pub kind: HeritageKind,
}

/// A member as declared on its owner (uninstantiated).
#[derive(Clone, Debug)]
pub struct MemberInfo {
    pub name: String,
    pub ty: IrType,
    pub optional: bool,
    pub readonly: bool,
    pub is_method: bool,
}

#[derive(Clone, Debug)]
pub struct TypeEntry {
    pub id: TypeId,
    /// Declared simple name.
    pub name: String,
    /// Declared type parameter names, in order.
    pub type_params: Vec<String>,
    /// Member index in declaration order.
    pub members: IndexMap<String, MemberInfo>,
    pub heritage: Vec<HeritageEdge>,
    pub kind: NominalKind,
    pub is_struct: bool,
}

/// Catalogue of every nominal type in the program.
#[derive(Debug, Default)]
pub struct UnifiedTypeCatalog {
    entries: FxHashMap<String, TypeEntry>,
}

impl UnifiedTypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entry: TypeEntry) {
        self.entries.insert(entry.id.stable_id.clone(), entry);
    }

    pub fn get(&self, stable_id: &str) -> Option<&TypeEntry> {
        self.entries.get(stable_id)
    }

    pub fn contains(&self, stable_id: &str) -> bool {
        self.entries.contains_key(stable_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in stable-id order (deterministic).
    pub fn iter_sorted(&self) -> impl Iterator<Item = &TypeEntry> {
        let mut ids: Vec<&String> = self.entries.keys().collect();
        ids.sort();
        ids.into_iter().filter_map(|id| self.entries.get(id))
    }
}
