//! Type system for the Tsonic compiler.
//!
//! This crate provides:
//! - `IrType` - the IR type representation with stable structural keys
//! - `UnifiedTypeCatalog` - nominal types and their heritage edges
//! - `NominalEnv` - deterministic inheritance/instantiation queries
//! - `Substitution` - type-parameter substitution over `IrType`
//! - CLR name mapping for primitives and ambient globals
//! - `BindingsRegistry` - pre-resolved external CLR type bindings

pub mod ir_type;
pub use ir_type::{
    ArrayOrigin, IrObjectMember, IrParamType, IrType, LiteralValue, normalized_union,
    stable_ir_type_key,
};

pub mod catalog;
pub use catalog::{HeritageEdge, HeritageKind, MemberInfo, NominalKind, TypeEntry, TypeId, UnifiedTypeCatalog};

pub mod nominal_env;
pub use nominal_env::{NominalEnv, Substitution};

pub mod clr_names;

pub mod bindings;
pub use bindings::{BindingsRegistry, ClrBinding};
