//! Lexical name binder for the Tsonic compiler.
//!
//! This crate provides:
//! - `BinderState` - per-program binder allocating stable `DeclId`s
//! - `FileBinding` - per-file resolution tables, written-symbol set,
//!   supported generic-function values, and the export table
//! - Flow-narrowing collection for `instanceof` / `istype<T>` guards

mod state;
pub use state::{BinderState, DeclId, DeclInfo, DeclKind, ExportEntry, FileBinding};

pub mod flow;
pub use flow::{TypeNarrowing, collect_narrowings};

mod type_syntax;
pub use type_syntax::{TypeSyntaxHandle, TypeSyntaxTable};
