//! Intermediate representation for the Tsonic compiler.
//!
//! The IR is the hub of the pipeline: the builder produces it from the AST,
//! validation passes transform it (persistent updates, never in place), and
//! the backend reads it.

pub mod model;
pub use model::*;

pub mod graph;
pub use graph::{ModuleGraph, ModuleGraphEntry, ModuleImport, build_module_graph};

pub mod builder;
pub use builder::{BuildOutput, build_program};

pub mod rewrite;
