//! C# backend for the Tsonic compiler.
//!
//! The backend reads the validated IR only. Any unresolved invariant
//! reaching it is an internal compiler error, never a user error.

mod writer;
pub use writer::SourceWriter;

mod context;
pub use context::{EmitterContext, SymbolKind};

mod emitter;
pub use emitter::{EmitOptions, emit_module, emit_program};

mod types;
mod declarations;
mod expressions;
mod statements;
mod generators;
