//! Tsonic: an ahead-of-time compiler from a typed TypeScript subset to
//! idiomatic C#.
//!
//! The crates compose a strictly staged pipeline: scanner, parser, binder,
//! type system, IR builder, validation passes, and the C# backend. This
//! root crate wires them into `compile` and hosts the CLI binary.

pub use tsonic_binder as binder;
pub use tsonic_common as common;
pub use tsonic_emitter as emitter;
pub use tsonic_ir as ir;
pub use tsonic_parser as parser;
pub use tsonic_passes as passes;
pub use tsonic_scanner as scanner;
pub use tsonic_types as types;

pub mod compiler;
pub use compiler::{CompileOutput, compile, compile_sources};

pub mod config;
