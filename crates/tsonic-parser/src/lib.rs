//! Parser for the Tsonic input language.
//!
//! Produces a typed AST (`ast` module) from source text. Parse errors become
//! diagnostics; a file that fails to parse is skipped by later stages.

pub mod ast;

mod parser;
pub use parser::{ParseResult, Parser, parse_source_file};
