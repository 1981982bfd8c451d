//! Common types and utilities for the Tsonic compiler.
//!
//! This crate provides foundational types used across all tsonic crates:
//! - Source spans (`Span`, `Spanned`)
//! - Line/column conversion (`LineMap`, `SourceLocation`)
//! - Diagnostics (`Diagnostic`, `Severity`, the `TSN` code table)
//! - CLR numeric kinds (`NumericKind`, ranges, promotion rules)
//! - Compiler options (`CompilerOptions`, `NamingPolicy`, `RuntimeMode`)

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::{Span, Spanned};

// Position/Range types for line/column source locations
pub mod position;
pub use position::{LineMap, SourceLocation};

// Diagnostics with stable TSN codes
pub mod diagnostics;
pub use diagnostics::{Diagnostic, Severity};

// CLR numeric primitives
pub mod numeric;
pub use numeric::NumericKind;

// Compiler options and naming policy
pub mod options;
pub use options::{CasePolicy, CompilerOptions, NameBucket, NamingPolicy, RuntimeMode};
