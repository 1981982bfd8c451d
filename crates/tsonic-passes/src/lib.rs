//! Validation passes over the IR.
//!
//! Each pass is pure: it takes the program and returns a transformed program
//! plus diagnostics. The fixed order is normative; later passes rely on
//! earlier ones having repaired the IR.

use rustc_hash::FxHashMap;
use tracing::debug;
use tsonic_common::{CompilerOptions, Diagnostic, LineMap, SourceLocation, Span};
use tsonic_ir::IrProgram;
use tsonic_types::UnifiedTypeCatalog;

pub mod unsupported_features;
pub mod intrinsics;
pub mod attributes;
pub mod numeric_proof;
pub mod arrow_returns;
pub mod synthetics;
pub mod naming;

/// Context shared by all passes.
pub struct PassContext<'a> {
    pub catalog: &'a UnifiedTypeCatalog,
    pub options: &'a CompilerOptions,
    /// Source path -> line map, for resolving spans in diagnostics.
    pub line_maps: &'a FxHashMap<String, LineMap>,
}

impl<'a> PassContext<'a> {
    /// Resolve a span in a source file to a user-facing location.
    pub fn locate(&self, source_path: &str, span: Option<Span>) -> SourceLocation {
        match (self.line_maps.get(source_path), span) {
            (Some(map), Some(span)) => map.locate(source_path, span),
            _ => SourceLocation::new(source_path, 1, 1, 0),
        }
    }
}

/// Run every validation pass in the fixed order. Diagnostics accumulate;
/// the caller decides whether the backend may run.
pub fn run_validation_passes(
    program: IrProgram,
    ctx: &PassContext<'_>,
) -> (IrProgram, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();

    let passes: [(&str, fn(IrProgram, &PassContext<'_>, &mut Vec<Diagnostic>) -> IrProgram); 7] = [
        ("unsupported-features", unsupported_features::run),
        ("core-intrinsics", intrinsics::run),
        ("attribute-collection", attributes::run),
        ("numeric-proof", numeric_proof::run),
        ("arrow-returns", arrow_returns::run),
        ("synthetics", synthetics::run),
        ("naming-policy", naming::run),
    ];

    let mut program = program;
    for (name, pass) in passes {
        debug!(pass = name, "running validation pass");
        program = pass(program, ctx, &mut diagnostics);
    }

    (program, diagnostics)
}
