//! Pass 6: synthetic finalization.
//!
//! Synthetic interfaces registered during IR construction (anonymous object
//! shapes, union-of-object-literal arms) are appended to their module's body
//! for emission.

use crate::PassContext;
use tsonic_common::Diagnostic;
use tsonic_ir::{IrProgram, IrStatement};

pub fn run(
    mut program: IrProgram,
    _ctx: &PassContext<'_>,
    _diagnostics: &mut Vec<Diagnostic>,
) -> IrProgram {
    for module in &mut program.modules {
        for synthetic in std::mem::take(&mut module.synthetics) {
            module
                .body
                .push(IrStatement::InterfaceDeclaration(synthetic));
        }
    }
    program
}
