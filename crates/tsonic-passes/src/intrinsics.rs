//! Pass 2: core-intrinsic provenance (`TSN7440`).
//!
//! The reserved intrinsic names belong to the core package's `types.d.ts` /
//! `lang.d.ts`. User code may neither redeclare them nor re-export them from
//! anywhere else. The builder consumes legitimate intrinsic *uses*; what
//! this pass polices is declarations and re-exports of the names.

use crate::PassContext;
use tsonic_common::Diagnostic;
use tsonic_common::diagnostics::codes;
use tsonic_ir::{IrProgram, IrStatement};

/// The reserved core-intrinsic names.
pub const RESERVED_INTRINSICS: &[&str] = &[
    "sbyte", "byte", "short", "ushort", "int", "uint", "long", "ulong", "float", "double", "ptr",
    "ref", "out", "in", "inref", "stackalloc", "trycast", "istype", "nameof", "sizeof",
    "defaultof", "asinterface", "thisarg",
];

pub fn is_reserved_intrinsic(name: &str) -> bool {
    RESERVED_INTRINSICS.contains(&name)
}

pub fn run(
    program: IrProgram,
    ctx: &PassContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> IrProgram {
    for module in &program.modules {
        let mut reported: Vec<&str> = Vec::new();
        for statement in &module.body {
            let declared = match statement {
                IrStatement::VariableDeclaration(decl) => Some((&decl.name, decl.span)),
                IrStatement::FunctionDeclaration(func) => Some((&func.name, func.span)),
                IrStatement::ClassDeclaration(class) => Some((&class.name, class.span)),
                IrStatement::InterfaceDeclaration(iface) if !iface.synthetic => {
                    Some((&iface.name, iface.span))
                }
                IrStatement::EnumDeclaration(decl) => Some((&decl.name, decl.span)),
                IrStatement::TypeAliasDeclaration(alias) => Some((&alias.name, alias.span)),
                _ => None,
            };
            if let Some((name, span)) = declared
                && is_reserved_intrinsic(name)
            {
                reported.push(name);
                diagnostics.push(
                    Diagnostic::from_template(codes::INTRINSIC_PROVENANCE, &[name])
                        .with_location(ctx.locate(&module.source_path, Some(span))),
                );
            }
        }

        // Re-exporting a reserved name from a non-core module is equally
        // off-limits.
        for export in &module.exports {
            if is_reserved_intrinsic(export) && !reported.contains(&export.as_str()) {
                diagnostics.push(
                    Diagnostic::from_template(codes::INTRINSIC_PROVENANCE, &[export])
                        .with_location(ctx.locate(&module.source_path, None)),
                );
            }
        }
    }
    program
}
