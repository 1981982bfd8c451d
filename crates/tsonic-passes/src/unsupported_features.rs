//! Pass 1: reject source constructs with no C# mapping.
//!
//! The builder parks these in `Unsupported` / `UnsupportedExpression`
//! markers; this pass turns each into a `TSN2001` diagnostic and removes the
//! statement-level markers. Dynamic imports of non-local specifiers are
//! rejected here too.

use crate::PassContext;
use tsonic_common::Diagnostic;
use tsonic_common::diagnostics::codes;
use tsonic_ir::rewrite::visit_expressions;
use tsonic_ir::{IrExpressionKind, IrProgram, IrStatement};

pub fn run(
    mut program: IrProgram,
    ctx: &PassContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> IrProgram {
    for module in &mut program.modules {
        let mut kept = Vec::with_capacity(module.body.len());
        for statement in std::mem::take(&mut module.body) {
            if let IrStatement::Unsupported { what, span } = &statement {
                diagnostics.push(
                    Diagnostic::from_template(codes::UNSUPPORTED_FEATURE, &[what])
                        .with_location(ctx.locate(&module.source_path, Some(*span))),
                );
                continue;
            }
            visit_expressions(&statement, &mut |expr| match &expr.kind {
                IrExpressionKind::UnsupportedExpression { what } => {
                    diagnostics.push(
                        Diagnostic::from_template(codes::UNSUPPORTED_FEATURE, &[what])
                            .with_location(ctx.locate(&module.source_path, expr.source_span)),
                    );
                }
                // Generator lowering only handles statement-position yields;
                // a yield used as a value has no C# mapping here.
                IrExpressionKind::Yield { .. } => {
                    diagnostics.push(
                        Diagnostic::from_template(
                            codes::UNSUPPORTED_SYNTAX,
                            &["yield in expression position"],
                        )
                        .with_location(ctx.locate(&module.source_path, expr.source_span)),
                    );
                }
                // Call-argument spreads ride on `params` expansion; array
                // literal spreads have no C# 11 shape.
                IrExpressionKind::ArrayLiteral { elements }
                    if elements
                        .iter()
                        .any(|e| matches!(e.kind, IrExpressionKind::Spread { .. })) =>
                {
                    diagnostics.push(
                        Diagnostic::from_template(
                            codes::UNSUPPORTED_FEATURE,
                            &["spread element in array literal"],
                        )
                        .with_location(ctx.locate(&module.source_path, expr.source_span)),
                    );
                }
                IrExpressionKind::DynamicImport { specifier: None } => {
                    diagnostics.push(
                        Diagnostic::from_template(
                            codes::UNSUPPORTED_FEATURE,
                            &["dynamic import of a non-local specifier"],
                        )
                        .with_location(ctx.locate(&module.source_path, expr.source_span)),
                    );
                }
                _ => {}
            });
            kept.push(statement);
        }
        module.body = kept;
    }
    program
}
