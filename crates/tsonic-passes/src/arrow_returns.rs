//! Pass 5: arrow return finalization.
//!
//! Expression-bodied arrows without an explicit return annotation get the
//! body expression's final inferred type as their `return_type`. Runs after
//! the numeric proof so numeric kinds are already settled.

use crate::PassContext;
use tsonic_common::Diagnostic;
use tsonic_ir::rewrite::map_statement;
use tsonic_ir::{IrExpression, IrExpressionKind, IrProgram, IrStatement};

pub fn run(
    mut program: IrProgram,
    _ctx: &PassContext<'_>,
    _diagnostics: &mut Vec<Diagnostic>,
) -> IrProgram {
    for module in &mut program.modules {
        module.body = std::mem::take(&mut module.body)
            .into_iter()
            .map(|statement| map_statement(statement, &mut finalize_arrow))
            .collect();
    }
    program
}

fn finalize_arrow(expr: IrExpression) -> IrExpression {
    let IrExpressionKind::FunctionValue {
        is_async,
        is_generator,
        params,
        return_type: None,
        body,
        is_expression_body: true,
    } = expr.kind
    else {
        return expr;
    };

    // The lowered expression body is a single trailing return.
    let return_type = body.iter().rev().find_map(|statement| match statement {
        IrStatement::Return(Some(value)) => value.inferred_type.clone(),
        _ => None,
    });

    IrExpression {
        kind: IrExpressionKind::FunctionValue {
            is_async,
            is_generator,
            params,
            return_type,
            body,
            is_expression_body: true,
        },
        inferred_type: expr.inferred_type,
        source_span: expr.source_span,
    }
}
