//! Pass 4: the numeric proof.
//!
//! An index used against a CLR indexer, a JS-runtime array, or a string
//! character access must be *provably* Int32:
//! - an integer literal within `[i32::MIN, i32::MAX]`,
//! - an identifier whose declaration carries a proven-Int32 type,
//! - binary arithmetic on two proven operands,
//! - a narrowing/widening chain that preserves Int32.
//!
//! Anything else is `TSN5107`. Surviving indexes are re-annotated with
//! `numeric_intent = Int32` so the backend can rely on it.

use crate::PassContext;
use tsonic_common::Diagnostic;
use tsonic_common::diagnostics::codes;
use tsonic_common::NumericKind;
use tsonic_ir::rewrite::{map_expression, map_statement};
use tsonic_ir::{
    IrBinaryOp, IrExpression, IrExpressionKind, IrLiteralValue, IrProgram, MemberKey,
};
use tsonic_types::IrType;

pub fn run(
    mut program: IrProgram,
    ctx: &PassContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> IrProgram {
    for module in &mut program.modules {
        let source_path = module.source_path.clone();
        module.body = std::mem::take(&mut module.body)
            .into_iter()
            .map(|statement| {
                map_statement(statement, &mut |expr| {
                    prove_indexes(expr, &source_path, ctx, diagnostics)
                })
            })
            .collect();
    }
    program
}

/// Bottom-up rewrite: examine member accesses that require an Int32 index.
fn prove_indexes(
    expr: IrExpression,
    source_path: &str,
    ctx: &PassContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> IrExpression {
    let IrExpressionKind::MemberAccess {
        object,
        member: MemberKey::Index(index),
        access_kind,
        optional,
    } = expr.kind
    else {
        return expr;
    };

    if !access_kind.requires_int32_index() {
        return IrExpression {
            kind: IrExpressionKind::MemberAccess {
                object,
                member: MemberKey::Index(index),
                access_kind,
                optional,
            },
            inferred_type: expr.inferred_type,
            source_span: expr.source_span,
        };
    }

    if is_proven_int32(&index) {
        let annotated = annotate_int32(*index);
        return IrExpression {
            kind: IrExpressionKind::MemberAccess {
                object,
                member: MemberKey::Index(Box::new(annotated)),
                access_kind,
                optional,
            },
            inferred_type: expr.inferred_type,
            source_span: expr.source_span,
        };
    }

    diagnostics.push(
        Diagnostic::from_template(codes::INDEX_NOT_INT32, &[])
            .with_location(ctx.locate(source_path, index.source_span.or(expr.source_span))),
    );
    IrExpression {
        kind: IrExpressionKind::MemberAccess {
            object,
            member: MemberKey::Index(index),
            access_kind,
            optional,
        },
        inferred_type: expr.inferred_type,
        source_span: expr.source_span,
    }
}

/// The proof judgment.
pub fn is_proven_int32(expr: &IrExpression) -> bool {
    match &expr.kind {
        IrExpressionKind::Literal {
            value: IrLiteralValue::Number(n),
        } => {
            n.fract() == 0.0
                && *n >= f64::from(i32::MIN)
                && *n <= f64::from(i32::MAX)
        }
        IrExpressionKind::Identifier { .. }
        | IrExpressionKind::MemberAccess { .. }
        | IrExpressionKind::Call { .. } => has_int32_type(expr),
        IrExpressionKind::Binary { op, left, right } => {
            is_arithmetic(*op) && is_proven_int32(left) && is_proven_int32(right)
        }
        IrExpressionKind::NumericNarrowing {
            expression,
            target_kind,
        } => {
            // A chain preserves Int32 when every link holds the full Int32
            // range and the source is itself proven.
            let preserves = *target_kind == NumericKind::Int32
                || matches!(target_kind, NumericKind::Int64);
            preserves && is_proven_int32(expression)
        }
        IrExpressionKind::Update { operand, .. } => is_proven_int32(operand),
        IrExpressionKind::Unary {
            op: tsonic_ir::IrUnaryOp::Minus | tsonic_ir::IrUnaryOp::Plus,
            operand,
        } => is_proven_int32(operand),
        _ => has_int32_type(expr),
    }
}

fn has_int32_type(expr: &IrExpression) -> bool {
    expr.inferred_type
        .as_ref()
        .and_then(IrType::numeric_intent)
        == Some(NumericKind::Int32)
}

fn is_arithmetic(op: IrBinaryOp) -> bool {
    matches!(
        op,
        IrBinaryOp::Add
            | IrBinaryOp::Sub
            | IrBinaryOp::Mul
            | IrBinaryOp::Div
            | IrBinaryOp::Rem
            | IrBinaryOp::BitAnd
            | IrBinaryOp::BitOr
            | IrBinaryOp::BitXor
            | IrBinaryOp::ShiftLeft
            | IrBinaryOp::ShiftRight
    )
}

/// Stamp `numeric_intent = Int32` onto a proven index (and keep the rest of
/// the node intact).
fn annotate_int32(index: IrExpression) -> IrExpression {
    let ty = match index.inferred_type {
        Some(ty) => ty.with_numeric_intent(NumericKind::Int32),
        None => IrType::primitive_with_intent("int", NumericKind::Int32),
    };
    IrExpression {
        inferred_type: Some(ty),
        ..index
    }
}

/// Statement-level helper used by tests: prove a single expression tree.
pub fn prove_expression(
    expr: IrExpression,
    source_path: &str,
    ctx: &PassContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> IrExpression {
    map_expression(expr, &mut |e| prove_indexes(e, source_path, ctx, diagnostics))
}
