//! Pass 3: attribute collection.
//!
//! Recognizes marker statements of the shape
//! `A.on(Target).type(AttrType, ...literal args)` and attaches the attribute
//! to the class or function declaration named `Target` in the same module.
//! The marker statement is always removed; an unmatched target warns
//! (`TSN5002`).

use crate::PassContext;
use tsonic_common::Diagnostic;
use tsonic_common::diagnostics::codes;
use tsonic_ir::{
    IrAttribute, IrAttributeArgument, IrExpression, IrExpressionKind, IrLiteralValue, IrProgram,
    IrStatement, MemberKey,
};

/// The core package's attribute-builder intrinsic. Markers are calls on
/// this exact exported name, like `istype` and the other intrinsics.
const ATTRIBUTE_BUILDER: &str = "A";

/// A parsed marker: `A.on(<target>).type(<attr>, args...)`.
struct ParsedMarker {
    target: String,
    attribute: IrAttribute,
}

pub fn run(
    mut program: IrProgram,
    ctx: &PassContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> IrProgram {
    for module in &mut program.modules {
        let mut pending: Vec<(ParsedMarker, Option<tsonic_common::Span>)> = Vec::new();
        let mut kept = Vec::with_capacity(module.body.len());

        for statement in std::mem::take(&mut module.body) {
            match &statement {
                IrStatement::ExpressionStatement(expr) => match parse_marker(expr) {
                    Some(marker) => {
                        pending.push((marker, expr.source_span));
                        // Marker statements never survive into the body.
                        continue;
                    }
                    None => kept.push(statement),
                },
                _ => kept.push(statement),
            }
        }

        for (marker, span) in pending {
            let mut attached = false;
            for statement in &mut kept {
                match statement {
                    IrStatement::ClassDeclaration(class) if class.name == marker.target => {
                        class.attributes.push(marker.attribute.clone());
                        attached = true;
                        break;
                    }
                    IrStatement::FunctionDeclaration(func) if func.name == marker.target => {
                        func.attributes.push(marker.attribute.clone());
                        attached = true;
                        break;
                    }
                    _ => {}
                }
            }
            if !attached {
                diagnostics.push(
                    Diagnostic::from_template(codes::ATTRIBUTE_TARGET_NOT_FOUND, &[&marker.target])
                        .with_location(ctx.locate(&module.source_path, span)),
                );
            }
        }

        module.body = kept;
    }
    program
}

/// Match `A.on(Target).type(AttrType, ...args)`. Arguments are positional
/// literals only (string, number, boolean).
fn parse_marker(expr: &IrExpression) -> Option<ParsedMarker> {
    // Outer call: `<receiver>.type(AttrType, args...)`
    let IrExpressionKind::Call {
        callee: outer_callee,
        args: outer_args,
        ..
    } = &expr.kind
    else {
        return None;
    };
    let IrExpressionKind::MemberAccess {
        object: on_call,
        member: MemberKey::Name(type_name),
        ..
    } = &outer_callee.kind
    else {
        return None;
    };
    if type_name != "type" {
        return None;
    }

    // Receiver: `A.on(Target)`
    let IrExpressionKind::Call {
        callee: on_callee,
        args: on_args,
        ..
    } = &on_call.kind
    else {
        return None;
    };
    let IrExpressionKind::MemberAccess {
        object: root,
        member: MemberKey::Name(on_name),
        ..
    } = &on_callee.kind
    else {
        return None;
    };
    if on_name != "on" {
        return None;
    }
    let IrExpressionKind::Identifier { name: root_name, .. } = &root.kind else {
        return None;
    };
    if root_name != ATTRIBUTE_BUILDER {
        return None;
    }

    // Target and attribute type are identifiers.
    let [target_expr] = on_args.as_slice() else {
        return None;
    };
    let IrExpressionKind::Identifier { name: target, .. } = &target_expr.kind else {
        return None;
    };
    let (attr_expr, arg_exprs) = outer_args.split_first()?;
    let IrExpressionKind::Identifier {
        name: attribute_type,
        ..
    } = &attr_expr.kind
    else {
        return None;
    };

    // Positional literal arguments only; named arguments are not supported
    // yet.
    let mut arguments = Vec::with_capacity(arg_exprs.len());
    for arg in arg_exprs {
        let IrExpressionKind::Literal { value } = &arg.kind else {
            return None;
        };
        arguments.push(match value {
            IrLiteralValue::String(s) => IrAttributeArgument::String(s.clone()),
            IrLiteralValue::Number(n) => IrAttributeArgument::Number(*n),
            IrLiteralValue::Bool(b) => IrAttributeArgument::Bool(*b),
            IrLiteralValue::Null | IrLiteralValue::Undefined => return None,
        });
    }

    Some(ParsedMarker {
        target: target.clone(),
        attribute: IrAttribute {
            attribute_type: attribute_type.clone(),
            arguments,
        },
    })
}
