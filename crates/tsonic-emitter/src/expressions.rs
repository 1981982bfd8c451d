//! Expression emission. Emitters return text; statements thread a writer.

use crate::context::EmitterContext;
use crate::types::emit_type;
use tsonic_common::NameBucket;
use tsonic_ir::{
    AccessKind, IrAssignOp, IrBinaryOp, IrExpression, IrExpressionKind, IrLiteralValue,
    IrLogicalOp, IrUnaryOp, MemberKey,
};

pub(crate) fn emit_expression(expr: &IrExpression, ctx: &mut EmitterContext<'_>) -> String {
    match &expr.kind {
        IrExpressionKind::Literal { value } => emit_literal(value),
        IrExpressionKind::Identifier { name, .. } => emit_identifier(name, ctx),
        IrExpressionKind::MemberAccess {
            object,
            member,
            access_kind,
            optional,
        } => emit_member_access(object, member, *access_kind, *optional, ctx),
        IrExpressionKind::Call {
            callee,
            type_args,
            args,
            optional,
        } => emit_call(callee, type_args, args, *optional, ctx),
        IrExpressionKind::New { callee, args } => {
            let type_text = emit_type(callee, ctx);
            let arg_text = emit_args(args, ctx);
            format!("new {type_text}({arg_text})")
        }
        IrExpressionKind::Binary { op, left, right } => emit_binary(*op, left, right, ctx),
        IrExpressionKind::Logical { op, left, right } => {
            let op_text = match op {
                IrLogicalOp::And => "&&",
                IrLogicalOp::Or => "||",
                IrLogicalOp::Coalesce => "??",
            };
            format!(
                "{} {op_text} {}",
                emit_operand(left, ctx),
                emit_operand(right, ctx)
            )
        }
        IrExpressionKind::Unary { op, operand } => emit_unary(*op, operand, ctx),
        IrExpressionKind::Update {
            increment,
            prefix,
            operand,
        } => {
            let op_text = if *increment { "++" } else { "--" };
            let operand_text = emit_operand(operand, ctx);
            if *prefix {
                format!("{op_text}{operand_text}")
            } else {
                format!("{operand_text}{op_text}")
            }
        }
        IrExpressionKind::Conditional {
            condition,
            when_true,
            when_false,
        } => format!(
            "{} ? {} : {}",
            emit_operand(condition, ctx),
            emit_operand(when_true, ctx),
            emit_operand(when_false, ctx)
        ),
        IrExpressionKind::Assignment { op, target, value } => emit_assignment(*op, target, value, ctx),
        IrExpressionKind::ArrayLiteral { elements } => emit_array_literal(expr, elements, ctx),
        IrExpressionKind::ObjectLiteral {
            target_type,
            properties,
        } => emit_object_literal(target_type.as_ref(), properties, ctx),
        IrExpressionKind::FunctionValue {
            is_async,
            params,
            body,
            is_expression_body,
            ..
        } => emit_lambda(*is_async, params, body, *is_expression_body, ctx),
        IrExpressionKind::TemplateLiteral { head, spans } => emit_template(head, spans, ctx),
        IrExpressionKind::Spread { expression } => emit_expression(expression, ctx),
        IrExpressionKind::This => "this".to_string(),
        IrExpressionKind::Await { expression } => {
            format!("await {}", emit_operand(expression, ctx))
        }
        IrExpressionKind::Yield { .. } => {
            panic!("ICE: yield expression survived generator lowering")
        }
        IrExpressionKind::TypeAssertion { expression, target } => {
            format!(
                "(({})({}))",
                emit_type(target, ctx),
                emit_expression(expression, ctx)
            )
        }
        IrExpressionKind::TryCast { expression, target } => {
            format!(
                "({} as {})",
                emit_operand(expression, ctx),
                emit_type(target, ctx)
            )
        }
        IrExpressionKind::StackAlloc { element, length } => {
            format!(
                "stackalloc {}[{}]",
                emit_type(element, ctx),
                emit_expression(length, ctx)
            )
        }
        IrExpressionKind::NumericNarrowing {
            expression,
            target_kind,
        } => {
            format!(
                "({})({})",
                target_kind.csharp_keyword(),
                emit_expression(expression, ctx)
            )
        }
        IrExpressionKind::DynamicImport { .. } => {
            // Dependency edge only; the value itself has no CLR meaning.
            "null".to_string()
        }
        IrExpressionKind::UnsupportedExpression { what } => {
            panic!("ICE: unsupported expression '{what}' survived validation")
        }
    }
}

/// Wrap compound operands in parentheses; atoms stand alone.
fn emit_operand(expr: &IrExpression, ctx: &mut EmitterContext<'_>) -> String {
    let atomic = matches!(
        expr.kind,
        IrExpressionKind::Literal { .. }
            | IrExpressionKind::Identifier { .. }
            | IrExpressionKind::MemberAccess { .. }
            | IrExpressionKind::Call { .. }
            | IrExpressionKind::New { .. }
            | IrExpressionKind::This
            | IrExpressionKind::TemplateLiteral { .. }
            | IrExpressionKind::ObjectLiteral { .. }
            | IrExpressionKind::ArrayLiteral { .. }
            | IrExpressionKind::TypeAssertion { .. }
            | IrExpressionKind::NumericNarrowing { .. }
    );
    let text = emit_expression(expr, ctx);
    if atomic { text } else { format!("({text})") }
}

fn emit_literal(value: &IrLiteralValue) -> String {
    match value {
        IrLiteralValue::Number(n) => format_number(*n),
        IrLiteralValue::String(s) => format!("\"{}\"", escape_string(s)),
        IrLiteralValue::Bool(true) => "true".to_string(),
        IrLiteralValue::Bool(false) => "false".to_string(),
        IrLiteralValue::Null | IrLiteralValue::Undefined => "null".to_string(),
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        let mut text = format!("{n}");
        if !text.contains('.') && !text.contains('e') && !text.contains('E') {
            text.push_str(".0");
        }
        text
    }
}

pub(crate) fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            other => out.push(other),
        }
    }
    out
}

fn emit_identifier(name: &str, ctx: &mut EmitterContext<'_>) -> String {
    if let Some(binding) = ctx.import_bindings.get(name) {
        return format!("global::{}.{}", binding.fq_container, binding.export_name);
    }
    escape_identifier(name)
}

/// C# keywords used as identifiers get the `@` prefix.
pub(crate) fn escape_identifier(name: &str) -> String {
    const KEYWORDS: &[&str] = &[
        "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
        "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
        "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
        "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
        "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
        "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
        "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
        "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
        "void", "volatile", "while",
    ];
    if KEYWORDS.contains(&name) {
        format!("@{name}")
    } else {
        name.to_string()
    }
}

fn emit_member_access(
    object: &IrExpression,
    member: &MemberKey,
    access_kind: AccessKind,
    optional: bool,
    ctx: &mut EmitterContext<'_>,
) -> String {
    let object_text = emit_operand(object, ctx);
    match member {
        MemberKey::Index(index) => {
            // The numeric proof must have stamped Int32 intent on every
            // index that needs one; a missing marker is a compiler bug.
            if access_kind.requires_int32_index()
                && index
                    .inferred_type
                    .as_ref()
                    .and_then(tsonic_types::IrType::numeric_intent)
                    != Some(tsonic_common::NumericKind::Int32)
            {
                panic!("ICE: index expression reached the backend without a proven Int32 intent");
            }
            let index_text = emit_expression(index, ctx);
            format!("{object_text}[{index_text}]")
        }
        MemberKey::Name(name) => {
            // Explicit interface views: `obj.As_IFoo` becomes a cast.
            if let Some(interface) = name.strip_prefix("As_")
                && is_explicit_view(object, name, ctx)
            {
                return format!("(({interface}){object_text})");
            }
            let emitted = ctx.policy().apply(NameBucket::Properties, name);
            let dot = if optional { "?." } else { "." };
            format!("{object_text}{dot}{}", escape_identifier(&emitted))
        }
    }
}

/// Whether the accessed member is an `As_IInterface` explicit view declared
/// by the object's external binding.
fn is_explicit_view(object: &IrExpression, member: &str, ctx: &EmitterContext<'_>) -> bool {
    let Some(tsonic_types::IrType::Reference { name, .. }) = object.inferred_type.as_ref() else {
        return false;
    };
    ctx.registry
        .lookup(name)
        .is_some_and(|binding| binding.explicit_views.iter().any(|v| v == member))
}

fn emit_call(
    callee: &IrExpression,
    type_args: &[tsonic_types::IrType],
    args: &[IrExpression],
    optional: bool,
    ctx: &mut EmitterContext<'_>,
) -> String {
    // Core intrinsics with dedicated C# spellings.
    if let IrExpressionKind::Identifier { name, .. } = &callee.kind {
        match name.as_str() {
            "istype" if type_args.len() == 1 && args.len() == 1 => {
                return format!(
                    "{} is {}",
                    emit_operand(&args[0], ctx),
                    emit_type(&type_args[0], ctx)
                );
            }
            "nameof" if args.len() == 1 => {
                return format!("nameof({})", emit_expression(&args[0], ctx));
            }
            "sizeof" if type_args.len() == 1 => {
                return format!("sizeof({})", emit_type(&type_args[0], ctx));
            }
            "defaultof" if type_args.len() == 1 => {
                return format!("default({})", emit_type(&type_args[0], ctx));
            }
            "asinterface" if type_args.len() == 1 && args.len() == 1 => {
                return format!(
                    "(({}){})",
                    emit_type(&type_args[0], ctx),
                    emit_operand(&args[0], ctx)
                );
            }
            _ => {}
        }
    }

    let callee_text = match &callee.kind {
        // Method-position member accesses use the method naming bucket.
        IrExpressionKind::MemberAccess {
            object,
            member: MemberKey::Name(name),
            optional: member_optional,
            ..
        } => {
            let object_text = emit_operand(object, ctx);
            let emitted = ctx.policy().apply(NameBucket::Methods, name);
            let dot = if *member_optional { "?." } else { "." };
            format!("{object_text}{dot}{}", escape_identifier(&emitted))
        }
        _ => emit_operand(callee, ctx),
    };

    let type_arg_text = if type_args.is_empty() {
        String::new()
    } else {
        let parts: Vec<String> = type_args.iter().map(|t| emit_type(t, ctx)).collect();
        format!("<{}>", parts.join(", "))
    };
    let arg_text = emit_args(args, ctx);
    if optional {
        format!("{callee_text}?.Invoke({arg_text})")
    } else {
        format!("{callee_text}{type_arg_text}({arg_text})")
    }
}

fn emit_args(args: &[IrExpression], ctx: &mut EmitterContext<'_>) -> String {
    args.iter()
        .map(|arg| emit_expression(arg, ctx))
        .collect::<Vec<_>>()
        .join(", ")
}

fn emit_binary(
    op: IrBinaryOp,
    left: &IrExpression,
    right: &IrExpression,
    ctx: &mut EmitterContext<'_>,
) -> String {
    match op {
        IrBinaryOp::Exp => {
            return format!(
                "global::System.Math.Pow({}, {})",
                emit_expression(left, ctx),
                emit_expression(right, ctx)
            );
        }
        IrBinaryOp::Instanceof => {
            // `x instanceof T` reaches here when the right side is a type
            // identifier; emit a type test.
            let right_text = match &right.kind {
                IrExpressionKind::Identifier { name, .. } => {
                    crate::types::local_type_name(name, ctx)
                }
                _ => emit_operand(right, ctx),
            };
            return format!("{} is {right_text}", emit_operand(left, ctx));
        }
        IrBinaryOp::In => {
            return format!(
                "{}.ContainsKey({})",
                emit_operand(right, ctx),
                emit_expression(left, ctx)
            );
        }
        _ => {}
    }
    let op_text = match op {
        IrBinaryOp::Add => "+",
        IrBinaryOp::Sub => "-",
        IrBinaryOp::Mul => "*",
        IrBinaryOp::Div => "/",
        IrBinaryOp::Rem => "%",
        IrBinaryOp::ShiftLeft => "<<",
        IrBinaryOp::ShiftRight => ">>",
        IrBinaryOp::ShiftRightUnsigned => ">>>",
        IrBinaryOp::BitAnd => "&",
        IrBinaryOp::BitOr => "|",
        IrBinaryOp::BitXor => "^",
        IrBinaryOp::Eq => "==",
        IrBinaryOp::NotEq => "!=",
        IrBinaryOp::Less => "<",
        IrBinaryOp::LessEq => "<=",
        IrBinaryOp::Greater => ">",
        IrBinaryOp::GreaterEq => ">=",
        IrBinaryOp::Exp | IrBinaryOp::Instanceof | IrBinaryOp::In => unreachable!(),
    };
    format!(
        "{} {op_text} {}",
        emit_operand(left, ctx),
        emit_operand(right, ctx)
    )
}

fn emit_unary(op: IrUnaryOp, operand: &IrExpression, ctx: &mut EmitterContext<'_>) -> String {
    match op {
        IrUnaryOp::Minus => format!("-{}", emit_operand(operand, ctx)),
        IrUnaryOp::Plus => format!("+{}", emit_operand(operand, ctx)),
        IrUnaryOp::Not => format!("!{}", emit_operand(operand, ctx)),
        IrUnaryOp::BitNot => format!("~{}", emit_operand(operand, ctx)),
        IrUnaryOp::Typeof => format!("{}.GetType().ToString()", emit_operand(operand, ctx)),
        IrUnaryOp::Void => "((object?)null)".to_string(),
        IrUnaryOp::Delete => {
            panic!("ICE: delete expression survived validation")
        }
    }
}

fn emit_assignment(
    op: IrAssignOp,
    target: &IrExpression,
    value: &IrExpression,
    ctx: &mut EmitterContext<'_>,
) -> String {
    let target_text = emit_expression(target, ctx);
    let value_text = emit_expression(value, ctx);
    match op {
        IrAssignOp::Assign => format!("{target_text} = {value_text}"),
        IrAssignOp::Add => format!("{target_text} += {value_text}"),
        IrAssignOp::Sub => format!("{target_text} -= {value_text}"),
        IrAssignOp::Mul => format!("{target_text} *= {value_text}"),
        IrAssignOp::Div => format!("{target_text} /= {value_text}"),
        IrAssignOp::Rem => format!("{target_text} %= {value_text}"),
        IrAssignOp::ShiftLeft => format!("{target_text} <<= {value_text}"),
        IrAssignOp::ShiftRight => format!("{target_text} >>= {value_text}"),
        IrAssignOp::ShiftRightUnsigned => format!("{target_text} >>>= {value_text}"),
        IrAssignOp::BitAnd => format!("{target_text} &= {value_text}"),
        IrAssignOp::BitOr => format!("{target_text} |= {value_text}"),
        IrAssignOp::BitXor => format!("{target_text} ^= {value_text}"),
        IrAssignOp::Coalesce => format!("{target_text} ??= {value_text}"),
        // C# has no &&= / ||=; expand.
        IrAssignOp::And => format!("{target_text} = {target_text} && {value_text}"),
        IrAssignOp::Or => format!("{target_text} = {target_text} || {value_text}"),
        IrAssignOp::Exp => format!(
            "{target_text} = global::System.Math.Pow({target_text}, {value_text})"
        ),
    }
}

fn emit_array_literal(
    expr: &IrExpression,
    elements: &[IrExpression],
    ctx: &mut EmitterContext<'_>,
) -> String {
    let element_texts = elements
        .iter()
        .map(|e| emit_expression(e, ctx))
        .collect::<Vec<_>>()
        .join(", ");
    match expr.inferred_type.as_ref() {
        Some(ty @ tsonic_types::IrType::Array { element, origin }) => {
            let native = ctx.runtime() == tsonic_common::RuntimeMode::Dotnet
                && *origin == tsonic_types::ArrayOrigin::Explicit;
            if native {
                let element_text = emit_type(element, ctx);
                format!("new {element_text}[] {{ {element_texts} }}")
            } else {
                let list_text = emit_type(ty, ctx);
                format!("new {list_text} {{ {element_texts} }}")
            }
        }
        _ => format!("new[] {{ {element_texts} }}"),
    }
}

fn emit_object_literal(
    target_type: Option<&tsonic_types::IrType>,
    properties: &[(String, IrExpression)],
    ctx: &mut EmitterContext<'_>,
) -> String {
    let props = properties
        .iter()
        .map(|(name, value)| {
            let emitted = ctx.policy().apply(NameBucket::Properties, name);
            format!(
                "{} = {}",
                escape_identifier(&emitted),
                emit_expression(value, ctx)
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    match target_type {
        Some(ty) => {
            let type_text = emit_type(ty, ctx);
            if props.is_empty() {
                format!("new {type_text}()")
            } else {
                format!("new {type_text} {{ {props} }}")
            }
        }
        None => format!("new {{ {props} }}"),
    }
}

fn emit_lambda(
    is_async: bool,
    params: &[tsonic_ir::IrParamDecl],
    body: &[tsonic_ir::IrStatement],
    is_expression_body: bool,
    ctx: &mut EmitterContext<'_>,
) -> String {
    let param_text = params
        .iter()
        .map(|p| escape_identifier(&p.name))
        .collect::<Vec<_>>()
        .join(", ");
    let prefix = if is_async { "async " } else { "" };

    // An expression body is a single lowered return.
    if is_expression_body
        && let [tsonic_ir::IrStatement::Return(Some(value))] = body
    {
        return format!("{prefix}({param_text}) => {}", emit_expression(value, ctx));
    }

    // Block bodies emit single-line; statement text never carries raw
    // newlines (string literals are escaped).
    let mut writer = crate::writer::SourceWriter::new();
    for statement in body {
        crate::statements::emit_statement(statement, ctx, &mut writer);
    }
    let body_text = writer
        .finish()
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ");
    format!("{prefix}({param_text}) => {{ {} }}", body_text.trim())
}

fn emit_template(
    head: &str,
    spans: &[(IrExpression, String)],
    ctx: &mut EmitterContext<'_>,
) -> String {
    let mut out = String::from("$\"");
    out.push_str(&escape_interpolated(head));
    for (expr, text) in spans {
        out.push('{');
        out.push_str(&emit_expression(expr, ctx));
        out.push('}');
        out.push_str(&escape_interpolated(text));
    }
    out.push('"');
    out
}

fn escape_interpolated(text: &str) -> String {
    escape_string(text).replace('{', "{{").replace('}', "}}")
}
