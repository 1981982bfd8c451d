//! Declaration emission: interfaces, classes, enums, aliases, functions,
//! fields, and the module container.

use crate::context::EmitterContext;
use crate::expressions::{emit_expression, escape_identifier};
use crate::types::{emit_type, local_type_name};
use crate::writer::SourceWriter;
use tsonic_common::NameBucket;
use tsonic_ir::{
    IrAttribute, IrAttributeArgument, IrClassDeclaration, IrClassMember, IrEnumDeclaration,
    IrFunctionDeclaration, IrInterfaceDeclaration, IrInterfaceMember, IrMethodKind, IrParamDecl,
    IrTypeAliasDeclaration, IrTypeParamDecl, IrVariableDeclaration, ParamPassing,
};
use tsonic_types::IrType;

pub(crate) fn visibility_keyword(exported: bool) -> &'static str {
    if exported { "public" } else { "internal" }
}

// =============================================================================
// Interfaces
// =============================================================================

/// A source interface with any method signature emits as a C# `interface`;
/// otherwise as a class (or struct) with auto-properties so object literals
/// can construct it. Inline object-type members are extracted to sibling
/// classes.
pub(crate) fn emit_interface(
    iface: &IrInterfaceDeclaration,
    ctx: &mut EmitterContext<'_>,
    writer: &mut SourceWriter,
) {
    let has_methods = iface
        .members
        .iter()
        .any(|m| matches!(m, IrInterfaceMember::Method(_)));

    let name = local_type_name(&iface.name, ctx);
    let type_params = emit_type_params(&iface.type_params);
    let heritage = if iface.extends.is_empty() {
        String::new()
    } else {
        let bases: Vec<String> = iface.extends.iter().map(|b| emit_type(b, ctx)).collect();
        format!(" : {}", bases.join(", "))
    };

    // Sibling classes for inline object-type members.
    let mut siblings: Vec<(String, Vec<tsonic_types::IrObjectMember>)> = Vec::new();

    if has_methods && !iface.is_struct {
        writer.write_line(&format!(
            "{} interface {name}{type_params}{heritage}",
            visibility_keyword(iface.exported)
        ));
        writer.open_brace();
        for member in &iface.members {
            match member {
                IrInterfaceMember::Property(prop) => {
                    let prop_name = ctx.policy().apply(NameBucket::Properties, &prop.name);
                    let ty = member_type_text(&prop.ty, prop.optional, &iface.name, &prop.name, ctx, &mut siblings);
                    writer.write_line(&format!(
                        "{ty} {} {{ get; set; }}",
                        escape_identifier(&prop_name)
                    ));
                }
                IrInterfaceMember::Method(method) => {
                    let method_name = ctx.policy().apply(NameBucket::Methods, &method.name);
                    let method_type_params = emit_type_params(&method.type_params);
                    let params = emit_params(&method.params, ctx);
                    let return_text = method
                        .return_type
                        .as_ref()
                        .map_or_else(|| "void".to_string(), |t| emit_type(t, ctx));
                    writer.write_line(&format!(
                        "{return_text} {}{method_type_params}({params});",
                        escape_identifier(&method_name)
                    ));
                }
            }
        }
        writer.close_brace();
    } else {
        let keyword = if iface.is_struct { "struct" } else { "class" };
        writer.write_line(&format!(
            "{} {keyword} {name}{type_params}{heritage}",
            visibility_keyword(iface.exported)
        ));
        writer.open_brace();
        for member in &iface.members {
            let IrInterfaceMember::Property(prop) = member else {
                // Struct-marked interfaces with methods keep them as
                // ordinary members on the struct.
                if let IrInterfaceMember::Method(method) = member {
                    let method_name = ctx.policy().apply(NameBucket::Methods, &method.name);
                    let params = emit_params(&method.params, ctx);
                    let return_text = method
                        .return_type
                        .as_ref()
                        .map_or_else(|| "void".to_string(), |t| emit_type(t, ctx));
                    writer.write_line(&format!(
                        "public {return_text} {}({params}) => throw new global::System.NotImplementedException();",
                        escape_identifier(&method_name)
                    ));
                }
                continue;
            };
            emit_auto_property(prop, &iface.name, iface.is_struct, ctx, writer, &mut siblings);
        }
        writer.close_brace();
    }

    for (sibling_name, members) in siblings {
        writer.blank_line();
        emit_shape_class(&sibling_name, &members, iface.exported, ctx, writer);
    }
}

fn emit_auto_property(
    prop: &tsonic_ir::IrPropertySignature,
    owner_name: &str,
    owner_is_struct: bool,
    ctx: &mut EmitterContext<'_>,
    writer: &mut SourceWriter,
    siblings: &mut Vec<(String, Vec<tsonic_types::IrObjectMember>)>,
) {
    let prop_name = ctx.policy().apply(NameBucket::Properties, &prop.name);
    let ty = member_type_text(&prop.ty, prop.optional, owner_name, &prop.name, ctx, siblings);
    // C# 11 `required` on non-optional class members; structs initialize by
    // construction.
    let required = if !prop.optional && !owner_is_struct {
        "required "
    } else {
        ""
    };
    let accessors = if prop.readonly {
        "{ get; init; }"
    } else {
        "{ get; set; }"
    };
    writer.write_line(&format!(
        "public {required}{ty} {} {accessors}",
        escape_identifier(&prop_name)
    ));
}

/// Member type text, extracting inline object types into sibling classes
/// and applying optionality (`T?`).
fn member_type_text(
    ty: &IrType,
    optional: bool,
    owner_name: &str,
    member_name: &str,
    ctx: &mut EmitterContext<'_>,
    siblings: &mut Vec<(String, Vec<tsonic_types::IrObjectMember>)>,
) -> String {
    let base = match ty {
        IrType::Object { members } => {
            let sibling_name = format!(
                "{owner_name}{}",
                tsonic_common::options::to_pascal_case(member_name)
            );
            siblings.push((sibling_name.clone(), members.clone()));
            sibling_name
        }
        other => emit_type(other, ctx),
    };
    if optional && !base.ends_with('?') {
        format!("{base}?")
    } else {
        base
    }
}

/// A plain data class for an extracted object shape.
fn emit_shape_class(
    name: &str,
    members: &[tsonic_types::IrObjectMember],
    exported: bool,
    ctx: &mut EmitterContext<'_>,
    writer: &mut SourceWriter,
) {
    writer.write_line(&format!("{} class {name}", visibility_keyword(exported)));
    writer.open_brace();
    for member in members {
        let prop_name = ctx.policy().apply(NameBucket::Properties, &member.name);
        let mut siblings = Vec::new();
        let ty = member_type_text(&member.ty, member.optional, name, &member.name, ctx, &mut siblings);
        let required = if member.optional { "" } else { "required " };
        let accessors = if member.readonly {
            "{ get; init; }"
        } else {
            "{ get; set; }"
        };
        writer.write_line(&format!(
            "public {required}{ty} {} {accessors}",
            escape_identifier(&prop_name)
        ));
        for (sibling_name, sibling_members) in siblings {
            writer.blank_line();
            emit_shape_class(&sibling_name, &sibling_members, exported, ctx, writer);
        }
    }
    writer.close_brace();
}

// =============================================================================
// Type aliases
// =============================================================================

/// Aliases have no C# declaration; references expand them. The exception is
/// an alias to an object type, which emits a generated `__Alias` class.
pub(crate) fn emit_type_alias(
    alias: &IrTypeAliasDeclaration,
    ctx: &mut EmitterContext<'_>,
    writer: &mut SourceWriter,
) {
    if let IrType::Object { members } = &alias.ty {
        emit_shape_class(
            &format!("{}__Alias", alias.name),
            members,
            alias.exported,
            ctx,
            writer,
        );
    }
}

// =============================================================================
// Classes
// =============================================================================

pub(crate) fn emit_class(
    class: &IrClassDeclaration,
    ctx: &mut EmitterContext<'_>,
    writer: &mut SourceWriter,
) {
    emit_attributes(&class.attributes, ctx, writer);
    let keyword = if class.is_struct { "struct" } else { "class" };
    let abstract_kw = if class.is_abstract && !class.is_struct {
        "abstract "
    } else {
        ""
    };
    let name = local_type_name(&class.name, ctx);
    let type_params = emit_type_params(&class.type_params);

    let mut bases = Vec::new();
    if let Some(base) = &class.base {
        bases.push(emit_type(base, ctx));
    }
    for implemented in &class.implements {
        bases.push(emit_type(implemented, ctx));
    }
    let heritage = if bases.is_empty() {
        String::new()
    } else {
        format!(" : {}", bases.join(", "))
    };

    writer.write_line(&format!(
        "{} {abstract_kw}{keyword} {name}{type_params}{heritage}",
        visibility_keyword(class.exported)
    ));
    let constraints = emit_constraints(&class.type_params, ctx);
    if !constraints.is_empty() {
        writer.increase_indent();
        for constraint in constraints {
            writer.write_line(&constraint);
        }
        writer.decrease_indent();
    }
    writer.open_brace();

    let mut first = true;
    for member in &class.members {
        if !first {
            writer.blank_line();
        }
        first = false;
        match member {
            IrClassMember::Field(field) => {
                let field_name = ctx.policy().apply(NameBucket::Fields, &field.name);
                let visibility = match field.visibility {
                    tsonic_ir::IrVisibility::Public => "public",
                    tsonic_ir::IrVisibility::Private => "private",
                    tsonic_ir::IrVisibility::Protected => "protected",
                };
                let static_kw = if field.is_static { "static " } else { "" };
                let readonly_kw = if field.is_readonly { "readonly " } else { "" };
                let mut ty = field
                    .ty
                    .as_ref()
                    .map_or_else(|| "object".to_string(), |t| emit_type(t, ctx));
                if field.optional && !ty.ends_with('?') {
                    ty.push('?');
                }
                let init = field
                    .initializer
                    .as_ref()
                    .map(|i| format!(" = {}", emit_expression(i, ctx)))
                    .unwrap_or_default();
                writer.write_line(&format!(
                    "{visibility} {static_kw}{readonly_kw}{ty} {}{init};",
                    escape_identifier(&field_name)
                ));
            }
            IrClassMember::Method(method) => {
                emit_class_method(class, method, ctx, writer);
            }
        }
    }

    writer.close_brace();
}

fn emit_class_method(
    class: &IrClassDeclaration,
    method: &tsonic_ir::IrMethodMember,
    ctx: &mut EmitterContext<'_>,
    writer: &mut SourceWriter,
) {
    let visibility = match method.visibility {
        tsonic_ir::IrVisibility::Public => "public",
        tsonic_ir::IrVisibility::Private => "private",
        tsonic_ir::IrVisibility::Protected => "protected",
    };
    let static_kw = if method.is_static { "static " } else { "" };
    let was_static = ctx.is_static;
    let was_async = ctx.is_async;
    ctx.is_static = method.is_static;
    ctx.is_async = method.is_async;

    match method.kind {
        IrMethodKind::Constructor => {
            emit_attributes(&class.ctor_attributes, ctx, writer);
            let params = emit_params(&method.params, ctx);
            let class_name = local_type_name(&class.name, ctx);
            // Nested names keep only the innermost segment for the ctor.
            let ctor_name = class_name.rsplit('.').next().unwrap_or(&class_name).to_string();
            writer.write_line(&format!("{visibility} {ctor_name}({params})"));
            emit_body_block(method.body.as_deref().unwrap_or(&[]), ctx, writer);
        }
        IrMethodKind::Getter | IrMethodKind::Setter => {
            // Paired accessors are grouped by name; emit each side as it
            // appears. The property type comes from the getter return or
            // setter parameter.
            let prop_name = ctx.policy().apply(NameBucket::Properties, &method.name);
            let ty = method
                .return_type
                .as_ref()
                .or_else(|| method.params.first().and_then(|p| p.ty.as_ref()))
                .map_or_else(|| "object".to_string(), |t| emit_type(t, ctx));
            writer.write_line(&format!(
                "{visibility} {static_kw}{ty} {}",
                escape_identifier(&prop_name)
            ));
            writer.open_brace();
            if method.kind == IrMethodKind::Getter {
                writer.write_line("get");
            } else {
                writer.write_line("set");
            }
            emit_body_block(method.body.as_deref().unwrap_or(&[]), ctx, writer);
            writer.close_brace();
        }
        IrMethodKind::Method => {
            let method_name = ctx.policy().apply(NameBucket::Methods, &method.name);
            let async_kw = if method.is_async { "async " } else { "" };
            let type_params = emit_type_params(&method.type_params);
            let params = emit_params(&method.params, ctx);
            let return_text = return_type_text(method.return_type.as_ref(), method.is_async, ctx);
            writer.write_line(&format!(
                "{visibility} {static_kw}{async_kw}{return_text} {}{type_params}({params})",
                escape_identifier(&method_name)
            ));
            for constraint in emit_constraints(&method.type_params, ctx) {
                writer.increase_indent();
                writer.write_line(&constraint);
                writer.decrease_indent();
            }
            match &method.body {
                Some(body) => emit_body_block(body, ctx, writer),
                None => writer.write_line(";"),
            }
        }
    }

    ctx.is_static = was_static;
    ctx.is_async = was_async;
}

// =============================================================================
// Enums
// =============================================================================

pub(crate) fn emit_enum(
    decl: &IrEnumDeclaration,
    ctx: &mut EmitterContext<'_>,
    writer: &mut SourceWriter,
) {
    let name = local_type_name(&decl.name, ctx);
    writer.write_line(&format!(
        "{} enum {name}",
        visibility_keyword(decl.exported)
    ));
    writer.open_brace();
    for member in &decl.members {
        let member_name = ctx.policy().apply(NameBucket::EnumMembers, &member.name);
        match &member.initializer {
            Some(init) => {
                let text = emit_expression(init, ctx);
                writer.write_line(&format!("{} = {text},", escape_identifier(&member_name)));
            }
            None => writer.write_line(&format!("{},", escape_identifier(&member_name))),
        }
    }
    writer.close_brace();
}

// =============================================================================
// Functions and fields
// =============================================================================

/// A module-level function becomes a static method on the container.
pub(crate) fn emit_function_as_method(
    func: &IrFunctionDeclaration,
    ctx: &mut EmitterContext<'_>,
    writer: &mut SourceWriter,
) {
    if func.is_generator {
        crate::generators::emit_generator_function(func, ctx, writer);
        return;
    }

    emit_attributes(&func.attributes, ctx, writer);
    let method_name = ctx.policy().apply(NameBucket::Methods, &func.name);
    let async_kw = if func.is_async { "async " } else { "" };
    let type_params = emit_type_params(&func.type_params);
    let params = emit_params(&func.params, ctx);
    let return_text = return_type_text(func.return_type.as_ref(), func.is_async, ctx);

    let was_async = ctx.is_async;
    ctx.is_async = func.is_async;
    writer.write_line(&format!(
        "{} static {async_kw}{return_text} {}{type_params}({params})",
        visibility_keyword(func.exported),
        escape_identifier(&method_name)
    ));
    for constraint in emit_constraints(&func.type_params, ctx) {
        writer.increase_indent();
        writer.write_line(&constraint);
        writer.decrease_indent();
    }
    emit_body_block(&func.body, ctx, writer);
    ctx.is_async = was_async;
}

/// Nested function declarations emit as C# local functions.
pub(crate) fn emit_local_function(
    func: &IrFunctionDeclaration,
    ctx: &mut EmitterContext<'_>,
    writer: &mut SourceWriter,
) {
    let async_kw = if func.is_async { "async " } else { "" };
    let type_params = emit_type_params(&func.type_params);
    let params = emit_params(&func.params, ctx);
    let return_text = return_type_text(func.return_type.as_ref(), func.is_async, ctx);
    writer.write_line(&format!(
        "{async_kw}{return_text} {}{type_params}({params})",
        escape_identifier(&func.name)
    ));
    emit_body_block(&func.body, ctx, writer);
}

/// Module-level variable declarations stay static fields regardless of
/// top-level code.
pub(crate) fn emit_container_field(
    decl: &IrVariableDeclaration,
    ctx: &mut EmitterContext<'_>,
    writer: &mut SourceWriter,
) {
    let field_name = ctx.policy().apply(NameBucket::Fields, &decl.name);
    let ty = decl
        .declared_type
        .as_ref()
        .map_or_else(|| "object".to_string(), |t| emit_type(t, ctx));
    let readonly = if decl.decl_kind == tsonic_ir::IrDeclKind::Const && !decl.is_written {
        "readonly "
    } else {
        ""
    };
    let init = decl
        .initializer
        .as_ref()
        .map(|i| format!(" = {}", emit_expression(i, ctx)))
        .unwrap_or_default();
    writer.write_line(&format!(
        "{} static {readonly}{ty} {}{init};",
        visibility_keyword(decl.exported),
        escape_identifier(&field_name)
    ));
}

// =============================================================================
// Shared pieces
// =============================================================================

pub(crate) fn emit_body_block(
    body: &[tsonic_ir::IrStatement],
    ctx: &mut EmitterContext<'_>,
    writer: &mut SourceWriter,
) {
    writer.open_brace();
    for statement in body {
        crate::statements::emit_statement(statement, ctx, writer);
    }
    writer.close_brace();
}

pub(crate) fn emit_type_params(type_params: &[IrTypeParamDecl]) -> String {
    if type_params.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = type_params.iter().map(|p| p.name.as_str()).collect();
    format!("<{}>", names.join(", "))
}

/// `where` clauses for constrained type parameters.
pub(crate) fn emit_constraints(
    type_params: &[IrTypeParamDecl],
    ctx: &mut EmitterContext<'_>,
) -> Vec<String> {
    type_params
        .iter()
        .filter_map(|param| {
            let constraint = param.constraint.as_ref()?;
            let text = match constraint {
                IrType::Primitive { name, .. } if name == "object" => "class".to_string(),
                other => emit_type(other, ctx),
            };
            Some(format!("where {} : {text}", param.name))
        })
        .collect()
}

pub(crate) fn emit_params(params: &[IrParamDecl], ctx: &mut EmitterContext<'_>) -> String {
    params
        .iter()
        .map(|param| {
            let modifier = match param.passing {
                ParamPassing::Value => "",
                ParamPassing::Ref => "ref ",
                ParamPassing::Out => "out ",
                ParamPassing::In => "in ",
                ParamPassing::InRef => "ref readonly ",
            };
            let mut ty = param
                .ty
                .as_ref()
                .map_or_else(|| "object".to_string(), |t| emit_type(t, ctx));
            if param.is_rest {
                return format!("params {ty}[] {}", escape_identifier(&param.name));
            }
            if param.optional && !ty.ends_with('?') {
                ty.push('?');
            }
            let default = if param.optional {
                " = default"
            } else {
                ""
            };
            format!(
                "{modifier}{ty} {}{default}",
                escape_identifier(&param.name)
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn return_type_text(
    return_type: Option<&IrType>,
    is_async: bool,
    ctx: &mut EmitterContext<'_>,
) -> String {
    match return_type {
        Some(ty) => {
            if ty.is_void_like() {
                if is_async {
                    ctx.add_using("System.Threading.Tasks");
                    "Task".to_string()
                } else {
                    "void".to_string()
                }
            } else {
                emit_type(ty, ctx)
            }
        }
        None => {
            if is_async {
                ctx.add_using("System.Threading.Tasks");
                "Task".to_string()
            } else {
                "void".to_string()
            }
        }
    }
}

pub(crate) fn emit_attributes(
    attributes: &[IrAttribute],
    _ctx: &mut EmitterContext<'_>,
    writer: &mut SourceWriter,
) {
    for attribute in attributes {
        let args = attribute
            .arguments
            .iter()
            .map(|arg| match arg {
                IrAttributeArgument::String(s) => {
                    format!("\"{}\"", crate::expressions::escape_string(s))
                }
                IrAttributeArgument::Number(n) => crate::expressions::format_number(*n),
                IrAttributeArgument::Bool(true) => "true".to_string(),
                IrAttributeArgument::Bool(false) => "false".to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        if args.is_empty() {
            writer.write_line(&format!("[{}]", attribute.attribute_type));
        } else {
            writer.write_line(&format!("[{}({args})]", attribute.attribute_type));
        }
    }
}
