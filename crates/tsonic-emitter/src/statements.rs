//! Statement emission inside method and function bodies.

use crate::context::EmitterContext;
use crate::expressions::{emit_expression, escape_identifier};
use crate::types::emit_type;
use crate::writer::SourceWriter;
use tsonic_ir::{IrStatement, IrVariableDeclaration};

pub(crate) fn emit_statement(
    statement: &IrStatement,
    ctx: &mut EmitterContext<'_>,
    writer: &mut SourceWriter,
) {
    match statement {
        IrStatement::VariableDeclaration(decl) => emit_local_variable(decl, ctx, writer),
        IrStatement::FunctionDeclaration(func) => {
            // Nested function declarations become C# local functions.
            crate::declarations::emit_local_function(func, ctx, writer);
        }
        IrStatement::ExpressionStatement(expr) => {
            let text = emit_expression(expr, ctx);
            writer.write_line(&format!("{text};"));
        }
        IrStatement::If(if_stmt) => {
            let condition = emit_expression(&if_stmt.condition, ctx);
            writer.write_line(&format!("if ({condition})"));
            emit_embedded(&if_stmt.then_branch, ctx, writer);
            if let Some(else_branch) = &if_stmt.else_branch {
                writer.write_line("else");
                emit_embedded(else_branch, ctx, writer);
            }
        }
        IrStatement::While(while_stmt) => {
            let condition = emit_expression(&while_stmt.condition, ctx);
            writer.write_line(&format!("while ({condition})"));
            emit_embedded(&while_stmt.body, ctx, writer);
        }
        IrStatement::DoWhile(do_stmt) => {
            writer.write_line("do");
            emit_embedded(&do_stmt.body, ctx, writer);
            let condition = emit_expression(&do_stmt.condition, ctx);
            writer.write_line(&format!("while ({condition});"));
        }
        IrStatement::For(for_stmt) => {
            let init = match &for_stmt.init {
                Some(statement) => emit_for_init(statement, ctx),
                None => String::new(),
            };
            let condition = for_stmt
                .condition
                .as_ref()
                .map(|c| emit_expression(c, ctx))
                .unwrap_or_default();
            let update = for_stmt
                .update
                .as_ref()
                .map(|u| emit_expression(u, ctx))
                .unwrap_or_default();
            writer.write_line(&format!("for ({init}; {condition}; {update})"));
            emit_embedded(&for_stmt.body, ctx, writer);
        }
        IrStatement::ForOf(for_of) => {
            let iterable = emit_expression(&for_of.iterable, ctx);
            let binding = escape_identifier(&for_of.binding);
            writer.write_line(&format!("foreach (var {binding} in {iterable})"));
            emit_embedded(&for_of.body, ctx, writer);
        }
        IrStatement::ForIn(for_in) => {
            let object = emit_expression(&for_in.object, ctx);
            let binding = escape_identifier(&for_in.binding);
            // for-in enumerates keys; dictionaries expose them directly.
            writer.write_line(&format!("foreach (var {binding} in {object}.Keys)"));
            emit_embedded(&for_in.body, ctx, writer);
        }
        IrStatement::Switch(switch) => {
            let discriminant = emit_expression(&switch.discriminant, ctx);
            writer.write_line(&format!("switch ({discriminant})"));
            writer.open_brace();
            for case in &switch.cases {
                match &case.test {
                    Some(test) => {
                        let test_text = emit_expression(test, ctx);
                        writer.write_line(&format!("case {test_text}:"));
                    }
                    None => writer.write_line("default:"),
                }
                writer.open_brace();
                let mut terminated = false;
                for inner in &case.statements {
                    emit_statement(inner, ctx, writer);
                    if matches!(
                        inner,
                        IrStatement::Break | IrStatement::Return(_) | IrStatement::Throw(_)
                    ) {
                        terminated = true;
                    }
                }
                if !terminated {
                    writer.write_line("break;");
                }
                writer.close_brace();
            }
            writer.close_brace();
        }
        IrStatement::Try(try_stmt) => {
            writer.write_line("try");
            writer.open_brace();
            for inner in &try_stmt.block {
                emit_statement(inner, ctx, writer);
            }
            writer.close_brace();
            if let Some(catch_block) = &try_stmt.catch_block {
                match &try_stmt.catch_param {
                    Some(param) => writer.write_line(&format!(
                        "catch (global::System.Exception {})",
                        escape_identifier(param)
                    )),
                    None => writer.write_line("catch"),
                }
                writer.open_brace();
                for inner in catch_block {
                    emit_statement(inner, ctx, writer);
                }
                writer.close_brace();
            }
            if let Some(finally_block) = &try_stmt.finally_block {
                writer.write_line("finally");
                writer.open_brace();
                for inner in finally_block {
                    emit_statement(inner, ctx, writer);
                }
                writer.close_brace();
            }
        }
        IrStatement::Throw(expr) => {
            let text = emit_expression(expr, ctx);
            writer.write_line(&format!("throw {text};"));
        }
        IrStatement::Block(statements) => {
            writer.open_brace();
            for inner in statements {
                emit_statement(inner, ctx, writer);
            }
            writer.close_brace();
        }
        IrStatement::Break => writer.write_line("break;"),
        IrStatement::Continue => writer.write_line("continue;"),
        IrStatement::Empty => {}
        IrStatement::Return(None) => writer.write_line("return;"),
        IrStatement::Return(Some(expr)) => {
            let text = emit_expression(expr, ctx);
            writer.write_line(&format!("return {text};"));
        }
        IrStatement::YieldStatement(yield_stmt) => {
            // Inside the lowered generator body method.
            match &yield_stmt.value {
                Some(value) => {
                    let text = emit_expression(value, ctx);
                    writer.write_line(&format!("yield return {text};"));
                }
                None => writer.write_line("yield return default;"),
            }
        }
        IrStatement::GeneratorReturnStatement(_) => {
            writer.write_line("yield break;");
        }
        IrStatement::ClassDeclaration(_)
        | IrStatement::InterfaceDeclaration(_)
        | IrStatement::EnumDeclaration(_)
        | IrStatement::TypeAliasDeclaration(_) => {
            panic!("ICE: type declaration in statement position")
        }
        IrStatement::Unsupported { what, .. } => {
            panic!("ICE: unsupported construct '{what}' survived validation")
        }
    }
}

/// Local `var`/typed declarations.
fn emit_local_variable(
    decl: &IrVariableDeclaration,
    ctx: &mut EmitterContext<'_>,
    writer: &mut SourceWriter,
) {
    let name = escape_identifier(&decl.name);
    let initializer = decl.initializer.as_ref().map(|init| emit_expression(init, ctx));
    match (&decl.declared_type, initializer) {
        (Some(ty), Some(init)) => {
            let type_text = emit_type(ty, ctx);
            writer.write_line(&format!("{type_text} {name} = {init};"));
        }
        (Some(ty), None) => {
            let type_text = emit_type(ty, ctx);
            writer.write_line(&format!("{type_text} {name};"));
        }
        (None, Some(init)) => {
            writer.write_line(&format!("var {name} = {init};"));
        }
        (None, None) => {
            writer.write_line(&format!("object {name};"));
        }
    }
}

fn emit_for_init(statement: &IrStatement, ctx: &mut EmitterContext<'_>) -> String {
    match statement {
        IrStatement::VariableDeclaration(decl) => {
            let name = escape_identifier(&decl.name);
            let init = decl
                .initializer
                .as_ref()
                .map(|i| emit_expression(i, ctx))
                .unwrap_or_else(|| "default".to_string());
            match &decl.declared_type {
                Some(ty) => {
                    let type_text = emit_type(ty, ctx);
                    format!("{type_text} {name} = {init}")
                }
                None => format!("var {name} = {init}"),
            }
        }
        IrStatement::ExpressionStatement(expr) => emit_expression(expr, ctx),
        _ => String::new(),
    }
}

fn emit_embedded(
    statement: &IrStatement,
    ctx: &mut EmitterContext<'_>,
    writer: &mut SourceWriter,
) {
    match statement {
        IrStatement::Block(_) => emit_statement(statement, ctx, writer),
        other => {
            writer.open_brace();
            emit_statement(other, ctx, writer);
            writer.close_brace();
        }
    }
}
