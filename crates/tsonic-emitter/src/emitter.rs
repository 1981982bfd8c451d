//! Module assembly: one C# file per IR module.

use crate::context::EmitterContext;
use crate::declarations::{
    emit_class, emit_container_field, emit_enum, emit_function_as_method, emit_interface,
    emit_type_alias,
};
use crate::statements::emit_statement;
use crate::writer::SourceWriter;
use indexmap::IndexMap;
use tracing::debug;
use tsonic_common::CompilerOptions;
use tsonic_ir::{IrModule, IrProgram, IrStatement};
use tsonic_types::{BindingsRegistry, IrType};

/// Backend options beyond the compiler options proper.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Timestamp text placed in the file header. Golden comparisons pass a
    /// stable placeholder.
    pub timestamp: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            timestamp: "TIMESTAMP".to_string(),
        }
    }
}

/// Emit every module. The result maps relative output paths to C# text.
pub fn emit_program(
    program: &IrProgram,
    options: &CompilerOptions,
    registry: &BindingsRegistry,
    emit_options: &EmitOptions,
) -> IndexMap<String, String> {
    let mut files = IndexMap::new();
    for module in &program.modules {
        debug!(module = %module.source_path, "emitting module");
        let text = emit_module(module, options, registry, emit_options);
        files.insert(module.output_path.clone(), text);
    }
    files
}

pub fn emit_module(
    module: &IrModule,
    options: &CompilerOptions,
    registry: &BindingsRegistry,
    emit_options: &EmitOptions,
) -> String {
    let mut ctx = EmitterContext::for_module(module, options, registry);

    // The body is emitted first so the using set is complete before the
    // header is assembled.
    let mut body = SourceWriter::new();
    body.increase_indent();

    let mut container_members: Vec<&IrStatement> = Vec::new();
    let mut top_level: Vec<&IrStatement> = Vec::new();
    let mut generator_functions = Vec::new();
    let mut first_type = true;

    for statement in &module.body {
        match statement {
            IrStatement::InterfaceDeclaration(iface) => {
                separator(&mut first_type, &mut body);
                emit_interface(iface, &mut ctx, &mut body);
            }
            IrStatement::ClassDeclaration(class) => {
                separator(&mut first_type, &mut body);
                emit_class(class, &mut ctx, &mut body);
            }
            IrStatement::EnumDeclaration(decl) => {
                separator(&mut first_type, &mut body);
                emit_enum(decl, &mut ctx, &mut body);
            }
            IrStatement::TypeAliasDeclaration(alias) => {
                // Only object-type aliases materialize as declarations.
                if matches!(alias.ty, IrType::Object { .. }) {
                    separator(&mut first_type, &mut body);
                }
                emit_type_alias(alias, &mut ctx, &mut body);
            }
            IrStatement::FunctionDeclaration(func) => {
                if func.is_generator {
                    generator_functions.push(func);
                }
                container_members.push(statement);
            }
            IrStatement::VariableDeclaration(_) => container_members.push(statement),
            IrStatement::Empty => {}
            other => top_level.push(other),
        }
    }

    if !container_members.is_empty() || !top_level.is_empty() {
        separator(&mut first_type, &mut body);
        body.write_line(&format!("public static class {}", module.container_name));
        body.open_brace();
        let mut first_member = true;
        for statement in &container_members {
            if !first_member {
                body.blank_line();
            }
            first_member = false;
            match statement {
                IrStatement::FunctionDeclaration(func) => {
                    emit_function_as_method(func, &mut ctx, &mut body);
                }
                IrStatement::VariableDeclaration(decl) => {
                    emit_container_field(decl, &mut ctx, &mut body);
                }
                _ => unreachable!("container members are functions and fields"),
            }
        }
        if !top_level.is_empty() {
            if !first_member {
                body.blank_line();
            }
            body.write_line("public static void __TopLevel()");
            body.open_brace();
            for statement in &top_level {
                emit_statement(statement, &mut ctx, &mut body);
            }
            body.close_brace();
        }
        body.close_brace();
    }

    // Generator wrappers live beside the container.
    for func in generator_functions {
        separator(&mut first_type, &mut body);
        crate::generators::emit_generator_wrapper(func, &mut ctx, &mut body);
    }

    // Assemble the file: header, usings, namespace, body.
    let mut out = SourceWriter::new();
    out.write_line("// <auto-generated>");
    out.write_line(&format!(
        "//     Generated by the Tsonic compiler from {}.",
        module.source_path
    ));
    out.write_line(&format!("//     Generated: {}", emit_options.timestamp));
    out.write_line("// </auto-generated>");
    out.blank_line();

    let usings = ctx.sorted_usings();
    if !usings.is_empty() {
        for using in usings {
            out.write_line(&format!("using {using};"));
        }
        out.blank_line();
    }

    out.write_line(&format!("namespace {}", module.namespace));
    out.write_line("{");
    let body_text = body.finish();
    for line in body_text.lines() {
        if line.is_empty() {
            out.newline();
        } else {
            out.write_line(line);
        }
    }
    out.write_line("}");
    out.finish()
}

fn separator(first: &mut bool, writer: &mut SourceWriter) {
    if !*first {
        writer.blank_line();
    }
    *first = false;
}
