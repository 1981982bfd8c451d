//! Generator emission.
//!
//! A generator function emits three pieces: the public method returning a
//! wrapper object, a private iterator-body method containing the lowered
//! statements, and the wrapper class itself with `next()` / `return()` /
//! `throw()` returning `IteratorResult<T>`. Bidirectional generators (a
//! non-undefined `TNext`) add an exchange cell shared between the wrapper
//! and the body.

use crate::context::EmitterContext;
use crate::declarations::{emit_params, visibility_keyword};
use crate::expressions::escape_identifier;
use crate::types::emit_type;
use crate::writer::SourceWriter;
use tsonic_common::NameBucket;
use tsonic_ir::IrFunctionDeclaration;
use tsonic_types::IrType;

/// Element / return / next types of a generator signature.
struct GeneratorShape {
    element: String,
    next: Option<String>,
}

fn generator_shape(func: &IrFunctionDeclaration, ctx: &mut EmitterContext<'_>) -> GeneratorShape {
    let (element, next) = match func.return_type.as_ref() {
        Some(IrType::Reference {
            name,
            type_arguments,
            ..
        }) if matches!(name.as_str(), "Iterator" | "Iterable" | "Generator" | "AsyncGenerator") => {
            let element = type_arguments
                .first()
                .map_or_else(|| "object".to_string(), |t| emit_type(t, ctx));
            let next = type_arguments.get(2).and_then(|t| {
                if t.is_void_like() {
                    None
                } else {
                    Some(emit_type(t, ctx))
                }
            });
            (element, next)
        }
        _ => ("object".to_string(), None),
    };
    GeneratorShape { element, next }
}

pub(crate) fn emit_generator_function(
    func: &IrFunctionDeclaration,
    ctx: &mut EmitterContext<'_>,
    writer: &mut SourceWriter,
) {
    ctx.add_using("Tsonic.Runtime");
    ctx.add_using("System.Collections.Generic");

    let shape = generator_shape(func, ctx);
    let method_name = ctx.policy().apply(NameBucket::Methods, &func.name);
    let wrapper_name = format!("__{}_Generator", func.name);
    let body_name = format!("__{}_body", func.name);
    let params = emit_params(&func.params, ctx);
    let arg_names = func
        .params
        .iter()
        .map(|p| escape_identifier(&p.name))
        .collect::<Vec<_>>()
        .join(", ");
    let element = &shape.element;

    // Public method: builds the wrapper around the iterator body.
    writer.write_line(&format!(
        "{} static {wrapper_name} {}({params})",
        visibility_keyword(func.exported),
        escape_identifier(&method_name)
    ));
    writer.open_brace();
    writer.write_line(&format!("return new {wrapper_name}({body_name}({arg_names}));"));
    writer.close_brace();
    writer.blank_line();

    // Private body: a C# iterator method with the lowered statements.
    if func.is_async {
        writer.write_line(&format!(
            "private static async IAsyncEnumerable<{element}> {body_name}({params})"
        ));
    } else {
        writer.write_line(&format!(
            "private static IEnumerator<{element}> {body_name}({params})"
        ));
    }
    crate::declarations::emit_body_block(&func.body, ctx, writer);
}

/// The wrapper class for a generator function. Emitted at namespace level,
/// alongside the container.
pub(crate) fn emit_generator_wrapper(
    func: &IrFunctionDeclaration,
    ctx: &mut EmitterContext<'_>,
    writer: &mut SourceWriter,
) {
    let shape = generator_shape(func, ctx);
    let wrapper_name = format!("__{}_Generator", func.name);
    let element = &shape.element;
    let visibility = visibility_keyword(func.exported);

    if func.is_async {
        emit_async_wrapper(func, &shape, ctx, writer);
        return;
    }

    writer.write_line(&format!("{visibility} sealed class {wrapper_name}"));
    writer.open_brace();
    writer.write_line(&format!(
        "private readonly IEnumerator<{element}> _inner;"
    ));
    writer.write_line("private bool _done;");
    if let Some(next_ty) = &shape.next {
        writer.write_line(&format!("private readonly __{}_Exchange _exchange = new __{}_Exchange();", func.name, func.name));
        let _ = next_ty;
    }
    writer.blank_line();
    writer.write_line(&format!(
        "public {wrapper_name}(IEnumerator<{element}> inner)"
    ));
    writer.open_brace();
    writer.write_line("_inner = inner;");
    writer.close_brace();
    writer.blank_line();

    // next(): advance the enumerator.
    match &shape.next {
        Some(next_ty) => {
            writer.write_line(&format!(
                "public IteratorResult<{element}> next({next_ty} value)"
            ));
            writer.open_brace();
            writer.write_line("_exchange.Value = value;");
            emit_next_body(element, writer);
            writer.close_brace();
        }
        None => {
            writer.write_line(&format!("public IteratorResult<{element}> next()"));
            writer.open_brace();
            emit_next_body(element, writer);
            writer.close_brace();
        }
    }
    writer.blank_line();

    writer.write_line(&format!(
        "public IteratorResult<{element}> @return({element} value)"
    ));
    writer.open_brace();
    writer.write_line("_done = true;");
    writer.write_line("_inner.Dispose();");
    writer.write_line(&format!(
        "return new IteratorResult<{element}> {{ Value = value, Done = true }};"
    ));
    writer.close_brace();
    writer.blank_line();

    writer.write_line(&format!(
        "public IteratorResult<{element}> @throw(global::System.Exception error)"
    ));
    writer.open_brace();
    writer.write_line("_done = true;");
    writer.write_line("_inner.Dispose();");
    writer.write_line("throw error;");
    writer.close_brace();

    writer.close_brace();

    if shape.next.is_some() {
        writer.blank_line();
        emit_exchange_class(func, &shape, writer);
    }
}

fn emit_next_body(element: &str, writer: &mut SourceWriter) {
    writer.write_line("if (!_done && _inner.MoveNext())");
    writer.open_brace();
    writer.write_line(&format!(
        "return new IteratorResult<{element}> {{ Value = _inner.Current, Done = false }};"
    ));
    writer.close_brace();
    writer.write_line("_done = true;");
    writer.write_line(&format!(
        "return new IteratorResult<{element}> {{ Done = true }};"
    ));
}

/// Async generators mirror the sync wrapper over `IAsyncEnumerator` with
/// `Task<IteratorResult<T>>` members.
fn emit_async_wrapper(
    func: &IrFunctionDeclaration,
    shape: &GeneratorShape,
    ctx: &mut EmitterContext<'_>,
    writer: &mut SourceWriter,
) {
    ctx.add_using("System.Threading.Tasks");
    let wrapper_name = format!("__{}_Generator", func.name);
    let element = &shape.element;
    let visibility = visibility_keyword(func.exported);

    writer.write_line(&format!("{visibility} sealed class {wrapper_name}"));
    writer.open_brace();
    writer.write_line(&format!(
        "private readonly IAsyncEnumerator<{element}> _inner;"
    ));
    writer.write_line("private bool _done;");
    writer.blank_line();
    writer.write_line(&format!(
        "public {wrapper_name}(IAsyncEnumerable<{element}> source)"
    ));
    writer.open_brace();
    writer.write_line("_inner = source.GetAsyncEnumerator();");
    writer.close_brace();
    writer.blank_line();

    writer.write_line(&format!(
        "public async Task<IteratorResult<{element}>> next()"
    ));
    writer.open_brace();
    writer.write_line("if (!_done && await _inner.MoveNextAsync())");
    writer.open_brace();
    writer.write_line(&format!(
        "return new IteratorResult<{element}> {{ Value = _inner.Current, Done = false }};"
    ));
    writer.close_brace();
    writer.write_line("_done = true;");
    writer.write_line(&format!(
        "return new IteratorResult<{element}> {{ Done = true }};"
    ));
    writer.close_brace();
    writer.blank_line();

    writer.write_line(&format!(
        "public async Task<IteratorResult<{element}>> @return({element} value)"
    ));
    writer.open_brace();
    writer.write_line("_done = true;");
    writer.write_line("await _inner.DisposeAsync();");
    writer.write_line(&format!(
        "return new IteratorResult<{element}> {{ Value = value, Done = true }};"
    ));
    writer.close_brace();
    writer.blank_line();

    writer.write_line(&format!(
        "public async Task<IteratorResult<{element}>> @throw(global::System.Exception error)"
    ));
    writer.open_brace();
    writer.write_line("_done = true;");
    writer.write_line("await _inner.DisposeAsync();");
    writer.write_line("throw error;");
    writer.close_brace();

    writer.close_brace();
}

/// The exchange cell carrying bidirectional values into the body.
fn emit_exchange_class(
    func: &IrFunctionDeclaration,
    shape: &GeneratorShape,
    writer: &mut SourceWriter,
) {
    let Some(next_ty) = &shape.next else { return };
    writer.write_line(&format!(
        "{} sealed class __{}_Exchange",
        visibility_keyword(func.exported),
        func.name
    ));
    writer.open_brace();
    writer.write_line(&format!("public {next_ty} Value;"));
    writer.close_brace();
}
