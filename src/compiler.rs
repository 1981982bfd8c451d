//! The compilation pipeline.
//!
//! `compile` is the core's entire input/output contract: compiler options
//! and input files (plus pre-resolved external bindings) in, a map from
//! relative output path to C# text plus diagnostics out. File I/O happens
//! only at this boundary.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use std::path::PathBuf;
use tracing::debug;
use tsonic_binder::{BinderState, FileBinding};
use tsonic_common::diagnostics::has_errors;
use tsonic_common::{CompilerOptions, Diagnostic, LineMap};
use tsonic_emitter::{EmitOptions, emit_program};
use tsonic_ir::{build_module_graph, build_program};
use tsonic_parser::ast::SourceFile;
use tsonic_parser::parse_source_file;
use tsonic_passes::{PassContext, run_validation_passes};
use tsonic_types::BindingsRegistry;

/// Output contract of a compilation.
#[derive(Debug)]
pub struct CompileOutput {
    /// Relative output path -> emitted C# source text. Empty when the
    /// compilation failed.
    pub files: IndexMap<String, String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    pub fn succeeded(&self) -> bool {
        !has_errors(&self.diagnostics)
    }
}

/// Compile input files from disk.
pub fn compile(
    options: &CompilerOptions,
    input_files: &[PathBuf],
    bindings: &BindingsRegistry,
) -> Result<CompileOutput> {
    let mut sources = Vec::with_capacity(input_files.len());
    for path in input_files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        sources.push((path.to_string_lossy().replace('\\', "/"), text));
    }
    let emit_options = EmitOptions::default();
    Ok(compile_sources(options, &sources, bindings, &emit_options))
}

/// Compile in-memory sources. Deterministic: the output is a function of
/// the source bytes, the options, and the bindings.
pub fn compile_sources(
    options: &CompilerOptions,
    sources: &[(String, String)],
    bindings: &BindingsRegistry,
    emit_options: &EmitOptions,
) -> CompileOutput {
    let mut diagnostics = Vec::new();

    // Front end. Files with parse errors surface their diagnostics and are
    // skipped by every later stage.
    let mut files: Vec<SourceFile> = Vec::with_capacity(sources.len());
    for (path, text) in sources {
        debug!(file = %path, "parsing");
        let mut parsed = parse_source_file(path, text);
        let failed = parsed.has_errors();
        diagnostics.append(&mut parsed.diagnostics);
        if !failed {
            files.push(parsed.file);
        }
    }

    // Binding.
    let mut binder = BinderState::new();
    let file_bindings: Vec<FileBinding> = files.iter().map(|f| binder.bind_file(f)).collect();

    // Module graph (namespaces, imports, cycle detection).
    let (graph, mut graph_diagnostics) =
        build_module_graph(&files, &file_bindings, options, bindings);
    diagnostics.append(&mut graph_diagnostics);

    // IR construction.
    let mut build = build_program(&files, &file_bindings, &graph, options, bindings);
    diagnostics.append(&mut build.diagnostics);

    // Validation passes.
    let mut line_maps = FxHashMap::default();
    for file in &files {
        line_maps.insert(file.path.clone(), LineMap::build(&file.source));
    }
    let ctx = PassContext {
        catalog: &build.catalog,
        options,
        line_maps: &line_maps,
    };
    let (program, mut pass_diagnostics) = run_validation_passes(build.program, &ctx);
    diagnostics.append(&mut pass_diagnostics);

    // The backend never runs over an invalidated IR.
    if has_errors(&diagnostics) {
        return CompileOutput {
            files: IndexMap::new(),
            diagnostics,
        };
    }

    let files = emit_program(&program, options, bindings, emit_options);
    CompileOutput { files, diagnostics }
}
