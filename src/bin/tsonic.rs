//! The `tsonic` CLI.
//!
//! A thin local surface over the core pipeline: `generate` compiles a
//! project to C#, `check` runs the pipeline for diagnostics only. Package
//! management and .NET SDK invocation live in the outer toolchain.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tsonic::common::{Diagnostic, Severity};
use tsonic::compile;
use tsonic::config::{discover_inputs, load_project};

#[derive(Parser)]
#[command(name = "tsonic", version, about = "TypeScript-subset to C# compiler")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile the project and write C# sources.
    Generate {
        /// Project directory (defaults to the current directory).
        #[arg(long, default_value = ".")]
        project: PathBuf,
        /// Explicit config file path.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Suppress non-diagnostic output.
        #[arg(long)]
        quiet: bool,
    },
    /// Run the pipeline for diagnostics without writing output.
    Check {
        #[arg(long, default_value = ".")]
        project: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(success) => {
            if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Command::Generate {
            project,
            config,
            quiet,
        } => {
            let resolved = load_project(&project, config.as_deref())?;
            let inputs = discover_inputs(&resolved.options.source_root);
            let output = compile(&resolved.options, &inputs, &resolved.bindings)?;
            print_diagnostics(&output.diagnostics);
            if !output.succeeded() {
                return Ok(false);
            }
            for (relative, text) in &output.files {
                let target = resolved.out_dir.join(relative);
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("creating {}", parent.display()))?;
                }
                std::fs::write(&target, text)
                    .with_context(|| format!("writing {}", target.display()))?;
                if !quiet {
                    println!("  {} {}", "emit".green(), target.display());
                }
            }
            if !quiet {
                println!(
                    "{} {} file(s) generated",
                    "done:".green().bold(),
                    output.files.len()
                );
            }
            Ok(true)
        }
        Command::Check { project, config } => {
            let resolved = load_project(&project, config.as_deref())?;
            let inputs = discover_inputs(&resolved.options.source_root);
            let output = compile(&resolved.options, &inputs, &resolved.bindings)?;
            print_diagnostics(&output.diagnostics);
            Ok(output.succeeded())
        }
    }
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let code = match diagnostic.severity {
            Severity::Error => diagnostic.code.red().bold(),
            Severity::Warning => diagnostic.code.yellow().bold(),
            Severity::Info => diagnostic.code.cyan(),
        };
        match &diagnostic.location {
            Some(location) => {
                eprintln!("{location} {code}: {}", diagnostic.message);
            }
            None => eprintln!("{code}: {}", diagnostic.message),
        }
        if let Some(hint) = &diagnostic.hint {
            eprintln!("  {} {hint}", "hint:".dimmed());
        }
    }
}
