//! Command-line interface definitions.
//!
//! This module contains only clap struct definitions - no business logic.
//! All command implementations are in the `commands` module.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// jsonata-sandbox - Evaluate JSONata expressions in a sandbox
#[derive(Parser, Debug)]
#[command(name = "jsonata-sandbox", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate an expression against a JSON document
    Eval(EvalArgs),
}

/// Arguments for the `eval` command.
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// JSONata expression to evaluate
    pub expression: String,

    /// Input document as JSON text
    #[arg(long, conflicts_with = "input_file")]
    pub input: Option<String>,

    /// Read the input document from a file ("-" for stdin)
    #[arg(long, value_name = "PATH")]
    pub input_file: Option<String>,

    /// Bind $NAME to a JSON value
    #[arg(long = "bind", value_name = "NAME=JSON", value_parser = parse_assignment)]
    pub bindings: Vec<(String, String)>,

    /// Bind $NAME to the value of a JavaScript expression
    #[arg(long = "bind-js", value_name = "NAME=SOURCE", value_parser = parse_assignment)]
    pub js_bindings: Vec<(String, String)>,

    /// JSONata engine source [default: $JSONATA_SANDBOX_ENGINE or the bundled engine]
    #[arg(long, value_name = "PATH")]
    pub engine: Option<PathBuf>,

    /// Evaluation deadline in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum evaluation depth
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,
}

fn parse_assignment(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got `{arg}`")),
    }
}
