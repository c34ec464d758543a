//! The `eval` command - evaluate an expression.

use std::path::PathBuf;
use std::time::Duration;

use jsonata_sandbox::{
    BindingValue, Bindings, Engine, EngineOptions, EngineSource, EvaluationOptions, HostValue,
};

use crate::cli::EvalArgs;
use crate::common::input::{parse_document, read_input};
use crate::common::{CliError, CliResult};

/// Run the eval command.
pub fn run(args: EvalArgs) -> CliResult<()> {
    let input = read_document(args.input.as_deref(), args.input_file.as_deref())?;
    let bindings = build_bindings(&args.bindings, &args.js_bindings)?;

    let engine = Engine::new(engine_options(args.engine))?;

    let mut options = EvaluationOptions::default();
    if let Some(millis) = args.timeout_ms {
        options = options.with_deadline(Duration::from_millis(millis))?;
    }
    if let Some(max_depth) = args.max_depth {
        options = options.with_max_depth(max_depth)?;
    }

    tracing::debug!(expression = %args.expression, "Evaluating");
    let expr = engine.parse(&args.expression, &options)?;
    let result = expr.evaluate(&input, &bindings)?;

    // No output at all for an expression without a result.
    if let Some(json) = result.into_json() {
        println!("{}", json);
    }
    Ok(())
}

fn engine_options(engine: Option<PathBuf>) -> EngineOptions {
    match engine {
        Some(path) => EngineOptions::default().with_source(EngineSource::File(path)),
        None => EngineOptions::default(),
    }
}

fn read_document(input: Option<&str>, input_file: Option<&str>) -> CliResult<HostValue> {
    match (input, input_file) {
        (Some(text), _) => parse_document(text, "--input"),
        (None, Some(path)) => {
            let (content, name) = read_input(path).map_err(CliError::Input)?;
            parse_document(&content, &name)
        }
        (None, None) => Ok(HostValue::Missing),
    }
}

fn build_bindings(
    values: &[(String, String)],
    sources: &[(String, String)],
) -> CliResult<Bindings> {
    // Both flags feed one binding list, so a name in each would silently
    // depend on which flag is applied last.
    if let Some((name, _)) = sources
        .iter()
        .find(|(name, _)| values.iter().any(|(other, _)| other == name))
    {
        return Err(CliError::Input(format!(
            "`{name}` is bound by both --bind and --bind-js"
        )));
    }

    let mut bindings = Bindings::new();
    for (name, text) in values {
        let value = parse_document(text, &format!("--bind {name}"))?;
        bindings.insert(name.as_str(), value);
    }
    for (name, source) in sources {
        bindings.insert(name.as_str(), BindingValue::expression(source.as_str()));
    }
    Ok(bindings)
}
