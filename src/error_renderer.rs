//! Error rendering using ariadne
//!
//! Syntax errors that carry a source position are rendered as annotated
//! snippets of the expression. Everything else is rendered as a single
//! report line, with the JSONata error code when the engine supplied one.

use crate::{ClassifiedError, Error};
use ariadne::{Color, Label, Report, ReportKind, Source};
use std::io::Write;
use std::ops::Range;

/// Character set for rendering error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharSet {
    /// Use Unicode characters for rich visual output.
    #[default]
    Unicode,
    /// Use ASCII-only characters for compatibility.
    Ascii,
}

/// Configuration for error rendering.
#[derive(Debug, Clone)]
pub struct RenderConfig<'a> {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
    /// The filename to display in error messages.
    /// Defaults to "<unknown>" if not provided.
    pub filename: Option<&'a str>,
    /// The character set to use for rendering.
    pub charset: CharSet,
}

impl Default for RenderConfig<'_> {
    fn default() -> Self {
        Self {
            color: true,
            filename: None,
            charset: CharSet::Unicode,
        }
    }
}

/// Render an error to stderr using the default config.
///
/// # Example
/// ```no_run
/// use jsonata_sandbox::{Engine, EngineOptions, EvaluationOptions, render_error};
///
/// let engine = Engine::new(EngineOptions::default()).unwrap();
/// if let Err(e) = engine.parse("1 + ", &EvaluationOptions::default()) {
///     render_error(&e);
/// }
/// ```
pub fn render_error(error: &Error) {
    render_error_to(error, &mut std::io::stderr(), &RenderConfig::default()).ok();
}

/// Render an error to a writer with the given configuration.
pub fn render_error_to(
    error: &Error,
    writer: &mut dyn Write,
    config: &RenderConfig,
) -> std::io::Result<()> {
    let filename = config.filename.unwrap_or("<unknown>");

    match error {
        Error::Syntax { error, expression } => match error.position() {
            Some(position) => render_snippet(expression, error, position, writer, config, filename),
            None => render_line(error, writer),
        },
        Error::Evaluation(error) => render_line(error, writer),
        Error::EngineBootstrap(_) | Error::EngineLoad { .. } | Error::Api(_) => {
            writeln!(writer, "{}", error)
        }
    }
}

fn render_line(error: &ClassifiedError, writer: &mut dyn Write) -> std::io::Result<()> {
    match error.code() {
        Some(code) => writeln!(writer, "[{}] Error: {}", code, error.message()),
        None => writeln!(writer, "Error: {}", error.message()),
    }
}

fn render_snippet(
    expression: &str,
    error: &ClassifiedError,
    position: usize,
    writer: &mut dyn Write,
    config: &RenderConfig,
    filename: &str,
) -> std::io::Result<()> {
    let span = token_span(expression, error, position);

    let ariadne_charset = match config.charset {
        CharSet::Unicode => ariadne::CharSet::Unicode,
        CharSet::Ascii => ariadne::CharSet::Ascii,
    };
    let ariadne_config = ariadne::Config::default()
        .with_color(config.color)
        .with_char_set(ariadne_charset);

    let mut report = Report::build(ReportKind::Error, (filename, span.clone()))
        .with_message(error.message())
        .with_config(ariadne_config);
    if let Some(code) = error.code() {
        report = report.with_code(code);
    }
    report = report.with_label(
        Label::new((filename, span))
            .with_message(error.message())
            .with_color(Color::Red),
    );

    report
        .finish()
        .write((filename, Source::from(expression)), &mut *writer)
}

/// JSONata reports the offset just past the offending token.
fn token_span(expression: &str, error: &ClassifiedError, position: usize) -> Range<usize> {
    let end = position.min(expression.chars().count());
    let width = error
        .payload()
        .and_then(|payload| payload.get("token"))
        .and_then(|token| match token {
            crate::serde_json::Value::String(text) if text != "(end)" => Some(text.chars().count()),
            crate::serde_json::Value::Number(number) => Some(number.to_string().len()),
            _ => None,
        })
        .unwrap_or(0);
    end.saturating_sub(width)..end
}
