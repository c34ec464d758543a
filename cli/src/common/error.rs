//! Error handling utilities for the CLI.

use jsonata_sandbox::{Error, RenderConfig, render_error_to};

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub enum CliError {
    /// Reported by the sandbox.
    Sandbox(Error),
    /// Unusable command-line input (unreadable file, invalid JSON).
    Input(String),
}

impl From<Error> for CliError {
    fn from(error: Error) -> Self {
        CliError::Sandbox(error)
    }
}

/// Render an error to stderr and exit with code 1.
pub fn render_and_exit(error: CliError, no_color: bool) -> ! {
    match error {
        CliError::Sandbox(error) => {
            let config = RenderConfig {
                color: !no_color,
                ..Default::default()
            };
            render_error_to(&error, &mut std::io::stderr(), &config).ok();
        }
        CliError::Input(message) => eprintln!("error: {message}"),
    }
    std::process::exit(1);
}
