//! Input document utilities.

use super::{CliError, CliResult};
use jsonata_sandbox::HostValue;
use std::io::Read;

/// Read input from a file path or stdin if path is "-".
///
/// Returns the content and a display name for error messages.
pub fn read_input(path: &str) -> Result<(String, String), String> {
    if is_stdin(path) {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| format!("<stdin>: {}", e))?;
        Ok((content, "<stdin>".to_string()))
    } else {
        let content = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
        Ok((content, path.to_string()))
    }
}

/// Check if the path represents stdin.
pub fn is_stdin(path: &str) -> bool {
    path == "-"
}

/// Parse JSON text into an input document. `origin` names it in errors.
pub fn parse_document(text: &str, origin: &str) -> CliResult<HostValue> {
    serde_json::from_str(text)
        .map(HostValue::Json)
        .map_err(|e| CliError::Input(format!("invalid JSON in {}: {}", origin, e)))
}
