//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use expect_test::Expect;
use std::io::Write;

/// The fixture JSONata engine shipped with the core crate's tests.
pub const FIXTURE_ENGINE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../core/tests/fixtures/jsonata-lite.js"
);

/// Create a new command for the binary, without an engine selected.
pub fn bare() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_jsonata-sandbox"));
    cmd.env_remove("JSONATA_SANDBOX_ENGINE").env_remove("RUST_LOG");
    cmd
}

/// Create a new `eval` command running the fixture engine.
pub fn eval(expression: &str) -> Command {
    let mut cmd = bare();
    cmd.args(["--no-color", "eval", expression, "--engine", FIXTURE_ENGINE]);
    cmd
}

/// Create a temporary file with the given content.
pub fn temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

/// Run a command and check that stdout matches the expected output.
pub fn check_stdout(mut cmd: Command, expected: Expect) {
    let output = cmd.output().expect("failed to execute command");
    let stdout = String::from_utf8_lossy(&output.stdout);
    expected.assert_eq(&stdout);
}

/// Run a command and check that stderr matches the expected output.
pub fn check_stderr(mut cmd: Command, expected: Expect) {
    let output = cmd.output().expect("failed to execute command");
    let stderr = String::from_utf8_lossy(&output.stderr);
    expected.assert_eq(&stderr);
}
