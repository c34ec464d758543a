//! jsonata-sandbox CLI library.
//!
//! The public modules are primarily exposed for testing purposes.

pub mod cli;
pub mod commands;
pub mod common;
