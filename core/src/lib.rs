//! Sandboxed host for an embedded JSONata evaluator.
//!
//! The JSONata engine itself is an opaque JavaScript bundle executed inside
//! QuickJS. This crate owns everything around it: loading the bundle once,
//! compiling expressions into isolated namespaces, exchanging values with
//! the runtime, bounding evaluations in time and depth, and turning whatever
//! the runtime throws into a predictable [`api::Error`].

pub mod api;
pub mod codec;
pub mod value;

pub(crate) mod classify;
pub(crate) mod guard;
pub(crate) mod marshal;

pub use serde_json;
