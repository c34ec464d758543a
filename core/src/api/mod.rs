//! Public API for hosting JSONata.
//!
//! An [`Engine`] loads the JSONata engine source once. Expressions are
//! compiled from it with [`Engine::parse`] and evaluated any number of times
//! with [`CompiledExpression::evaluate`]:
//!
//! 1. **Engine**: one QuickJS runtime with the engine source bootstrapped.
//! 2. **Namespace**: the global scope an expression lives in, private by
//!    default, or a [`SharedNamespace`] several expressions opt into.
//! 3. **Expression**: compiled source plus its persistent bindings.
//!
//! Every evaluation can be bounded by a wall-clock deadline and a maximum
//! depth (see [`EvaluationOptions`]).
//!
//! # Example
//!
//! ```no_run
//! use jsonata_sandbox_core::api::{Bindings, Engine, EngineOptions, EvaluationOptions};
//! use jsonata_sandbox_core::value::HostValue;
//! use serde_json::json;
//!
//! let engine = Engine::new(EngineOptions::default())?;
//! let expr = engine.parse("greeting & \", \" & $name", &EvaluationOptions::default())?;
//!
//! let bindings = Bindings::new().with("name", json!("world"));
//! let result = expr.evaluate(&HostValue::from(json!({"greeting": "hello"})), &bindings)?;
//! assert_eq!(result, HostValue::from("hello, world"));
//! # Ok::<(), jsonata_sandbox_core::api::Error>(())
//! ```

pub mod bindings;
pub mod engine;
pub mod error;
pub mod expression;
pub mod namespace;
pub mod options;

pub use bindings::{BindingValue, Bindings, ForeignValue};
pub use engine::Engine;
pub use error::{ClassifiedError, Error, STACK_OVERFLOW_MESSAGE, TIMEOUT_MESSAGE};
pub use expression::CompiledExpression;
pub use namespace::SharedNamespace;
pub use options::{
    BUNDLED_ENGINE_AVAILABLE, ENGINE_PATH_ENV, EngineOptions, EngineSource, EvaluationOptions,
    EvaluationOptionsOverride,
};
