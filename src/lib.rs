//! jsonata-sandbox - Run untrusted JSONata expressions from Rust
//!
//! # Overview
//!
//! JSONata is a query and transformation language for JSON. This crate embeds
//! the reference JavaScript implementation in QuickJS and puts a sandbox
//! around it:
//!
//! - Every expression lives in its own namespace unless it opts into sharing
//! - Evaluations can be bounded by a wall-clock deadline and a maximum depth
//! - Values cross the boundary as JSON, keeping `null` apart from "no value"
//! - Whatever the engine throws comes back as a predictable [`Error`]
//!
//! # Quick Start
//!
//! ```no_run
//! use jsonata_sandbox::{Bindings, Engine, EngineOptions, EvaluationOptions, HostValue};
//! use jsonata_sandbox::serde_json::json;
//! use std::time::Duration;
//!
//! // Load the engine once
//! let engine = Engine::new(EngineOptions::default()).unwrap();
//!
//! // Compile with a one second budget per evaluation
//! let options = EvaluationOptions::default()
//!     .with_deadline(Duration::from_secs(1))
//!     .unwrap();
//! let expr = engine.parse("$sum(items.(price * qty))", &options).unwrap();
//!
//! // Evaluate against a document
//! let input = HostValue::from(json!({"items": [{"price": 2, "qty": 3}]}));
//! let result = expr.evaluate(&input, &Bindings::new()).unwrap();
//! assert_eq!(result, HostValue::from(json!(6)));
//! ```
//!
//! # Host functions
//!
//! JavaScript functions can be registered under a JSONata name, optionally
//! with a signature that the engine checks on every call:
//!
//! ```no_run
//! use jsonata_sandbox::{Bindings, Engine, EngineOptions, EvaluationOptions, HostValue};
//!
//! let engine = Engine::new(EngineOptions::default()).unwrap();
//! let expr = engine.parse("$clamp(150)", &EvaluationOptions::default()).unwrap();
//! expr.register_function("clamp", "n => Math.min(n, 100)", Some("<n:n>")).unwrap();
//!
//! let result = expr.evaluate(&HostValue::Missing, &Bindings::new()).unwrap();
//! assert_eq!(result, HostValue::from(100_i64));
//! ```

// Error rendering utilities
pub mod error_renderer;
pub use error_renderer::{CharSet, RenderConfig, render_error, render_error_to};

// Re-export public API from jsonata_sandbox_core
pub use jsonata_sandbox_core::api::{
    BUNDLED_ENGINE_AVAILABLE, BindingValue, Bindings, ClassifiedError, CompiledExpression,
    ENGINE_PATH_ENV, Engine, EngineOptions, EngineSource, Error, EvaluationOptions,
    EvaluationOptionsOverride, ForeignValue, STACK_OVERFLOW_MESSAGE, SharedNamespace,
    TIMEOUT_MESSAGE,
};
pub use jsonata_sandbox_core::codec::{CodecError, JsonCodec, SerdeJsonCodec};
pub use jsonata_sandbox_core::value::HostValue;
pub use jsonata_sandbox_core::serde_json;
