//! Public error types.
//!
//! Every public operation fails with exactly one [`Error`]; raw QuickJS
//! errors never cross the API boundary. Time and recursion aborts are not
//! separate variants: they are [`Error::Evaluation`] values whose message
//! contains one of the fixed texts below, so callers can match on the
//! message regardless of which mechanism stopped the evaluation.

use crate::value::HostValue;
use core::fmt;
use serde_json::Value as Json;

/// Message of an evaluation stopped by its deadline.
pub const TIMEOUT_MESSAGE: &str = "Expression evaluation timeout: Check for infinite loop";

/// Message of an evaluation stopped by its depth cap or by native stack
/// exhaustion.
pub const STACK_OVERFLOW_MESSAGE: &str = "Stack overflow error: Check for non-terminating recursive function. Consider rewriting as tail-recursive.";

/// Public error type for all sandbox operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid API usage (e.g., a non-positive limit, a namespace from another engine).
    #[error("API error: {0}")]
    Api(String),

    /// The engine source could not be read.
    #[error("Failed to load engine source: {message}")]
    EngineLoad {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The engine source threw while bootstrapping, or did not define `jsonata`.
    #[error("Engine bootstrap failed: {0}")]
    EngineBootstrap(#[source] ClassifiedError),

    /// The expression was rejected by the engine's parser.
    #[error("{error}")]
    Syntax {
        error: ClassifiedError,
        /// The expression text that failed to compile.
        expression: String,
    },

    /// Binding or evaluation failed, including guard aborts and values that
    /// cannot cross the boundary.
    #[error("{0}")]
    Evaluation(ClassifiedError),
}

impl Error {
    /// The classified failure behind this error, if the runtime produced one.
    pub fn classified(&self) -> Option<&ClassifiedError> {
        match self {
            Error::EngineBootstrap(e) | Error::Evaluation(e) => Some(e),
            Error::Syntax { error, .. } => Some(error),
            Error::Api(_) | Error::EngineLoad { .. } => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.classified().is_some_and(ClassifiedError::is_timeout)
    }

    pub fn is_recursion_overflow(&self) -> bool {
        self.classified()
            .is_some_and(ClassifiedError::is_recursion_overflow)
    }
}

/// A normalized failure derived from an arbitrary thrown runtime value.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedError {
    message: String,
    payload: Option<HostValue>,
    diagnostic: String,
}

impl ClassifiedError {
    pub(crate) fn new(
        message: impl Into<String>,
        payload: Option<HostValue>,
        diagnostic: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            payload,
            diagnostic: diagnostic.into(),
        }
    }

    /// A failure that did not originate from a thrown value.
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(message.clone(), None, message)
    }

    /// Best-effort human readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The thrown value, when it was a string or had a JSON form.
    pub fn payload(&self) -> Option<&HostValue> {
        self.payload.as_ref()
    }

    /// Text of the underlying low-level failure (may include a JS stack).
    pub fn diagnostic(&self) -> &str {
        &self.diagnostic
    }

    /// JSONata error code from the payload (e.g. `"S0201"`), if any.
    pub fn code(&self) -> Option<&str> {
        self.payload.as_ref()?.get("code")?.as_str()
    }

    /// Character offset reported by the engine, if any.
    pub fn position(&self) -> Option<usize> {
        match self.payload.as_ref()?.get("position")? {
            Json::Number(n) => n.as_u64().map(|p| p as usize),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.message.contains("timeout")
    }

    pub fn is_recursion_overflow(&self) -> bool {
        self.message.contains("Stack overflow")
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl core::error::Error for ClassifiedError {}
