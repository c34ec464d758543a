//! Turns whatever the runtime threw into a [`ClassifiedError`].
//!
//! Classification is split in two: [`trap`] looks at the QuickJS value and
//! reduces it to a [`Thrown`] shape, and [`classify`] maps that shape to a
//! message and payload without touching the runtime.

use crate::api::error::{ClassifiedError, STACK_OVERFLOW_MESSAGE, TIMEOUT_MESSAGE};
use crate::codec::{CodecError, JsonCodec};
use crate::marshal::stringify_strict;
use crate::value::HostValue;
use rquickjs::{Ctx, Value};
use serde_json::Value as Json;

/// A low-level failure raised while talking to the runtime.
#[derive(Debug, thiserror::Error)]
pub(crate) enum Fault {
    #[error(transparent)]
    Js(#[from] rquickjs::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("cannot marshal {0} value: it has no JSON representation")]
    Unrepresentable(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AbortKind {
    Timeout,
    RecursionOverflow,
}

/// The shape of a trapped failure, in classification order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Thrown {
    /// The execution guard stopped the call, or the native stack ran out.
    Aborted(AbortKind),
    /// A failure with no thrown value behind it.
    Absent,
    /// A thrown primitive string.
    Text(String),
    /// An instance of the built-in `Error`, summarized as `name: message`.
    NativeError(String),
    /// Anything else, as strict JSON text. `None` when it had no JSON form.
    Structured(Option<String>),
}

pub(crate) fn classify(thrown: Thrown, diagnostic: String, codec: &dyn JsonCodec) -> ClassifiedError {
    match thrown {
        Thrown::Aborted(AbortKind::Timeout) => {
            ClassifiedError::new(TIMEOUT_MESSAGE, None, diagnostic)
        }
        Thrown::Aborted(AbortKind::RecursionOverflow) => {
            ClassifiedError::new(STACK_OVERFLOW_MESSAGE, None, diagnostic)
        }
        Thrown::Absent => ClassifiedError::new(diagnostic.clone(), None, diagnostic),
        Thrown::Text(text) => {
            ClassifiedError::new(text.clone(), Some(HostValue::from(text)), diagnostic)
        }
        Thrown::NativeError(summary) => ClassifiedError::new(summary, None, diagnostic),
        Thrown::Structured(Some(text)) => match codec.parse(&text) {
            Ok(payload) => {
                let message = match payload.get("message") {
                    Some(Json::String(message)) => message.clone(),
                    Some(other) => other.to_string(),
                    None => text,
                };
                ClassifiedError::new(message, Some(payload), diagnostic)
            }
            Err(_) => ClassifiedError::new("undefined", None, diagnostic),
        },
        Thrown::Structured(None) => ClassifiedError::new("undefined", None, diagnostic),
    }
}

/// Classifies `fault`, draining the runtime's pending exception if any.
///
/// `tripped` reports whether the execution guard aborted the call; an abort
/// wins over whatever the runtime reports.
pub(crate) fn trap<'js>(
    ctx: &Ctx<'js>,
    fault: Fault,
    tripped: bool,
    codec: &dyn JsonCodec,
) -> ClassifiedError {
    let (thrown, diagnostic) = match fault {
        Fault::Js(rquickjs::Error::Exception) => {
            let value = ctx.catch();
            if tripped {
                (Thrown::Aborted(AbortKind::Timeout), summarize(&value))
            } else {
                shape_of(ctx, value)
            }
        }
        other if tripped => (Thrown::Aborted(AbortKind::Timeout), other.to_string()),
        other => (Thrown::Absent, other.to_string()),
    };
    classify(thrown, diagnostic, codec)
}

fn shape_of<'js>(ctx: &Ctx<'js>, value: Value<'js>) -> (Thrown, String) {
    if value.is_undefined() {
        return (Thrown::Structured(None), "undefined".to_string());
    }
    if let Some(text) = value.as_string() {
        let text = text.to_string().unwrap_or_default();
        return (Thrown::Text(text.clone()), text);
    }
    if let Some(exception) = value.as_exception() {
        let name = exception.get::<_, String>("name").unwrap_or_default();
        let message = exception.message().unwrap_or_default();
        let summary = summarize(&value);
        let diagnostic = match exception.stack() {
            Some(stack) if !stack.trim().is_empty() => format!("{summary}\n{stack}"),
            _ => summary.clone(),
        };
        if is_native_stack_overflow(&name, &message) {
            return (Thrown::Aborted(AbortKind::RecursionOverflow), diagnostic);
        }
        return (Thrown::NativeError(summary), diagnostic);
    }
    match stringify_strict(ctx, value) {
        Ok(Some(text)) => (Thrown::Structured(Some(text.clone())), text),
        Ok(None) => (Thrown::Structured(None), "undefined".to_string()),
        Err(err) => {
            let diagnostic = match err {
                rquickjs::Error::Exception => summarize(&ctx.catch()),
                other => other.to_string(),
            };
            (Thrown::Structured(None), diagnostic)
        }
    }
}

/// `name: message` for error objects, a best-effort string otherwise.
fn summarize(value: &Value<'_>) -> String {
    if let Some(exception) = value.as_exception() {
        let name = exception
            .get::<_, String>("name")
            .unwrap_or_else(|_| "Error".to_string());
        return match exception.message() {
            Some(message) if !message.is_empty() => format!("{name}: {message}"),
            _ => name,
        };
    }
    if let Some(text) = value.as_string() {
        return text.to_string().unwrap_or_default();
    }
    value.type_name().to_string()
}

/// QuickJS reports native stack exhaustion as an ordinary error object.
pub(crate) fn is_native_stack_overflow(name: &str, message: &str) -> bool {
    match name {
        "InternalError" => message.contains("stack overflow"),
        "RangeError" => message.contains("call stack size exceeded"),
        _ => false,
    }
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod classify_test;
