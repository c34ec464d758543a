//! Structured-data codecs used at the host/runtime boundary.
//!
//! Numbers and containers cross the boundary as JSON text: the host side
//! serializes with a [`JsonCodec`] and the runtime parses with its own
//! `JSON.parse` (and the reverse on the way out). Only the host half is
//! pluggable.

use crate::value::HostValue;
use core::fmt;

/// Parses and serializes host values as JSON text.
///
/// Implementations never see [`HostValue::Missing`] coming from the
/// marshaller, since `undefined` has no JSON spelling and is mapped
/// directly.
pub trait JsonCodec: fmt::Debug + Send + Sync {
    fn parse(&self, text: &str) -> Result<HostValue, CodecError>;

    fn serialize(&self, value: &HostValue) -> Result<String, CodecError>;
}

/// Failure to parse or serialize JSON text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct CodecError {
    message: String,
}

impl CodecError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::new(err.to_string())
    }
}

/// The default codec, backed by `serde_json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerdeJsonCodec;

impl JsonCodec for SerdeJsonCodec {
    fn parse(&self, text: &str) -> Result<HostValue, CodecError> {
        Ok(HostValue::Json(serde_json::from_str(text)?))
    }

    fn serialize(&self, value: &HostValue) -> Result<String, CodecError> {
        match value {
            HostValue::Missing => Err(CodecError::new("a missing value has no JSON text")),
            HostValue::Json(json) => Ok(serde_json::to_string(json)?),
        }
    }
}

#[cfg(test)]
#[path = "codec_test.rs"]
mod codec_test;
