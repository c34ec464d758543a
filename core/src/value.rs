//! Host-side value model exchanged with the embedded runtime.

use serde_json::Value as Json;

/// A structured value on the host side of the sandbox boundary.
///
/// JSON alone cannot say "there is no value here": a missing field and an
/// explicit `null` are different answers to a JSONata query. `HostValue`
/// keeps that distinction, so `Missing` and `Json(Json::Null)` never collapse
/// into each other on the way in or out of the runtime.
///
/// Numbers do not round-trip exactly. The runtime has a single IEEE-754
/// number type, so a host float with an integral value (`1.0`) comes back as
/// an integer (`1`), and integers outside ±2^53 lose precision.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HostValue {
    /// Total absence of a value. Maps to the runtime's `undefined`.
    #[default]
    Missing,
    /// Any JSON value, including an explicit `null`.
    Json(Json),
}

impl HostValue {
    /// An explicit `null`.
    pub const fn null() -> Self {
        HostValue::Json(Json::Null)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, HostValue::Missing)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Json(Json::Null))
    }

    /// The JSON value, or `None` when missing.
    pub fn as_json(&self) -> Option<&Json> {
        match self {
            HostValue::Missing => None,
            HostValue::Json(value) => Some(value),
        }
    }

    pub fn into_json(self) -> Option<Json> {
        match self {
            HostValue::Missing => None,
            HostValue::Json(value) => Some(value),
        }
    }

    /// Looks up `key` when this is a JSON object.
    pub fn get(&self, key: &str) -> Option<&Json> {
        self.as_json()?.as_object()?.get(key)
    }
}

impl From<Json> for HostValue {
    fn from(value: Json) -> Self {
        HostValue::Json(value)
    }
}

impl From<Option<Json>> for HostValue {
    fn from(value: Option<Json>) -> Self {
        value.map_or(HostValue::Missing, HostValue::Json)
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        HostValue::Json(Json::Bool(value))
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        HostValue::Json(Json::String(value.to_string()))
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        HostValue::Json(Json::String(value))
    }
}

impl From<i64> for HostValue {
    fn from(value: i64) -> Self {
        HostValue::Json(Json::from(value))
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        HostValue::Json(Json::from(value))
    }
}

#[cfg(test)]
#[path = "value_test.rs"]
mod value_test;
