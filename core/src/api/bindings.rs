//! Values that can be bound to JSONata variables.

use crate::value::HostValue;
use core::fmt;
use rquickjs::{Ctx, Value};
use std::sync::Arc;

type ForeignFn = dyn for<'js> Fn(&Ctx<'js>) -> rquickjs::Result<Value<'js>> + Send + Sync;

/// A runtime value built by the caller inside the namespace's context.
///
/// This is an escape hatch for exposing things the other binding kinds cannot
/// express (e.g. a native function). Whatever the closure returns becomes
/// reachable from sandboxed code, so it widens the attack surface; only use
/// it with values you fully control.
///
/// The closure runs while the engine is locked. It must not call back into
/// the same [`Engine`](super::Engine).
#[derive(Clone)]
pub struct ForeignValue(Arc<ForeignFn>);

impl ForeignValue {
    pub fn new<F>(build: F) -> Self
    where
        F: for<'js> Fn(&Ctx<'js>) -> rquickjs::Result<Value<'js>> + Send + Sync + 'static,
    {
        Self(Arc::new(build))
    }

    pub(crate) fn build<'js>(&self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for ForeignValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ForeignValue(..)")
    }
}

/// What a name is bound to.
#[derive(Debug, Clone)]
pub enum BindingValue {
    /// JavaScript source, evaluated in the namespace when bound.
    ///
    /// The source must *evaluate* to the value: `x => x * 2` or
    /// `(function (x) { return x * 2; })` bind a function, while a function
    /// declaration statement evaluates to `undefined`.
    Expression(String),
    /// A host value, marshalled into the runtime.
    Value(HostValue),
    /// A runtime value built by the caller.
    Foreign(ForeignValue),
}

impl BindingValue {
    pub fn expression(source: impl Into<String>) -> Self {
        BindingValue::Expression(source.into())
    }
}

impl From<HostValue> for BindingValue {
    fn from(value: HostValue) -> Self {
        BindingValue::Value(value)
    }
}

impl From<serde_json::Value> for BindingValue {
    fn from(value: serde_json::Value) -> Self {
        BindingValue::Value(HostValue::Json(value))
    }
}

impl From<ForeignValue> for BindingValue {
    fn from(value: ForeignValue) -> Self {
        BindingValue::Foreign(value)
    }
}

/// Ordered name to value bindings for a single evaluation.
///
/// A later entry for the same name replaces an earlier one.
///
/// # Example
///
/// ```
/// use jsonata_sandbox_core::api::{BindingValue, Bindings};
/// use serde_json::json;
///
/// let bindings = Bindings::new()
///     .with("rate", json!(0.2))
///     .with("double", BindingValue::expression("x => x * 2"));
/// assert_eq!(bindings.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    entries: Vec<(String, BindingValue)>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<BindingValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<BindingValue>) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BindingValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N, V> FromIterator<(N, V)> for Bindings
where
    N: Into<String>,
    V: Into<BindingValue>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut bindings = Bindings::new();
        for (name, value) in iter {
            bindings.insert(name, value);
        }
        bindings
    }
}
