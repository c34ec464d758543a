//! Conversion between [`HostValue`] and QuickJS values.
//!
//! Scalars that both sides agree on (`undefined`, `null`, booleans, strings)
//! are mapped directly. Numbers and containers round-trip through JSON text so
//! that the runtime's own parser decides their representation.
//!
//! That makes numbers lossy in one direction: JavaScript has no separate
//! integer type, and `JSON.stringify` writes integral values without a
//! fraction, so `1.0` sent in is read back as `1`.

use crate::classify::Fault;
use crate::codec::JsonCodec;
use crate::value::HostValue;
use rquickjs::{Ctx, Function, Value};
use serde_json::Value as Json;

const REPLACER_GLOBAL: &str = "__sandbox_strict_replacer";

// JSON.stringify silently drops functions and symbols. Refuse them instead,
// including JSONata's own lambda and native function wrappers.
const STRICT_REPLACER_SOURCE: &str = r#"(function (key, value) {
    var where = key === '' ? '' : ' at key "' + key + '"';
    if (typeof value === 'function' || typeof value === 'symbol') {
        throw new TypeError('cannot marshal a ' + typeof value + where);
    }
    if (value !== null && typeof value === 'object' &&
        (value._jsonata_lambda === true || value._jsonata_function === true)) {
        throw new TypeError('cannot marshal a function' + where);
    }
    return value;
})"#;

/// Host to runtime.
pub(crate) fn to_js<'js>(
    ctx: &Ctx<'js>,
    value: &HostValue,
    codec: &dyn JsonCodec,
) -> Result<Value<'js>, Fault> {
    match value {
        HostValue::Missing => Ok(Value::new_undefined(ctx.clone())),
        HostValue::Json(Json::Null) => Ok(Value::new_null(ctx.clone())),
        HostValue::Json(Json::Bool(b)) => Ok(Value::new_bool(ctx.clone(), *b)),
        HostValue::Json(Json::String(s)) => {
            Ok(rquickjs::String::from_str(ctx.clone(), s)?.into_value())
        }
        other => {
            let text = codec.serialize(other)?;
            Ok(ctx.json_parse(text)?)
        }
    }
}

/// Runtime to host.
pub(crate) fn from_js<'js>(
    ctx: &Ctx<'js>,
    value: Value<'js>,
    codec: &dyn JsonCodec,
) -> Result<HostValue, Fault> {
    if value.is_undefined() {
        return Ok(HostValue::Missing);
    }
    if value.is_null() {
        return Ok(HostValue::null());
    }
    if let Some(b) = value.as_bool() {
        return Ok(HostValue::from(b));
    }
    if let Some(s) = value.as_string() {
        return Ok(HostValue::from(s.to_string()?));
    }

    let type_name = value.type_name();
    match stringify_strict(ctx, value)? {
        Some(text) => Ok(codec.parse(&text)?),
        None => Err(Fault::Unrepresentable(type_name)),
    }
}

/// `JSON.stringify` that throws instead of dropping unserializable members.
///
/// Returns `None` when the runtime produced `undefined` (e.g. for
/// `undefined` itself).
pub(crate) fn stringify_strict<'js>(
    ctx: &Ctx<'js>,
    value: Value<'js>,
) -> rquickjs::Result<Option<String>> {
    let replacer = strict_replacer(ctx)?;
    ctx.json_stringify_replacer(value, replacer)?
        .map(|text| text.to_string())
        .transpose()
}

fn strict_replacer<'js>(ctx: &Ctx<'js>) -> rquickjs::Result<Function<'js>> {
    let globals = ctx.globals();
    let cached: Value = globals.get(REPLACER_GLOBAL)?;
    if let Some(replacer) = cached.as_function() {
        return Ok(replacer.clone());
    }
    let replacer: Function = ctx.eval(STRICT_REPLACER_SOURCE)?;
    globals.set(REPLACER_GLOBAL, replacer.clone())?;
    Ok(replacer)
}

#[cfg(test)]
#[path = "marshal_test.rs"]
mod marshal_test;
