use super::{CodecError, JsonCodec, SerdeJsonCodec};
use crate::value::HostValue;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_parse_keeps_key_order() {
    let parsed = SerdeJsonCodec.parse(r#"{"z":1,"a":2,"m":3}"#).unwrap();
    let keys: Vec<_> = parsed
        .as_json()
        .and_then(|v| v.as_object())
        .map(|o| o.keys().cloned().collect())
        .unwrap();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn test_parse_null_is_not_missing() {
    assert_eq!(SerdeJsonCodec.parse("null").unwrap(), HostValue::null());
}

#[test]
fn test_parse_rejects_invalid_text() {
    let err = SerdeJsonCodec.parse("{oops").unwrap_err();
    assert!(err.message().contains("key must be a string"), "{err}");
}

#[test]
fn test_serialize() {
    let text = SerdeJsonCodec
        .serialize(&HostValue::from(json!({"a": [1, 2.5, "x"]})))
        .unwrap();
    assert_eq!(text, r#"{"a":[1,2.5,"x"]}"#);
}

#[test]
fn test_serialize_missing_fails() {
    assert_eq!(
        SerdeJsonCodec.serialize(&HostValue::Missing),
        Err(CodecError::new("a missing value has no JSON text"))
    );
}
