//! Wire-level interop: heaps written by other producers decode here, and
//! heaps written here have the expected shape.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use serde_json::json;

use preserve_codec::{decode_json, encode_json, DecodeError};
use preserve_heap::HeapError;
use preserve_value::{ObjectKind, Realm, Symbol, Value};

#[test]
fn encode_json_shape() {
    let value = Value::object([
        ("n", Value::number(-0.0)),
        ("list", Value::array(vec![Value::Boolean(true)])),
    ]);
    let text = encode_json(&value, &Realm::standard()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        parsed,
        json!({
            "0": {"type": "object", "value": [
                {"key": 1, "value": 2},
                {"key": 3, "value": 4}
            ]},
            "1": {"type": "string", "value": "n"},
            "2": {"type": "neg0", "value": ""},
            "3": {"type": "string", "value": "list"},
            "4": {"type": "array", "value": [5]},
            "5": {"type": "boolean", "value": true}
        })
    );
}

#[test]
fn decode_foreign_heap() {
    let text = r#"{
        "0": {"type": "object", "value": [
            {"key": 1, "value": 2},
            {"key": 3, "value": 4},
            {"key": 5, "value": 0}
        ]},
        "1": {"type": "string", "value": "when"},
        "2": {"type": "date", "value": 0},
        "3": {"type": "string", "value": "re"},
        "4": {"type": "regexp", "value": {"src": "a|b", "flags": "gi"}},
        "5": {"type": "string", "value": "self"}
    }"#;
    let value = decode_json(text, &Realm::standard()).unwrap();
    let obj = value.as_object().unwrap();
    assert!(obj.get_property("when").unwrap().deep_equals(&Value::date(0.0)));
    let re = obj.get_property("re").unwrap();
    assert_eq!(re.to_string(), "/a|b/gi");
    let Some(Value::Object(me)) = obj.get_property("self") else {
        panic!("expected self reference");
    };
    assert!(me.ptr_eq(obj));
}

#[test]
fn decode_array_buffer_from_signed_bytes() {
    let value = decode_json(
        r#"[{"type": "arraybuffer", "value": [-1, 16]}]"#,
        &Realm::standard(),
    )
    .unwrap();
    let obj = value.as_object().unwrap();
    let kind = obj.borrow();
    match &*kind {
        ObjectKind::ArrayBuffer(bytes) => assert_eq!(bytes, &vec![255, 16]),
        _ => panic!("expected array buffer"),
    }
}

#[test]
fn unknown_tag_is_reported() {
    let err = decode_json(
        r#"[{"type": "weakref", "value": ""}]"#,
        &Realm::standard(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Heap(HeapError::UnreachableTag { .. })
    ));
    assert_eq!(err.to_string(), "record #0 has unknown type `weakref`");
}

#[test]
fn encoded_text_decodes_back() {
    let value = Value::map([(Value::bigint(7), Value::string("seven"))]);
    let realm = Realm::standard();
    let text = encode_json(&value, &realm).unwrap();
    assert!(decode_json(&text, &realm).unwrap().deep_equals(&value));
}

#[test]
fn undescribed_symbol_writes_empty_description() {
    let value = Value::Symbol(Symbol::new(None));
    let text = encode_json(&value, &Realm::standard()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, json!({"0": {"type": "symbol", "value": ""}}));
}

#[test]
fn numeric_keys_use_script_number_text() {
    let text = r#"[
        {"type": "object", "value": [{"key": 1, "value": 3}, {"key": 2, "value": 3}]},
        {"type": "number", "value": 1e21},
        {"type": "number", "value": 1e-7},
        {"type": "null", "value": ""}
    ]"#;
    let value = decode_json(text, &Realm::standard()).unwrap();
    let obj = value.as_object().unwrap();
    assert!(obj.get_property("1e+21").is_some());
    assert!(obj.get_property("1e-7").is_some());
}
