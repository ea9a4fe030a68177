use super::*;
use pretty_assertions::assert_eq;
use preserve_heap::{Sign, Tag};
use preserve_value::{
    DomNode, Element, ErrorData, OpaqueRef, Realm, RegExpFlags, TypedArrayKind,
};

fn slot(raw: u32) -> SlotId {
    SlotId::new(raw)
}

fn tags(heap: &Heap) -> Vec<Tag> {
    heap.iter().map(|(_, r)| r.tag()).collect()
}

#[test]
fn primitives_are_never_shared() {
    let heap = encode(
        &Value::array(vec![Value::number(1.0), Value::number(1.0)]),
        &Realm::standard(),
    )
    .unwrap();
    assert_eq!(heap.len(), 3);
    assert_eq!(heap.root(), Some(&Record::Array(vec![slot(1), slot(2)])));
}

#[test]
fn numeric_edge_cases() {
    let realm = Realm::standard();
    let root = |n: f64| encode(&Value::number(n), &realm).unwrap().root().cloned();
    assert_eq!(root(f64::NAN), Some(Record::Nan));
    assert_eq!(root(-0.0), Some(Record::NegZero));
    assert_eq!(root(0.0), Some(Record::Number(0.0)));
    assert_eq!(root(f64::INFINITY), Some(Record::Infinity(Sign::Positive)));
    assert_eq!(root(f64::NEG_INFINITY), Some(Record::Infinity(Sign::Negative)));
}

#[test]
fn shared_object_is_encoded_once() {
    let shared = Value::object::<&str>([]);
    let value = Value::object([("a", shared.clone()), ("b", shared)]);
    let heap = encode(&value, &Realm::standard()).unwrap();
    assert_eq!(
        heap.root(),
        Some(&Record::Object(vec![
            Entry {
                key: slot(1),
                value: slot(2)
            },
            Entry {
                key: slot(3),
                value: slot(2)
            },
        ]))
    );
    assert_eq!(heap.len(), 4);
}

#[test]
fn self_cycle_points_at_root() {
    let Value::Object(obj) = Value::object([("n", Value::Null)]) else {
        panic!("expected object");
    };
    obj.set_property("self", Value::Object(obj.clone()));
    let heap = encode(&Value::Object(obj), &Realm::standard()).unwrap();
    let Some(Record::Object(entries)) = heap.root() else {
        panic!("expected object record");
    };
    assert_eq!(entries[1].value, SlotId::ROOT);
    assert!(heap.validate().is_ok());
}

#[test]
fn shared_symbol_and_function() {
    let sym = Value::symbol("id");
    let func = Value::Function(Function::inert("f", "function f() {}", "Function"));
    let value = Value::array(vec![sym.clone(), sym, func.clone(), func]);
    let heap = encode(&value, &Realm::standard()).unwrap();
    assert_eq!(
        heap.root(),
        Some(&Record::Array(vec![slot(1), slot(1), slot(2), slot(2)]))
    );
    assert_eq!(
        heap.get(slot(2)),
        Some(&Record::Function(FunctionPayload {
            name: "f".into(),
            body: "function f() {}".into(),
            proto: "Function".into(),
        }))
    );
}

#[test]
fn map_and_set_entries() {
    let value = Value::array(vec![
        Value::map([(Value::string("k"), Value::Boolean(true))]),
        Value::set([Value::Null]),
    ]);
    let heap = encode(&value, &Realm::standard()).unwrap();
    assert_eq!(
        tags(&heap),
        vec![Tag::Array, Tag::Map, Tag::String, Tag::Boolean, Tag::Set, Tag::Null]
    );
    assert_eq!(
        heap.get(slot(1)),
        Some(&Record::Map(vec![Entry {
            key: slot(2),
            value: slot(3)
        }]))
    );
    assert_eq!(heap.get(slot(4)), Some(&Record::Set(vec![slot(5)])));
}

#[test]
fn leaf_kinds() {
    let value = Value::array(vec![
        Value::date(1_700_000_000_000.0),
        Value::regexp("^a", RegExpFlags::MULTILINE | RegExpFlags::GLOBAL),
        Value::error(ErrorData::new("RangeError", "out of range").with_stack("at x")),
        Value::array_buffer(vec![0, 127, 128, 255]),
        Value::typed_array(TypedArrayKind::Uint16, &[1.0, 65_536.0]),
        Value::bigint(-42),
    ]);
    let heap = encode(&value, &Realm::standard()).unwrap();
    assert_eq!(heap.get(slot(1)), Some(&Record::Date(1_700_000_000_000.0)));
    assert_eq!(
        heap.get(slot(2)),
        Some(&Record::RegExp(RegExpPayload {
            source: "^a".into(),
            flags: "gm".into(),
        }))
    );
    assert_eq!(
        heap.get(slot(3)),
        Some(&Record::Error(ErrorPayload {
            name: "RangeError".into(),
            message: "out of range".into(),
            stack: Some("at x".into()),
        }))
    );
    assert_eq!(
        heap.get(slot(4)),
        Some(&Record::ArrayBuffer(vec![0, 127, -128, -1]))
    );
    assert_eq!(
        heap.get(slot(5)),
        Some(&Record::TypedArray(TypedArrayPayload {
            ctor: "Uint16Array".into(),
            elements: vec![1.0, 0.0],
        }))
    );
    assert_eq!(heap.get(slot(6)), Some(&Record::BigInt("-42".into())));
}

#[test]
fn dom_nodes_and_collections() {
    let node = Value::dom_node(DomNode::Element(
        Element::new("li").with_attribute("id", "a"),
    ));
    let value = Value::node_list(vec![node.clone(), node]);
    let heap = encode(&value, &Realm::standard()).unwrap();
    assert_eq!(heap.root(), Some(&Record::NodeList(vec![slot(1), slot(1)])));
    assert_eq!(
        heap.get(slot(1)),
        Some(&Record::DomNode(r#"<li id="a"/>"#.into()))
    );
}

#[test]
fn dom_node_without_codec() {
    let realm = Realm::builder().without_dom_codec().build();
    let err = encode(&Value::dom_node(DomNode::text("x")), &realm).unwrap_err();
    assert!(matches!(err, EncodeError::DomCodecUnavailable));
}

#[test]
fn unsupported_type() {
    let value = Value::object([("w", Value::Opaque(OpaqueRef::new("weakref")))]);
    let err = encode(&value, &Realm::standard()).unwrap_err();
    match err {
        EncodeError::UnsupportedType { type_name } => assert_eq!(type_name, "weakref"),
        other => panic!("expected unsupported type, got {other}"),
    }
}

#[test]
fn classification_follows_the_realm() {
    // Without a Map binding a map is just an object with no own properties.
    let realm = Realm::builder().without("Map").build();
    let heap = encode(&Value::map([(Value::Null, Value::Null)]), &realm).unwrap();
    assert_eq!(heap.root(), Some(&Record::Object(Vec::new())));

    // Without the typed view binding the view's indices become properties.
    let realm = Realm::builder().without("Int8Array").build();
    let heap = encode(&Value::typed_array(TypedArrayKind::Int8, &[5.0]), &realm).unwrap();
    assert_eq!(
        tags(&heap),
        vec![Tag::Object, Tag::String, Tag::Number]
    );
    assert_eq!(heap.get(slot(1)), Some(&Record::String("0".into())));
}

#[test]
fn error_subclass_classifies_as_error() {
    let realm = Realm::builder().with_error_class("ValidationError").build();
    let heap = encode(
        &Value::error(ErrorData::new("ValidationError", "nope")),
        &realm,
    )
    .unwrap();
    assert_eq!(heap.root().map(Record::tag), Some(Tag::Error));
}

#[test]
fn deep_chain_does_not_overflow() {
    let mut value = Value::Null;
    for _ in 0..50_000 {
        value = Value::array(vec![value]);
    }
    let heap = encode(&value, &Realm::standard()).unwrap();
    assert_eq!(heap.len(), 50_001);
}
