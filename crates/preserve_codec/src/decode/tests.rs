use super::*;
use pretty_assertions::assert_eq;
use preserve_heap::{Entry, FunctionPayload, RegExpPayload, Sign};
use preserve_value::{Element, Realm, TypedArrayKind};

fn slot(raw: u32) -> SlotId {
    SlotId::new(raw)
}

fn heap(records: impl IntoIterator<Item = Record>) -> Heap {
    records.into_iter().collect()
}

fn object(value: &Value) -> Object {
    value.as_object().cloned().unwrap()
}

#[test]
fn empty_heap() {
    let err = decode(&Heap::new(), &Realm::standard()).unwrap_err();
    assert!(matches!(err, DecodeError::EmptyHeap));
}

#[test]
fn dangling_slot() {
    let err = decode(
        &heap([Record::Array(vec![slot(3)])]),
        &Realm::standard(),
    )
    .unwrap_err();
    assert!(matches!(err, DecodeError::DanglingSlot { slot: s, len: 1 } if s == slot(3)));
}

#[test]
fn numeric_records() {
    let realm = Realm::standard();
    let number = |record: Record| {
        decode(&heap([record]), &realm)
            .unwrap()
            .as_number()
            .unwrap()
    };
    assert!(number(Record::Nan).is_nan());
    let neg0 = number(Record::NegZero);
    assert_eq!(neg0, 0.0);
    assert!((1.0 / neg0).is_sign_negative());
    assert_eq!(number(Record::Infinity(Sign::Positive)), f64::INFINITY);
    assert_eq!(number(Record::Infinity(Sign::Negative)), f64::NEG_INFINITY);
}

#[test]
fn self_referencing_array() {
    let value = decode(&heap([Record::Array(vec![SlotId::ROOT])]), &Realm::standard()).unwrap();
    let arr = object(&value);
    let Some(Value::Object(inner)) = arr.element(0) else {
        panic!("expected element");
    };
    assert!(inner.ptr_eq(&arr));
}

#[test]
fn shared_slots_decode_to_one_instance() {
    let value = decode(
        &heap([
            Record::Array(vec![slot(1), slot(1), slot(2), slot(2)]),
            Record::Map(Vec::new()),
            Record::Function(FunctionPayload {
                name: "f".into(),
                body: "function f() {}".into(),
                proto: "Function".into(),
            }),
        ]),
        &Realm::standard(),
    )
    .unwrap();
    let arr = object(&value);
    let (Some(Value::Object(a)), Some(Value::Object(b))) = (arr.element(0), arr.element(1)) else {
        panic!("expected maps");
    };
    assert!(a.ptr_eq(&b));
    let (Some(Value::Function(f)), Some(Value::Function(g))) = (arr.element(2), arr.element(3))
    else {
        panic!("expected functions");
    };
    assert!(f.ptr_eq(&g));
    assert!(f.is_inert());
}

#[test]
fn object_keys_use_property_key_conversion() {
    let value = decode(
        &heap([
            Record::Object(vec![
                Entry {
                    key: slot(1),
                    value: slot(2),
                },
                Entry {
                    key: slot(3),
                    value: slot(2),
                },
            ]),
            Record::Number(1.0),
            Record::Null,
            Record::Boolean(true),
        ]),
        &Realm::standard(),
    )
    .unwrap();
    let keys: Vec<String> = object(&value)
        .own_enumerable_properties()
        .into_iter()
        .map(|(k, _)| k)
        .collect();
    assert_eq!(keys, vec!["1".to_string(), "true".to_string()]);
}

#[test]
fn symbol_key_is_rejected() {
    let err = decode(
        &heap([
            Record::Object(vec![Entry {
                key: slot(1),
                value: slot(1),
            }]),
            Record::Symbol(None),
        ]),
        &Realm::standard(),
    )
    .unwrap_err();
    match err {
        DecodeError::InvalidPropertyKey { slot: s, found } => {
            assert_eq!(s, slot(1));
            assert_eq!(found, "symbol");
        }
        other => panic!("expected invalid key, got {other}"),
    }
}

#[test]
fn invalid_bigint_and_flags() {
    let realm = Realm::standard();
    assert!(matches!(
        decode(&heap([Record::BigInt("12x".into())]), &realm),
        Err(DecodeError::InvalidBigInt { .. })
    ));
    assert!(matches!(
        decode(
            &heap([Record::RegExp(RegExpPayload {
                source: "a".into(),
                flags: "gg".into(),
            })]),
            &realm
        ),
        Err(DecodeError::InvalidRegExpFlags { .. })
    ));
}

#[test]
fn error_with_known_constructor() {
    let output = decode_report(
        &heap([Record::Error(ErrorPayload {
            name: "TypeError".into(),
            message: "bad".into(),
            stack: Some("at f".into()),
        })]),
        &Realm::standard(),
    )
    .unwrap();
    assert!(output.fallbacks.is_empty());
    let obj = object(&output.value);
    let kind = obj.borrow();
    match &*kind {
        ObjectKind::Error(data) => {
            assert_eq!(data.constructor, "TypeError");
            assert_eq!(data.name, "TypeError");
            assert_eq!(data.stack.as_deref(), Some("at f"));
        }
        _ => panic!("expected error"),
    }
}

#[test]
fn error_with_unknown_constructor_patches_name() {
    let output = decode_report(
        &heap([Record::Error(ErrorPayload {
            name: "ValidationError".into(),
            message: "nope".into(),
            stack: None,
        })]),
        &Realm::standard(),
    )
    .unwrap();
    assert_eq!(
        output.fallbacks,
        vec![ConstructorUnavailable {
            slot: SlotId::ROOT,
            name: "ValidationError".into(),
        }]
    );
    let obj = object(&output.value);
    let kind = obj.borrow();
    match &*kind {
        ObjectKind::Error(data) => {
            assert_eq!(data.constructor, "Error");
            assert_eq!(data.name, "ValidationError");
            assert_eq!(data.message, "nope");
        }
        _ => panic!("expected error"),
    }
}

#[test]
fn typed_array_with_constructor() {
    let value = decode(
        &heap([Record::TypedArray(TypedArrayPayload {
            ctor: "Int16Array".into(),
            elements: vec![1.0, -2.0],
        })]),
        &Realm::standard(),
    )
    .unwrap();
    let obj = object(&value);
    let kind = obj.borrow();
    match &*kind {
        ObjectKind::TypedArray(view) => {
            assert_eq!(view.kind(), TypedArrayKind::Int16);
            assert_eq!(view.elements(), &[1.0, -2.0]);
        }
        _ => panic!("expected typed array"),
    }
}

#[test]
fn array_buffer_bytes_are_unsigned_again() {
    let realm = Realm::standard();
    let value = decode(&heap([Record::ArrayBuffer(vec![-1, 0, 127, -128])]), &realm).unwrap();
    match &*object(&value).borrow() {
        ObjectKind::ArrayBuffer(bytes) => assert_eq!(bytes, &vec![255, 0, 127, 128]),
        _ => panic!("expected array buffer"),
    }

    let bare = Realm::builder().without("ArrayBuffer").build();
    let output = decode_report(&heap([Record::ArrayBuffer(vec![-1])]), &bare).unwrap();
    assert_eq!(output.fallbacks.len(), 1);
    assert!(output
        .value
        .deep_equals(&Value::array(vec![Value::number(255.0)])));
}

#[test]
fn dom_node_drops_namespace_declaration() {
    let value = decode(
        &heap([Record::DomNode(
            r#"<p xmlns="http://www.w3.org/1999/xhtml" class="x">hi</p>"#.into(),
        )]),
        &Realm::standard(),
    )
    .unwrap();
    let obj = object(&value);
    let kind = obj.borrow();
    match &*kind {
        ObjectKind::Node(DomNode::Element(el)) => {
            assert_eq!(el.attributes, vec![("class".to_string(), "x".to_string())]);
        }
        _ => panic!("expected element"),
    }
}

#[test]
fn empty_dom_text_decodes_to_null() {
    let value = decode(&heap([Record::DomNode("  ".into())]), &Realm::standard()).unwrap();
    assert!(matches!(value, Value::Null));
}

#[test]
fn malformed_dom_text() {
    let err = decode(&heap([Record::DomNode("<p>".into())]), &Realm::standard()).unwrap_err();
    assert!(matches!(err, DecodeError::Dom { .. }));
}

#[test]
fn dom_node_without_codec() {
    let realm = Realm::builder().without_dom_codec().build();
    let err = decode(&heap([Record::DomNode("<p/>".into())]), &realm).unwrap_err();
    assert!(matches!(err, DecodeError::DomCodecUnavailable { .. }));
}

#[test]
fn collections_keep_only_elements() {
    let value = decode(
        &heap([
            Record::HtmlCollection(vec![slot(1), slot(2), slot(3)]),
            Record::DomNode("<a/>".into()),
            Record::DomNode("<!--note-->".into()),
            Record::DomNode("<b/>".into()),
        ]),
        &Realm::standard(),
    )
    .unwrap();
    let expected = Value::html_collection(vec![
        Value::dom_node(Element::new("a").into()),
        Value::dom_node(Element::new("b").into()),
    ]);
    assert!(value.deep_equals(&expected));
}

#[test]
fn repeated_member_appears_once() {
    let value = decode(
        &heap([
            Record::NodeList(vec![slot(1), slot(2), slot(1)]),
            Record::DomNode("<a/>".into()),
            Record::DomNode("<b/>".into()),
        ]),
        &Realm::standard(),
    )
    .unwrap();
    let expected = Value::node_list(vec![
        Value::dom_node(Element::new("b").into()),
        Value::dom_node(Element::new("a").into()),
    ]);
    assert!(value.deep_equals(&expected));
    assert_eq!(object(&value).len(), 2);
}
