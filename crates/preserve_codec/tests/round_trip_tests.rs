//! End-to-end encode/decode behavior through the public API.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;

use preserve_codec::{decode, decode_report, encode, ConstructorUnavailable};
use preserve_heap::{Record, SlotId, Tag};
use preserve_value::{
    DomNode, Element, ErrorData, Function, ObjectKind, Realm, RegExpFlags, TypedArrayKind, Value,
};

fn round_trip(value: &Value) -> Value {
    let realm = Realm::standard();
    let heap = encode(value, &realm).unwrap();
    decode(&heap, &realm).unwrap()
}

#[test]
fn json_like_values_round_trip() {
    let value = Value::object([
        ("name", Value::string("preserve")),
        ("count", Value::number(3.0)),
        ("ratio", Value::number(0.25)),
        ("ok", Value::Boolean(true)),
        ("none", Value::Null),
        (
            "items",
            Value::array(vec![
                Value::number(1.0),
                Value::object([("nested", Value::array(vec![]))]),
                Value::string(""),
            ]),
        ),
    ]);
    assert!(round_trip(&value).deep_equals(&value));
}

#[test]
fn self_cycle_is_reference_identical() {
    let Value::Object(obj) = Value::object::<&str>([]) else {
        panic!("expected object");
    };
    obj.set_property("self", Value::Object(obj.clone()));

    let copy = round_trip(&Value::Object(obj));
    let copy = copy.as_object().unwrap();
    let Some(Value::Object(inner)) = copy.get_property("self") else {
        panic!("expected self property");
    };
    assert!(inner.ptr_eq(copy));
}

#[test]
fn shared_reference_decodes_once() {
    let shared = Value::object::<&str>([]);
    let value = Value::object([("a", shared.clone()), ("b", shared)]);

    let copy = round_trip(&value);
    let copy = copy.as_object().unwrap();
    let (Some(Value::Object(a)), Some(Value::Object(b))) =
        (copy.get_property("a"), copy.get_property("b"))
    else {
        panic!("expected object properties");
    };
    assert!(a.ptr_eq(&b));
}

#[test]
fn atoms_are_not_deduplicated() {
    let heap = encode(
        &Value::array(vec![Value::number(1.0), Value::number(1.0)]),
        &Realm::standard(),
    )
    .unwrap();
    assert_eq!(heap.len(), 3);
}

#[test]
fn numeric_edge_cases() {
    let realm = Realm::standard();
    let tag = |n: f64| encode(&Value::number(n), &realm).unwrap().root().map(Record::tag);
    assert_eq!(tag(f64::NAN), Some(Tag::Nan));
    assert_eq!(tag(-0.0), Some(Tag::NegZero));
    assert_eq!(tag(0.0), Some(Tag::Number));
    assert_eq!(
        encode(&Value::number(0.0), &realm).unwrap().root(),
        Some(&Record::Number(0.0))
    );

    let back = |n: f64| round_trip(&Value::number(n)).as_number().unwrap();
    let nan = back(f64::NAN);
    #[allow(clippy::eq_op, reason = "NaN is the only value unequal to itself")]
    let unequal = nan != nan;
    assert!(unequal);
    assert!((1.0 / back(-0.0)).is_sign_negative());
    assert!((1.0 / back(0.0)).is_sign_positive());
    assert_eq!(back(f64::INFINITY), f64::INFINITY);
    assert_eq!(back(f64::NEG_INFINITY), f64::NEG_INFINITY);
}

#[test]
fn function_keeps_metadata_but_not_behavior() {
    let calls = std::rc::Rc::new(std::cell::Cell::new(0));
    let counter = calls.clone();
    let f = Function::native("bump", "function bump() { n += 1 }", move |_| {
        counter.set(counter.get() + 1);
        Value::Undefined
    });
    f.call(&[]);
    assert_eq!(calls.get(), 1);

    let copy = round_trip(&Value::Function(f));
    let copy = copy.as_function().unwrap();
    assert_eq!(copy.name(), "bump");
    assert_eq!(copy.source(), "function bump() { n += 1 }");
    assert_eq!(copy.to_string(), "function bump() { n += 1 }");
    assert_eq!(copy.constructor_name(), "Function");

    assert!(matches!(copy.call(&[]), Value::Undefined));
    assert_eq!(calls.get(), 1);
}

#[test]
fn typed_array_falls_back_without_constructor() {
    let value = Value::typed_array(TypedArrayKind::Float32, &[1.5, 2.0]);
    let heap = encode(&value, &Realm::standard()).unwrap();

    let bare = Realm::builder().without("Float32Array").build();
    let output = decode_report(&heap, &bare).unwrap();
    assert!(output
        .value
        .deep_equals(&Value::array(vec![Value::number(1.5), Value::number(2.0)])));
    assert_eq!(
        output.fallbacks,
        vec![ConstructorUnavailable {
            slot: SlotId::ROOT,
            name: "Float32Array".into(),
        }]
    );
}

#[test]
fn minimal_realm_degrades_instead_of_failing() {
    let value = Value::array(vec![
        Value::error(ErrorData::new("TypeError", "bad")),
        Value::typed_array(TypedArrayKind::Uint8, &[7.0]),
    ]);
    let heap = encode(&value, &Realm::standard()).unwrap();
    let output = decode_report(&heap, &Realm::minimal()).unwrap();
    let names: Vec<_> = output.fallbacks.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["TypeError", "Uint8Array"]);
}

#[test]
fn exotic_kinds_round_trip() {
    let value = Value::object([
        (
            "map",
            Value::map([
                (Value::string("a"), Value::number(1.0)),
                (Value::number(f64::NAN), Value::Null),
            ]),
        ),
        ("set", Value::set([Value::bigint(10), Value::Undefined])),
        ("when", Value::date(86_400_000.0)),
        ("never", Value::date(f64::NAN)),
        (
            "pattern",
            Value::regexp("\\d+", RegExpFlags::GLOBAL | RegExpFlags::STICKY),
        ),
        (
            "failure",
            Value::error(ErrorData::new("RangeError", "too far").with_stack("at here")),
        ),
        ("bytes", Value::array_buffer(vec![0, 1, 200, 255])),
        (
            "view",
            Value::typed_array(TypedArrayKind::Float64, &[f64::NAN, -0.0, 1e300]),
        ),
        ("symbol", Value::symbol("token")),
    ]);
    let copy = round_trip(&value);

    // Symbols are unique, so compare everything else structurally.
    let copy = copy.as_object().unwrap();
    let original = value.as_object().unwrap();
    for (key, expected) in original.own_enumerable_properties() {
        let actual = copy.get_property(&key).unwrap();
        if key == "symbol" {
            let sym = actual.as_symbol().unwrap();
            assert_eq!(sym.description(), Some("token"));
        } else {
            assert!(actual.deep_equals(&expected), "property `{key}` differs");
        }
    }
}

#[test]
fn shared_symbol_stays_shared() {
    let sym = Value::symbol("s");
    let copy = round_trip(&Value::array(vec![sym.clone(), sym]));
    let arr = copy.as_object().unwrap();
    let (Some(Value::Symbol(a)), Some(Value::Symbol(b))) = (arr.element(0), arr.element(1)) else {
        panic!("expected symbols");
    };
    assert!(a.ptr_eq(&b));
}

#[test]
fn cyclic_map_and_set() {
    let Value::Object(map) = Value::map([]) else {
        panic!("expected map");
    };
    map.map_insert(Value::string("me"), Value::Object(map.clone()));
    let Value::Object(set) = Value::set([]) else {
        panic!("expected set");
    };
    set.set_insert(Value::Object(set.clone()));
    set.set_insert(Value::Object(map.clone()));

    let copy = round_trip(&Value::Object(set));
    let copy = copy.as_object().unwrap();
    let (first, second) = match &*copy.borrow() {
        ObjectKind::Set(items) => (items[0].clone(), items[1].clone()),
        _ => panic!("expected set"),
    };
    assert!(first.as_object().unwrap().ptr_eq(copy));
    let inner_map = second.as_object().unwrap();
    let Some(Value::Object(me)) = inner_map.map_get(&Value::string("me")) else {
        panic!("expected map entry");
    };
    assert!(me.ptr_eq(inner_map));
}

#[test]
fn dom_collections_preserve_member_identity() {
    let item = Value::dom_node(DomNode::Element(
        Element::new("li")
            .with_attribute("class", "x & y")
            .with_child(DomNode::text("one < two")),
    ));
    let value = Value::array(vec![
        Value::node_list(vec![item.clone()]),
        Value::html_collection(vec![item]),
    ]);
    let copy = round_trip(&value);
    assert!(copy.deep_equals(&value));

    let arr = copy.as_object().unwrap();
    let members: Vec<Value> = (0..2)
        .map(|i| arr.element(i).unwrap().as_object().unwrap().element(0).unwrap())
        .collect();
    assert!(members[0]
        .as_object()
        .unwrap()
        .ptr_eq(members[1].as_object().unwrap()));
}

#[test]
fn deep_chain_round_trips() {
    let mut value = Value::Null;
    for _ in 0..200_000 {
        value = Value::array(vec![value]);
    }
    let realm = Realm::standard();
    let heap = encode(&value, &realm).unwrap();
    let copy = decode(&heap, &realm).unwrap();
    assert_eq!(heap.len(), 200_001);
    assert_eq!(copy.as_object().map(preserve_value::Object::len), Some(1));
    drop(value);
    drop(copy);
}

#[test]
fn deep_map_chain_drops_after_decode() {
    let mut value = Value::Undefined;
    for depth in 0..100_000 {
        value = Value::map([(Value::number(f64::from(depth)), value)]);
    }
    let realm = Realm::standard();
    let copy = decode(&encode(&value, &realm).unwrap(), &realm).unwrap();
    drop(value);
    drop(copy);
}
