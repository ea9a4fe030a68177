//! Heap-to-value decoder.
//!
//! Reconstruction starts at slot 0 and is memoized by slot. Containers are
//! allocated empty and memoized before their children are decoded, so a
//! reference back to a container (a cycle) finds the instance that is still
//! being populated.
//!
//! Constructors come from the environment. When a record names one the
//! environment lacks, decoding degrades instead of failing and records a
//! [`ConstructorUnavailable`] for the caller.

use std::fmt;

use preserve_heap::{ErrorPayload, Heap, Record, SlotId, TypedArrayPayload};
use preserve_stack::ensure_sufficient_stack;
use preserve_value::{
    BigInt, Constructor, DomNode, Environment, ErrorData, Function, Object, ObjectKind,
    RegExpFlags, Symbol, Value,
};
use tracing::{debug, trace, warn};

use crate::DecodeError;

/// Rebuild the value rooted at slot 0 of `heap`.
pub fn decode<E: Environment + ?Sized>(heap: &Heap, env: &E) -> Result<Value, DecodeError> {
    decode_report(heap, env).map(|output| output.value)
}

/// Like [`decode`], also reporting every constructor fallback taken.
pub fn decode_report<E: Environment + ?Sized>(
    heap: &Heap,
    env: &E,
) -> Result<DecodeOutput, DecodeError> {
    Decoder::new(heap, env).decode_root()
}

/// A decoded value plus the fallbacks taken to produce it.
#[derive(Debug)]
pub struct DecodeOutput {
    pub value: Value,
    pub fallbacks: Vec<ConstructorUnavailable>,
}

/// A record named a constructor the environment does not have.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructorUnavailable {
    pub slot: SlotId,
    pub name: String,
}

impl fmt::Display for ConstructorUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "record {}: constructor `{}` is unavailable, used a substitute",
            self.slot, self.name
        )
    }
}

/// One decode call's state: the memo table, indexed by slot.
pub struct Decoder<'a, E: ?Sized> {
    heap: &'a Heap,
    env: &'a E,
    memo: Vec<Option<Value>>,
    fallbacks: Vec<ConstructorUnavailable>,
}

impl<'a, E: Environment + ?Sized> Decoder<'a, E> {
    pub fn new(heap: &'a Heap, env: &'a E) -> Self {
        Decoder {
            heap,
            env,
            memo: vec![None; heap.len()],
            fallbacks: Vec::new(),
        }
    }

    pub fn decode_root(mut self) -> Result<DecodeOutput, DecodeError> {
        if self.heap.is_empty() {
            return Err(DecodeError::EmptyHeap);
        }
        let value = self.decode(SlotId::ROOT)?;
        debug!(
            records = self.heap.len(),
            fallbacks = self.fallbacks.len(),
            root = value.type_of(),
            "decoded heap"
        );
        Ok(DecodeOutput {
            value,
            fallbacks: self.fallbacks,
        })
    }

    /// Decode one slot, returning the memoized value if it has one.
    pub fn decode(&mut self, slot: SlotId) -> Result<Value, DecodeError> {
        if let Some(Some(value)) = self.memo.get(slot.index()) {
            return Ok(value.clone());
        }
        let heap = self.heap;
        let Some(record) = heap.get(slot) else {
            return Err(DecodeError::DanglingSlot {
                slot,
                len: heap.len(),
            });
        };
        trace!(%slot, tag = %record.tag(), "decode");
        let value = ensure_sufficient_stack(|| self.decode_record(slot, record))?;
        self.memoize(slot, &value);
        Ok(value)
    }

    fn memoize(&mut self, slot: SlotId, value: &Value) {
        if let Some(entry) = self.memo.get_mut(slot.index()) {
            *entry = Some(value.clone());
        }
    }

    /// Allocate an empty container and memoize it before its children.
    fn register(&mut self, slot: SlotId, kind: ObjectKind) -> Object {
        let obj = Object::new(kind);
        self.memoize(slot, &Value::Object(obj.clone()));
        obj
    }

    fn fallback(&mut self, slot: SlotId, name: &str) {
        warn!(%slot, constructor = name, "constructor unavailable, using substitute");
        self.fallbacks.push(ConstructorUnavailable {
            slot,
            name: name.to_string(),
        });
    }

    fn decode_record(&mut self, slot: SlotId, record: &Record) -> Result<Value, DecodeError> {
        match record {
            Record::Undefined => Ok(Value::Undefined),
            Record::Null => Ok(Value::Null),
            Record::Boolean(b) => Ok(Value::Boolean(*b)),
            Record::Number(n) => Ok(Value::Number(*n)),
            Record::String(s) => Ok(Value::String(s.clone())),
            Record::Nan => Ok(Value::Number(f64::NAN)),
            Record::Infinity(sign) => Ok(Value::Number(sign.infinity())),
            Record::NegZero => Ok(Value::Number(-0.0)),
            Record::BigInt(text) => match text.parse::<BigInt>() {
                Ok(n) => Ok(Value::BigInt(n)),
                Err(_) => Err(DecodeError::InvalidBigInt {
                    slot,
                    text: text.clone(),
                }),
            },
            Record::Symbol(desc) => Ok(Value::Symbol(Symbol::new(desc.clone()))),
            Record::Date(ms) => Ok(Value::date(*ms)),
            Record::RegExp(re) => match RegExpFlags::parse(&re.flags) {
                Some(flags) => Ok(Value::regexp(re.source.clone(), flags)),
                None => Err(DecodeError::InvalidRegExpFlags {
                    slot,
                    flags: re.flags.clone(),
                }),
            },
            Record::Error(err) => Ok(self.decode_error(slot, err)),
            Record::ArrayBuffer(bytes) => Ok(self.decode_array_buffer(slot, bytes)),
            Record::TypedArray(view) => Ok(self.decode_typed_array(slot, view)),
            // A placeholder: metadata survives, behavior does not.
            Record::Function(func) => Ok(Value::Function(Function::inert(
                func.name.clone(),
                func.body.clone(),
                func.proto.clone(),
            ))),
            Record::DomNode(text) => self.decode_dom_node(slot, text),
            Record::Array(items) => {
                let obj = self.register(slot, ObjectKind::Array(Vec::with_capacity(items.len())));
                for &item in items {
                    let value = self.decode(item)?;
                    obj.push(value);
                }
                Ok(Value::Object(obj))
            }
            Record::Object(entries) => {
                let obj = self.register(slot, ObjectKind::Ordinary(Vec::with_capacity(entries.len())));
                for entry in entries {
                    let key = self.decode_property_key(entry.key)?;
                    let value = self.decode(entry.value)?;
                    obj.set_property(key, value);
                }
                Ok(Value::Object(obj))
            }
            Record::Map(entries) => {
                let obj = self.register(slot, ObjectKind::Map(Vec::with_capacity(entries.len())));
                for entry in entries {
                    let key = self.decode(entry.key)?;
                    let value = self.decode(entry.value)?;
                    obj.map_insert(key, value);
                }
                Ok(Value::Object(obj))
            }
            Record::Set(items) => {
                let obj = self.register(slot, ObjectKind::Set(Vec::with_capacity(items.len())));
                for &item in items {
                    let value = self.decode(item)?;
                    obj.set_insert(value);
                }
                Ok(Value::Object(obj))
            }
            Record::NodeList(items) => {
                let obj = self.register(slot, ObjectKind::NodeList(Vec::new()));
                self.decode_members(&obj, items)?;
                Ok(Value::Object(obj))
            }
            Record::HtmlCollection(items) => {
                let obj = self.register(slot, ObjectKind::HtmlCollection(Vec::new()));
                self.decode_members(&obj, items)?;
                Ok(Value::Object(obj))
            }
        }
    }

    /// Plain-object keys go through property-key conversion.
    fn decode_property_key(&mut self, slot: SlotId) -> Result<String, DecodeError> {
        let key = self.decode(slot)?;
        key.to_property_key()
            .ok_or_else(|| DecodeError::InvalidPropertyKey {
                slot,
                found: key.type_of().to_string(),
            })
    }

    /// Look up the error's own constructor; otherwise build a base error
    /// and patch its name.
    fn decode_error(&mut self, slot: SlotId, err: &ErrorPayload) -> Value {
        let constructed = self
            .env
            .constructor(&err.name)
            .and_then(|ctor| ctor.construct_error(&err.message, err.stack.clone()));
        if let Some(obj) = constructed {
            return Value::Object(obj);
        }
        self.fallback(slot, &err.name);
        let base = self
            .env
            .constructor("Error")
            .filter(|ctor| ctor.is_error())
            .map_or("Error", Constructor::name);
        let mut data = ErrorData::new(base, err.message.clone()).with_name(err.name.clone());
        data.stack = err.stack.clone();
        Value::error(data)
    }

    fn decode_array_buffer(&mut self, slot: SlotId, bytes: &[i8]) -> Value {
        let unsigned: Vec<u8> = bytes.iter().map(|b| b.to_ne_bytes()[0]).collect();
        if matches!(self.env.constructor("ArrayBuffer"), Some(Constructor::ArrayBuffer)) {
            return Value::array_buffer(unsigned);
        }
        self.fallback(slot, "ArrayBuffer");
        Value::array(
            unsigned
                .into_iter()
                .map(|b| Value::Number(f64::from(b)))
                .collect(),
        )
    }

    fn decode_typed_array(&mut self, slot: SlotId, view: &TypedArrayPayload) -> Value {
        let constructed = self
            .env
            .constructor(&view.ctor)
            .and_then(|ctor| ctor.construct_typed_array(&view.elements));
        if let Some(obj) = constructed {
            return Value::Object(obj);
        }
        self.fallback(slot, &view.ctor);
        Value::array(view.elements.iter().copied().map(Value::Number).collect())
    }

    /// Parse node text; an empty document decodes to null.
    fn decode_dom_node(&mut self, slot: SlotId, text: &str) -> Result<Value, DecodeError> {
        let Some(codec) = self.env.dom_codec() else {
            return Err(DecodeError::DomCodecUnavailable { slot });
        };
        let parsed = codec
            .parse(text)
            .map_err(|source| DecodeError::Dom { slot, source })?;
        Ok(match parsed {
            Some(mut node) => {
                // Serializers add the namespace declaration to the root element.
                if let Some(el) = node.as_element_mut() {
                    el.remove_attribute("xmlns");
                }
                Value::dom_node(node)
            }
            None => Value::Null,
        })
    }

    /// Decode collection members, keeping only element nodes.
    ///
    /// Appending a node that is already a member moves it to the end, so a
    /// slot listed twice yields one member.
    fn decode_members(&mut self, collection: &Object, items: &[SlotId]) -> Result<(), DecodeError> {
        let mut members: Vec<Value> = Vec::with_capacity(items.len());
        for &item in items {
            let member = self.decode(item)?;
            if is_element(&member) {
                members.retain(|existing| existing.identity() != member.identity());
                members.push(member);
            }
        }
        for member in members {
            collection.push(member);
        }
        Ok(())
    }
}

fn is_element(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| matches!(&*obj.borrow(), ObjectKind::Node(DomNode::Element(_))))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
