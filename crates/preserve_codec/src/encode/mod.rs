//! Value-to-heap encoder.
//!
//! Depth-first, one record per distinct value:
//!
//! - Primitives are appended on every occurrence.
//! - Symbols, functions and objects are looked up in the identity table
//!   first; a hit returns the existing slot without re-traversal.
//! - Containers reserve their slot and register their identity before any
//!   child is encoded, so a cycle resolves to the container's own slot.
//!
//! Objects are classified by asking the environment's constructors in
//! [`CLASSIFICATION_ORDER`]; the first one that claims the object decides
//! its record kind. An object no constructor claims is encoded as a plain
//! object from its own enumerable properties.

use preserve_heap::{
    Entry, ErrorPayload, FunctionPayload, Heap, Record, RegExpPayload, SlotId, Tag,
    TypedArrayPayload,
};
use preserve_stack::ensure_sufficient_stack;
use preserve_value::{
    Constructor, Environment, Function, Identity, Object, ObjectKind, Symbol, Value,
    CLASSIFICATION_ORDER,
};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::EncodeError;

/// Encode `value` into a fresh heap rooted at slot 0.
pub fn encode<E: Environment + ?Sized>(value: &Value, env: &E) -> Result<Heap, EncodeError> {
    Encoder::new(env).encode_root(value)
}

/// One encode call's state: the heap under construction and the identity
/// side-table.
pub struct Encoder<'env, E: ?Sized> {
    env: &'env E,
    heap: Heap,
    seen: FxHashMap<Identity, SlotId>,
}

/// Record kind chosen for an object.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Class {
    Map,
    Set,
    Date,
    RegExp,
    Error,
    ArrayBuffer,
    TypedArray,
    Array,
    Node,
    NodeList,
    HtmlCollection,
    Plain,
}

impl Class {
    fn of(ctor: &Constructor) -> Self {
        match ctor {
            Constructor::Map => Class::Map,
            Constructor::Set => Class::Set,
            Constructor::Date => Class::Date,
            Constructor::RegExp => Class::RegExp,
            Constructor::Error { .. } => Class::Error,
            Constructor::ArrayBuffer => Class::ArrayBuffer,
            Constructor::TypedArray(_) => Class::TypedArray,
            Constructor::Array => Class::Array,
            Constructor::Node => Class::Node,
            Constructor::NodeList => Class::NodeList,
            Constructor::HtmlCollection => Class::HtmlCollection,
        }
    }
}

impl<'env, E: Environment + ?Sized> Encoder<'env, E> {
    pub fn new(env: &'env E) -> Self {
        Encoder {
            env,
            heap: Heap::new(),
            seen: FxHashMap::default(),
        }
    }

    /// Encode the root value and hand back the finished heap.
    pub fn encode_root(mut self, value: &Value) -> Result<Heap, EncodeError> {
        let root = self.encode(value)?;
        debug_assert_eq!(root, SlotId::ROOT);
        debug!(
            records = self.heap.len(),
            shared = self.seen.len(),
            root = value.type_of(),
            "encoded value"
        );
        Ok(self.heap)
    }

    fn encode(&mut self, value: &Value) -> Result<SlotId, EncodeError> {
        ensure_sufficient_stack(|| self.encode_value(value))
    }

    fn encode_value(&mut self, value: &Value) -> Result<SlotId, EncodeError> {
        match value {
            Value::Undefined => Ok(self.push(Record::Undefined)),
            Value::Null => Ok(self.push(Record::Null)),
            Value::Boolean(b) => Ok(self.push(Record::Boolean(*b))),
            Value::Number(n) => Ok(self.push(Record::number(*n))),
            Value::BigInt(n) => Ok(self.push(Record::BigInt(n.to_string()))),
            Value::String(s) => Ok(self.push(Record::String(s.clone()))),
            Value::Symbol(sym) => Ok(self.encode_symbol(sym)),
            Value::Function(func) => Ok(self.encode_function(func)),
            Value::Object(obj) => self.encode_object(obj),
            Value::Opaque(opaque) => Err(EncodeError::UnsupportedType {
                type_name: opaque.type_name().to_string(),
            }),
        }
    }

    fn push(&mut self, record: Record) -> SlotId {
        let tag = record.tag();
        let slot = self.heap.push(record);
        trace!(%slot, %tag, "record");
        slot
    }

    /// Append a leaf record for a reference kind and register its identity.
    fn push_shared(&mut self, identity: Identity, record: Record) -> SlotId {
        let slot = self.push(record);
        self.seen.insert(identity, slot);
        slot
    }

    /// Reserve an empty container slot and register its identity, so
    /// children that point back at it resolve to this slot.
    fn reserve(&mut self, identity: Identity, tag: Tag) -> Result<SlotId, EncodeError> {
        let slot = self.heap.reserve(tag)?;
        trace!(%slot, %tag, "reserved");
        self.seen.insert(identity, slot);
        Ok(slot)
    }

    fn fill(&mut self, slot: SlotId, record: Record) {
        let filled = self.heap.fill(slot, record);
        debug_assert!(filled, "container slot {slot} changed kind");
    }

    fn encode_symbol(&mut self, sym: &Symbol) -> SlotId {
        if let Some(&slot) = self.seen.get(&sym.identity()) {
            return slot;
        }
        let record = Record::Symbol(sym.description().map(str::to_string));
        self.push_shared(sym.identity(), record)
    }

    /// Functions are leaves: metadata only, closure state is not captured.
    fn encode_function(&mut self, func: &Function) -> SlotId {
        if let Some(&slot) = self.seen.get(&func.identity()) {
            return slot;
        }
        let record = Record::Function(FunctionPayload {
            name: func.name().to_string(),
            body: func.source().to_string(),
            proto: func.constructor_name().to_string(),
        });
        self.push_shared(func.identity(), record)
    }

    /// First constructor in classification order that claims the object.
    fn classify(&self, kind: &ObjectKind) -> Class {
        CLASSIFICATION_ORDER
            .iter()
            .filter_map(|name| self.env.constructor(name))
            .find(|ctor| ctor.has_instance(kind))
            .map_or(Class::Plain, Class::of)
    }

    fn encode_object(&mut self, obj: &Object) -> Result<SlotId, EncodeError> {
        let identity = obj.identity();
        if let Some(&slot) = self.seen.get(&identity) {
            trace!(%slot, "shared");
            return Ok(slot);
        }
        let kind = obj.borrow();
        let class = self.classify(&kind);
        match (class, &*kind) {
            (Class::Map, ObjectKind::Map(entries)) => {
                let slot = self.reserve(identity, Tag::Map)?;
                let entries = self.encode_entries(entries)?;
                self.fill(slot, Record::Map(entries));
                Ok(slot)
            }
            (Class::Set, ObjectKind::Set(items)) => {
                self.encode_sequence(identity, Tag::Set, items, Record::Set)
            }
            (Class::Array, ObjectKind::Array(items)) => {
                self.encode_sequence(identity, Tag::Array, items, Record::Array)
            }
            (Class::NodeList, ObjectKind::NodeList(items)) => {
                self.encode_sequence(identity, Tag::NodeList, items, Record::NodeList)
            }
            (Class::HtmlCollection, ObjectKind::HtmlCollection(items)) => {
                self.encode_sequence(identity, Tag::HtmlCollection, items, Record::HtmlCollection)
            }
            (Class::Date, ObjectKind::Date(ms)) => Ok(self.push_shared(identity, Record::Date(*ms))),
            (Class::RegExp, ObjectKind::RegExp(re)) => {
                let record = Record::RegExp(RegExpPayload {
                    source: re.source.clone(),
                    flags: re.flags.to_flag_string(),
                });
                Ok(self.push_shared(identity, record))
            }
            (Class::Error, ObjectKind::Error(err)) => {
                let record = Record::Error(ErrorPayload {
                    name: err.name.clone(),
                    message: err.message.clone(),
                    stack: err.stack.clone(),
                });
                Ok(self.push_shared(identity, record))
            }
            (Class::ArrayBuffer, ObjectKind::ArrayBuffer(bytes)) => {
                let signed = bytes.iter().map(|&b| i8::from_ne_bytes([b])).collect();
                Ok(self.push_shared(identity, Record::ArrayBuffer(signed)))
            }
            (Class::TypedArray, ObjectKind::TypedArray(view)) => {
                let record = Record::TypedArray(TypedArrayPayload {
                    ctor: view.kind().name().to_string(),
                    elements: view.elements().to_vec(),
                });
                Ok(self.push_shared(identity, record))
            }
            (Class::Node, ObjectKind::Node(node)) => {
                let Some(codec) = self.env.dom_codec() else {
                    return Err(EncodeError::DomCodecUnavailable);
                };
                let text = codec.serialize(node);
                Ok(self.push_shared(identity, Record::DomNode(text)))
            }
            _ => self.encode_plain(identity, obj),
        }
    }

    /// A plain object: one `{key, value}` entry per own enumerable property.
    fn encode_plain(&mut self, identity: Identity, obj: &Object) -> Result<SlotId, EncodeError> {
        let slot = self.reserve(identity, Tag::Object)?;
        let props = obj.own_enumerable_properties();
        let mut entries = Vec::with_capacity(props.len());
        for (key, value) in props {
            let key = self.push(Record::String(key));
            let value = self.encode(&value)?;
            entries.push(Entry { key, value });
        }
        self.fill(slot, Record::Object(entries));
        Ok(slot)
    }

    /// Array-like containers: reserve, encode members in order, fill.
    fn encode_sequence(
        &mut self,
        identity: Identity,
        tag: Tag,
        items: &[Value],
        wrap: fn(Vec<SlotId>) -> Record,
    ) -> Result<SlotId, EncodeError> {
        let slot = self.reserve(identity, tag)?;
        let items = items
            .iter()
            .map(|item| self.encode(item))
            .collect::<Result<Vec<_>, _>>()?;
        self.fill(slot, wrap(items));
        Ok(slot)
    }

    fn encode_entries(&mut self, entries: &[(Value, Value)]) -> Result<Vec<Entry>, EncodeError> {
        entries
            .iter()
            .map(|(key, value)| {
                let key = self.encode(key)?;
                let value = self.encode(value)?;
                Ok(Entry { key, value })
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
