//! Object handles and their internal slots.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::mem;
use std::rc::Rc;

use bitflags::bitflags;

use super::{Identity, Value};
use crate::DomNode;

/// The internal slot of an object: what kind of object it is, and its data.
#[derive(Clone)]
pub enum ObjectKind {
    /// Plain object with own enumerable string-keyed properties, in order.
    Ordinary(Vec<(String, Value)>),
    /// Array elements.
    Array(Vec<Value>),
    /// Map entries in insertion order, keys unique by SameValueZero.
    Map(Vec<(Value, Value)>),
    /// Set members in insertion order, unique by SameValueZero.
    Set(Vec<Value>),
    /// Date time value in epoch milliseconds; NaN for an invalid date.
    Date(f64),
    RegExp(RegExp),
    Error(ErrorData),
    /// Raw byte buffer.
    ArrayBuffer(Vec<u8>),
    TypedArray(TypedArray),
    /// DOM node; text conversion goes through the realm's `DomCodec`.
    Node(DomNode),
    NodeList(Vec<Value>),
    HtmlCollection(Vec<Value>),
}

impl ObjectKind {
    /// Short kind name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Ordinary(_) => "object",
            ObjectKind::Array(_) => "array",
            ObjectKind::Map(_) => "map",
            ObjectKind::Set(_) => "set",
            ObjectKind::Date(_) => "date",
            ObjectKind::RegExp(_) => "regexp",
            ObjectKind::Error(_) => "error",
            ObjectKind::ArrayBuffer(_) => "arraybuffer",
            ObjectKind::TypedArray(_) => "typedarray",
            ObjectKind::Node(_) => "domnode",
            ObjectKind::NodeList(_) => "nodelist",
            ObjectKind::HtmlCollection(_) => "htmlcollection",
        }
    }

    /// Move out every value this slot holds, leaving the containers empty.
    fn take_values(&mut self) -> Vec<Value> {
        match self {
            ObjectKind::Ordinary(props) => mem::take(props).into_iter().map(|(_, v)| v).collect(),
            ObjectKind::Array(items)
            | ObjectKind::Set(items)
            | ObjectKind::NodeList(items)
            | ObjectKind::HtmlCollection(items) => mem::take(items),
            ObjectKind::Map(entries) => mem::take(entries)
                .into_iter()
                .flat_map(|(k, v)| [k, v])
                .collect(),
            ObjectKind::Date(_)
            | ObjectKind::RegExp(_)
            | ObjectKind::Error(_)
            | ObjectKind::ArrayBuffer(_)
            | ObjectKind::TypedArray(_)
            | ObjectKind::Node(_) => Vec::new(),
        }
    }
}

/// Shared, mutable object handle.
///
/// Clones share the allocation; identity is the allocation address.
#[derive(Clone)]
pub struct Object(Rc<RefCell<ObjectKind>>);

impl Object {
    pub fn new(kind: ObjectKind) -> Self {
        Object(Rc::new(RefCell::new(kind)))
    }

    #[inline]
    pub fn borrow(&self) -> Ref<'_, ObjectKind> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, ObjectKind> {
        self.0.borrow_mut()
    }

    #[inline]
    pub fn identity(&self) -> Identity {
        Identity::of(&self.0)
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn kind_name(&self) -> &'static str {
        self.borrow().name()
    }

    /// Read an own property of a plain object.
    pub fn get_property(&self, key: &str) -> Option<Value> {
        match &*self.borrow() {
            ObjectKind::Ordinary(props) => {
                props.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
            }
            _ => None,
        }
    }

    /// Assign an own property of a plain object, overwriting in place.
    ///
    /// Returns `false` if this is not a plain object.
    pub fn set_property(&self, key: impl Into<String>, value: Value) -> bool {
        let key = key.into();
        match &mut *self.borrow_mut() {
            ObjectKind::Ordinary(props) => {
                if let Some(slot) = props.iter_mut().find(|(k, _)| *k == key) {
                    slot.1 = value;
                } else {
                    props.push((key, value));
                }
                true
            }
            _ => false,
        }
    }

    /// Append to an array or node collection.
    pub fn push(&self, value: Value) -> bool {
        match &mut *self.borrow_mut() {
            ObjectKind::Array(items)
            | ObjectKind::NodeList(items)
            | ObjectKind::HtmlCollection(items) => {
                items.push(value);
                true
            }
            _ => false,
        }
    }

    /// Element `index` of an array or node collection.
    pub fn element(&self, index: usize) -> Option<Value> {
        match &*self.borrow() {
            ObjectKind::Array(items)
            | ObjectKind::NodeList(items)
            | ObjectKind::HtmlCollection(items) => items.get(index).cloned(),
            _ => None,
        }
    }

    /// `Map.prototype.set`: overwrite the value of an existing key.
    pub fn map_insert(&self, key: Value, value: Value) -> bool {
        match &mut *self.borrow_mut() {
            ObjectKind::Map(entries) => {
                if let Some(entry) = entries.iter_mut().find(|(k, _)| k.same_value_zero(&key)) {
                    entry.1 = value;
                } else {
                    entries.push((normalize_zero(key), value));
                }
                true
            }
            _ => false,
        }
    }

    /// `Map.prototype.get`.
    pub fn map_get(&self, key: &Value) -> Option<Value> {
        match &*self.borrow() {
            ObjectKind::Map(entries) => entries
                .iter()
                .find(|(k, _)| k.same_value_zero(key))
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    /// `Set.prototype.add`: no-op for a member already present.
    pub fn set_insert(&self, value: Value) -> bool {
        match &mut *self.borrow_mut() {
            ObjectKind::Set(items) => {
                if !items.iter().any(|v| v.same_value_zero(&value)) {
                    items.push(normalize_zero(value));
                }
                true
            }
            _ => false,
        }
    }

    /// Number of elements, entries, members or properties.
    pub fn len(&self) -> usize {
        match &*self.borrow() {
            ObjectKind::Ordinary(props) => props.len(),
            ObjectKind::Array(items)
            | ObjectKind::Set(items)
            | ObjectKind::NodeList(items)
            | ObjectKind::HtmlCollection(items) => items.len(),
            ObjectKind::Map(entries) => entries.len(),
            ObjectKind::ArrayBuffer(bytes) => bytes.len(),
            ObjectKind::TypedArray(view) => view.elements().len(),
            ObjectKind::Date(_)
            | ObjectKind::RegExp(_)
            | ObjectKind::Error(_)
            | ObjectKind::Node(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// What a `for..in` walk filtered by `hasOwnProperty` yields.
    ///
    /// Plain objects yield their properties; index-addressable kinds yield
    /// `"0"`, `"1"`, ... Everything else keeps its state in internal slots
    /// and yields nothing.
    pub fn own_enumerable_properties(&self) -> Vec<(String, Value)> {
        match &*self.borrow() {
            ObjectKind::Ordinary(props) => props.clone(),
            ObjectKind::Array(items)
            | ObjectKind::NodeList(items)
            | ObjectKind::HtmlCollection(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v.clone()))
                .collect(),
            ObjectKind::TypedArray(view) => view
                .elements()
                .iter()
                .enumerate()
                .map(|(i, n)| (i.to_string(), Value::Number(*n)))
                .collect(),
            ObjectKind::Map(_)
            | ObjectKind::Set(_)
            | ObjectKind::Date(_)
            | ObjectKind::RegExp(_)
            | ObjectKind::Error(_)
            | ObjectKind::ArrayBuffer(_)
            | ObjectKind::Node(_) => Vec::new(),
        }
    }
}

/// Keyed collections store `-0` as `+0`.
fn normalize_zero(value: Value) -> Value {
    match value {
        Value::Number(n) if n == 0.0 => Value::Number(0.0),
        other => other,
    }
}

/// Tears down uniquely owned descendants with a worklist, so dropping a deep
/// graph does not recurse once per level.
impl Drop for Object {
    fn drop(&mut self) {
        if Rc::strong_count(&self.0) != 1 {
            return;
        }
        let Ok(mut kind) = self.0.try_borrow_mut() else {
            return;
        };
        let mut pending = kind.take_values();
        drop(kind);
        while let Some(value) = pending.pop() {
            if let Value::Object(child) = value {
                if Rc::strong_count(&child.0) == 1 {
                    if let Ok(mut kind) = child.0.try_borrow_mut() {
                        pending.extend(kind.take_values());
                    }
                }
            }
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.kind_name())
    }
}

// RegExp

bitflags! {
    /// Regular expression flags.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RegExpFlags: u8 {
        const HAS_INDICES = 1 << 0;
        const GLOBAL = 1 << 1;
        const IGNORE_CASE = 1 << 2;
        const MULTILINE = 1 << 3;
        const DOT_ALL = 1 << 4;
        const UNICODE = 1 << 5;
        const UNICODE_SETS = 1 << 6;
        const STICKY = 1 << 7;
    }
}

/// Flag letters in canonical (`RegExp.prototype.flags`) order.
const FLAG_LETTERS: [(char, RegExpFlags); 8] = [
    ('d', RegExpFlags::HAS_INDICES),
    ('g', RegExpFlags::GLOBAL),
    ('i', RegExpFlags::IGNORE_CASE),
    ('m', RegExpFlags::MULTILINE),
    ('s', RegExpFlags::DOT_ALL),
    ('u', RegExpFlags::UNICODE),
    ('v', RegExpFlags::UNICODE_SETS),
    ('y', RegExpFlags::STICKY),
];

impl RegExpFlags {
    /// Parse a flags string; `None` on an unknown or repeated letter.
    pub fn parse(text: &str) -> Option<Self> {
        let mut flags = RegExpFlags::empty();
        for c in text.chars() {
            let (_, flag) = FLAG_LETTERS.iter().find(|(letter, _)| *letter == c)?;
            if flags.contains(*flag) {
                return None;
            }
            flags |= *flag;
        }
        // `u` and `v` are mutually exclusive.
        if flags.contains(RegExpFlags::UNICODE | RegExpFlags::UNICODE_SETS) {
            return None;
        }
        Some(flags)
    }

    /// Canonical flags string.
    pub fn to_flag_string(self) -> String {
        FLAG_LETTERS
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(letter, _)| *letter)
            .collect()
    }
}

/// A regular expression: pattern source and flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegExp {
    pub source: String,
    pub flags: RegExpFlags,
}

impl RegExp {
    pub fn new(source: impl Into<String>, flags: RegExpFlags) -> Self {
        RegExp {
            source: source.into(),
            flags,
        }
    }
}

impl fmt::Display for RegExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags.to_flag_string())
    }
}

// Error

/// Error object state.
///
/// `constructor` is the class the error was created from (what instanceof
/// sees); `name` is the observable `name` property, which usually matches
/// but can be patched independently.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorData {
    pub constructor: String,
    pub name: String,
    pub message: String,
    pub stack: Option<String>,
}

impl ErrorData {
    /// Create an error of class `constructor` with a matching `name`.
    pub fn new(constructor: impl Into<String>, message: impl Into<String>) -> Self {
        let constructor = constructor.into();
        ErrorData {
            name: constructor.clone(),
            constructor,
            message: message.into(),
            stack: None,
        }
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

// Typed arrays

/// The fixed-width numeric view kinds, in classification order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypedArrayKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl TypedArrayKind {
    /// All kinds in the order the encoder tests them.
    pub const ALL: [TypedArrayKind; 9] = [
        TypedArrayKind::Int8,
        TypedArrayKind::Uint8,
        TypedArrayKind::Uint8Clamped,
        TypedArrayKind::Int16,
        TypedArrayKind::Uint16,
        TypedArrayKind::Int32,
        TypedArrayKind::Uint32,
        TypedArrayKind::Float32,
        TypedArrayKind::Float64,
    ];

    /// Constructor name, e.g. `"Uint8ClampedArray"`.
    pub const fn name(self) -> &'static str {
        match self {
            TypedArrayKind::Int8 => "Int8Array",
            TypedArrayKind::Uint8 => "Uint8Array",
            TypedArrayKind::Uint8Clamped => "Uint8ClampedArray",
            TypedArrayKind::Int16 => "Int16Array",
            TypedArrayKind::Uint16 => "Uint16Array",
            TypedArrayKind::Int32 => "Int32Array",
            TypedArrayKind::Uint32 => "Uint32Array",
            TypedArrayKind::Float32 => "Float32Array",
            TypedArrayKind::Float64 => "Float64Array",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Bytes per element.
    pub const fn element_size(self) -> usize {
        match self {
            TypedArrayKind::Int8 | TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => 1,
            TypedArrayKind::Int16 | TypedArrayKind::Uint16 => 2,
            TypedArrayKind::Int32 | TypedArrayKind::Uint32 | TypedArrayKind::Float32 => 4,
            TypedArrayKind::Float64 => 8,
        }
    }

    /// Convert an arbitrary number to this view's element type.
    pub fn coerce(self, n: f64) -> f64 {
        match self {
            TypedArrayKind::Int8 => wrap_integer(n, 8, true),
            TypedArrayKind::Uint8 => wrap_integer(n, 8, false),
            TypedArrayKind::Uint8Clamped => clamp_uint8(n),
            TypedArrayKind::Int16 => wrap_integer(n, 16, true),
            TypedArrayKind::Uint16 => wrap_integer(n, 16, false),
            TypedArrayKind::Int32 => wrap_integer(n, 32, true),
            TypedArrayKind::Uint32 => wrap_integer(n, 32, false),
            TypedArrayKind::Float32 => round_to_f32(n),
            TypedArrayKind::Float64 => n,
        }
    }
}

impl fmt::Display for TypedArrayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Modular integer conversion (`ToInt8`, `ToUint16`, ...).
fn wrap_integer(n: f64, bits: i32, signed: bool) -> f64 {
    if !n.is_finite() {
        return 0.0;
    }
    let modulus = 2f64.powi(bits);
    let mut wrapped = n.trunc().rem_euclid(modulus);
    if signed && wrapped >= modulus / 2.0 {
        wrapped -= modulus;
    }
    // rem_euclid of -0 is -0; integer views have no negative zero.
    wrapped + 0.0
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "narrowing to f32 is the element conversion"
)]
fn round_to_f32(n: f64) -> f64 {
    f64::from(n as f32)
}

/// `ToUint8Clamp`: clamp to 0..=255, ties to even.
fn clamp_uint8(n: f64) -> f64 {
    if n.is_nan() || n <= 0.0 {
        return 0.0;
    }
    if n >= 255.0 {
        return 255.0;
    }
    let floor = n.floor();
    let diff = n - floor;
    if diff < 0.5 {
        floor
    } else if diff > 0.5 || floor % 2.0 != 0.0 {
        floor + 1.0
    } else {
        floor
    }
}

/// A fixed-width numeric view with its element values.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedArray {
    kind: TypedArrayKind,
    elements: Vec<f64>,
}

impl TypedArray {
    /// Build a view, coercing each element to the view's type.
    pub fn new(kind: TypedArrayKind, elements: &[f64]) -> Self {
        TypedArray {
            kind,
            elements: elements.iter().map(|n| kind.coerce(*n)).collect(),
        }
    }

    pub fn kind(&self) -> TypedArrayKind {
        self.kind
    }

    pub fn elements(&self) -> &[f64] {
        &self.elements
    }

    /// Length of the underlying buffer in bytes.
    pub fn byte_length(&self) -> usize {
        self.elements.len() * self.kind.element_size()
    }
}
