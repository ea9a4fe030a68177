//! Runtime values.
//!
//! # Construction
//!
//! Reference kinds are built through factory methods so the `Rc` wrapping
//! stays an implementation detail:
//!
//! ```text
//! let s = Value::string("hello");
//! let list = Value::array(vec![Value::number(1.0), Value::Null]);
//! let obj = Value::object([("a", Value::Boolean(true))]);
//! ```
//!
//! # Atoms vs references
//!
//! Atoms (`undefined`, `null`, booleans, numbers, bigints, strings) carry no
//! identity: [`Value::identity`] returns `None` and two equal atoms are
//! indistinguishable. Everything else is a handle whose identity is its
//! allocation.

mod equality;
mod function;
mod object;
mod render;
mod symbol;

use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;

pub use function::{Callable, Function, NativeFn};
pub use object::{
    ErrorData, Object, ObjectKind, RegExp, RegExpFlags, TypedArray, TypedArrayKind,
};
pub use symbol::Symbol;

/// Stable identity of a reference-bearing value within one traversal.
///
/// Derived from the handle's allocation address, so it is only meaningful
/// while the value is alive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identity(usize);

impl Identity {
    #[inline]
    pub(crate) fn of<T: ?Sized>(rc: &Rc<T>) -> Self {
        Identity(Rc::as_ptr(rc).cast::<()>() as usize)
    }
}

/// Host handle whose basic type lies outside the classification set.
///
/// Embeddings use this for values they can hold but the codec cannot
/// describe (weak references, foreign externrefs, ...).
#[derive(Clone)]
pub struct OpaqueRef(Rc<str>);

impl OpaqueRef {
    /// Wrap a host value reporting `type_name` as its basic type.
    pub fn new(type_name: impl Into<Rc<str>>) -> Self {
        OpaqueRef(type_name.into())
    }

    /// The basic type the host reports for this value.
    pub fn type_name(&self) -> &str {
        &self.0
    }

    pub fn identity(&self) -> Identity {
        Identity::of(&self.0)
    }
}

impl fmt::Debug for OpaqueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({})", self.type_name())
    }
}

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    // Atoms
    /// The absent value.
    Undefined,
    /// The null value.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// IEEE-754 double, including NaN, the infinities and negative zero.
    Number(f64),
    /// Arbitrary-precision integer.
    BigInt(BigInt),
    /// String value.
    String(String),

    // Reference kinds
    /// Unique symbol.
    Symbol(Symbol),
    /// Function handle.
    Function(Function),
    /// Object handle.
    Object(Object),
    /// Host value outside the classification set.
    Opaque(OpaqueRef),
}

// Factory Methods

impl Value {
    #[inline]
    pub fn number(n: f64) -> Self {
        Value::Number(n)
    }

    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    #[inline]
    pub fn bigint(n: impl Into<BigInt>) -> Self {
        Value::BigInt(n.into())
    }

    /// Create a fresh symbol with the given description.
    pub fn symbol(description: impl Into<String>) -> Self {
        Value::Symbol(Symbol::new(Some(description.into())))
    }

    /// Create a plain object from `(key, value)` pairs, in order.
    ///
    /// ```text
    /// let point = Value::object([("x", Value::number(1.0)), ("y", Value::number(2.0))]);
    /// ```
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let props = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::Object(Object::new(ObjectKind::Ordinary(props)))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Object(Object::new(ObjectKind::Array(items)))
    }

    /// Create a map; later duplicates of a key overwrite earlier ones.
    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        let obj = Object::new(ObjectKind::Map(Vec::new()));
        for (k, v) in entries {
            obj.map_insert(k, v);
        }
        Value::Object(obj)
    }

    /// Create a set; duplicates (by SameValueZero) are dropped.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        let obj = Object::new(ObjectKind::Set(Vec::new()));
        for v in items {
            obj.set_insert(v);
        }
        Value::Object(obj)
    }

    /// Create a date from epoch milliseconds (NaN is an invalid date).
    pub fn date(epoch_ms: f64) -> Self {
        Value::Object(Object::new(ObjectKind::Date(epoch_ms)))
    }

    pub fn regexp(source: impl Into<String>, flags: RegExpFlags) -> Self {
        Value::Object(Object::new(ObjectKind::RegExp(RegExp::new(source, flags))))
    }

    pub fn error(data: ErrorData) -> Self {
        Value::Object(Object::new(ObjectKind::Error(data)))
    }

    pub fn array_buffer(bytes: Vec<u8>) -> Self {
        Value::Object(Object::new(ObjectKind::ArrayBuffer(bytes)))
    }

    /// Create a typed view; elements are coerced to the view's element type.
    pub fn typed_array(kind: TypedArrayKind, elements: &[f64]) -> Self {
        Value::Object(Object::new(ObjectKind::TypedArray(TypedArray::new(
            kind, elements,
        ))))
    }

    pub fn dom_node(node: crate::DomNode) -> Self {
        Value::Object(Object::new(ObjectKind::Node(node)))
    }

    pub fn node_list(nodes: Vec<Value>) -> Self {
        Value::Object(Object::new(ObjectKind::NodeList(nodes)))
    }

    pub fn html_collection(nodes: Vec<Value>) -> Self {
        Value::Object(Object::new(ObjectKind::HtmlCollection(nodes)))
    }
}

// Value Methods

impl Value {
    /// The basic runtime type, as `typeof` reports it.
    pub fn type_of(&self) -> &str {
        match self {
            Value::Undefined => "undefined",
            Value::Null | Value::Object(_) => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Function(_) => "function",
            Value::Opaque(o) => o.type_name(),
        }
    }

    /// Identity of a reference kind, `None` for atoms.
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Value::Undefined
            | Value::Null
            | Value::Boolean(_)
            | Value::Number(_)
            | Value::BigInt(_)
            | Value::String(_) => None,
            Value::Symbol(s) => Some(s.identity()),
            Value::Function(f) => Some(f.identity()),
            Value::Object(o) => Some(o.identity()),
            Value::Opaque(o) => Some(o.identity()),
        }
    }

    /// `SameValueZero`: NaN equals NaN, `0` equals `-0`, references by identity.
    #[allow(clippy::float_cmp, reason = "SameValueZero is exact comparison")]
    pub fn same_value_zero(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => (a.is_nan() && b.is_nan()) || a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => match (self.identity(), other.identity()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Structural equality over the whole graph.
    ///
    /// Numbers compare with `Object.is` semantics (NaN equals NaN, `-0`
    /// differs from `0`). Cycles are tolerated: a pair of objects already
    /// under comparison is assumed equal.
    pub fn deep_equals(&self, other: &Value) -> bool {
        equality::deep_equals(self, other)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a property key the way plain-object assignment does.
    ///
    /// Symbols and reference kinds have no string key form here.
    pub fn to_property_key(&self) -> Option<String> {
        match self {
            Value::Undefined => Some("undefined".to_string()),
            Value::Null => Some("null".to_string()),
            Value::Boolean(b) => Some(b.to_string()),
            Value::Number(n) => Some(number_to_string(*n)),
            Value::BigInt(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::Symbol(_) | Value::Function(_) | Value::Object(_) | Value::Opaque(_) => None,
        }
    }
}

/// Number-to-string conversion used for property keys.
///
/// Shortest round-trip digits, positional between `1e-7` and `1e21` and
/// exponential outside. Both zeros print as `0`.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let Some((digits, point)) = shortest_digits(n.abs()) else {
        return n.to_string();
    };
    let sign = if n < 0.0 { "-" } else { "" };
    let len = i32::try_from(digits.len()).unwrap_or(i32::MAX);
    let body = if len <= point && point <= 21 {
        format!("{digits}{}", zeros(point - len))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(usize::try_from(point).unwrap_or(0));
        format!("{int}.{frac}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", zeros(-point))
    } else {
        let exponent = point - 1;
        let exponent_sign = if exponent < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        let dot = if rest.is_empty() { "" } else { "." };
        format!("{first}{dot}{rest}e{exponent_sign}{}", exponent.abs())
    };
    format!("{sign}{body}")
}

/// Decimal digits of a positive finite number and the position of the
/// decimal point relative to them (`0.00123` is `("123", -2)`).
fn shortest_digits(n: f64) -> Option<(String, i32)> {
    let text = format!("{n:e}");
    let (mantissa, exponent) = text.split_once('e')?;
    let exponent: i32 = exponent.parse().ok()?;
    let digits = mantissa.chars().filter(char::is_ascii_digit).collect();
    Some((digits, exponent + 1))
}

fn zeros(count: i32) -> String {
    "0".repeat(usize::try_from(count).unwrap_or(0))
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

impl From<Symbol> for Value {
    fn from(s: Symbol) -> Self {
        Value::Symbol(s)
    }
}

// Trait Implementations

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::Number(n) => write!(f, "Number({n:?})"),
            Value::BigInt(n) => write!(f, "BigInt({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Symbol(s) => write!(f, "{s:?}"),
            Value::Function(func) => write!(f, "{func:?}"),
            // Object contents may be cyclic; Debug stays shallow.
            Value::Object(o) => write!(f, "Object({})", o.kind_name()),
            Value::Opaque(o) => write!(f, "{o:?}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render::Renderer::default().write_value(f, self)
    }
}
