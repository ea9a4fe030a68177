//! Records and their payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::number;
use crate::{SlotId, Tag};

/// Sign of an infinity record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sign {
    #[serde(rename = "+")]
    Positive,
    #[serde(rename = "-")]
    Negative,
}

impl Sign {
    pub fn of(n: f64) -> Self {
        if n.is_sign_negative() {
            Sign::Negative
        } else {
            Sign::Positive
        }
    }

    pub fn infinity(self) -> f64 {
        match self {
            Sign::Positive => f64::INFINITY,
            Sign::Negative => f64::NEG_INFINITY,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sign::Positive => "+",
            Sign::Negative => "-",
        }
    }
}

/// `{key, value}` pair of slot references.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub key: SlotId,
    pub value: SlotId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegExpPayload {
    #[serde(rename = "src")]
    pub source: String,
    pub flags: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// A typed view: its constructor name and its elements as numbers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypedArrayPayload {
    pub ctor: String,
    #[serde(
        rename = "viewArr",
        serialize_with = "number::serialize_seq",
        deserialize_with = "number::deserialize_seq"
    )]
    pub elements: Vec<f64>,
}

/// Introspectable function metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionPayload {
    pub name: String,
    /// Source text.
    pub body: String,
    /// Constructor name (`Function`, `AsyncFunction`, ...).
    pub proto: String,
}

/// One heap record: a tag and its payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    Undefined,
    Null,
    Boolean(bool),
    /// Finite and not negative zero.
    Number(f64),
    String(String),
    Nan,
    Infinity(Sign),
    NegZero,
    /// Decimal text of a big integer.
    BigInt(String),
    /// Description; `None` for a symbol created without one.
    Symbol(Option<String>),
    /// Epoch milliseconds; NaN for an invalid date.
    Date(f64),
    RegExp(RegExpPayload),
    Error(ErrorPayload),
    ArrayBuffer(Vec<i8>),
    TypedArray(TypedArrayPayload),
    Function(FunctionPayload),
    /// Serialized node text.
    DomNode(String),
    Array(Vec<SlotId>),
    Object(Vec<Entry>),
    Map(Vec<Entry>),
    /// Member slots; the wire form wraps each in `{value}`.
    Set(Vec<SlotId>),
    NodeList(Vec<SlotId>),
    HtmlCollection(Vec<SlotId>),
}

impl Record {
    pub fn tag(&self) -> Tag {
        match self {
            Record::Undefined => Tag::Undefined,
            Record::Null => Tag::Null,
            Record::Boolean(_) => Tag::Boolean,
            Record::Number(_) => Tag::Number,
            Record::String(_) => Tag::String,
            Record::Nan => Tag::Nan,
            Record::Infinity(_) => Tag::Infinity,
            Record::NegZero => Tag::NegZero,
            Record::BigInt(_) => Tag::BigInt,
            Record::Symbol(_) => Tag::Symbol,
            Record::Date(_) => Tag::Date,
            Record::RegExp(_) => Tag::RegExp,
            Record::Error(_) => Tag::Error,
            Record::ArrayBuffer(_) => Tag::ArrayBuffer,
            Record::TypedArray(_) => Tag::TypedArray,
            Record::Function(_) => Tag::Function,
            Record::DomNode(_) => Tag::DomNode,
            Record::Array(_) => Tag::Array,
            Record::Object(_) => Tag::Object,
            Record::Map(_) => Tag::Map,
            Record::Set(_) => Tag::Set,
            Record::NodeList(_) => Tag::NodeList,
            Record::HtmlCollection(_) => Tag::HtmlCollection,
        }
    }

    /// Record for a number, partitioned by edge case.
    pub fn number(n: f64) -> Self {
        if n.is_nan() {
            Record::Nan
        } else if n.is_infinite() {
            Record::Infinity(Sign::of(n))
        } else if number::is_negative_zero(n) {
            Record::NegZero
        } else {
            Record::Number(n)
        }
    }

    /// Empty container record of the given tag, for reserving a slot before
    /// its children are known. `None` for non-container tags.
    pub fn empty_container(tag: Tag) -> Option<Self> {
        Some(match tag {
            Tag::Array => Record::Array(Vec::new()),
            Tag::Object => Record::Object(Vec::new()),
            Tag::Map => Record::Map(Vec::new()),
            Tag::Set => Record::Set(Vec::new()),
            Tag::NodeList => Record::NodeList(Vec::new()),
            Tag::HtmlCollection => Record::HtmlCollection(Vec::new()),
            _ => return None,
        })
    }

    /// Outgoing slot references, in payload order.
    pub fn children(&self) -> Vec<SlotId> {
        match self {
            Record::Array(items)
            | Record::Set(items)
            | Record::NodeList(items)
            | Record::HtmlCollection(items) => items.clone(),
            Record::Object(entries) | Record::Map(entries) => entries
                .iter()
                .flat_map(|e| [e.key, e.value])
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// One-line payload summary, as `inspect` prints it.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Undefined | Record::Null | Record::Nan | Record::NegZero => Ok(()),
            Record::Boolean(b) => write!(f, "{b}"),
            Record::Number(n) => write!(f, "{n}"),
            Record::String(s) | Record::DomNode(s) => write!(f, "{s:?}"),
            Record::Infinity(sign) => f.write_str(sign.as_str()),
            Record::BigInt(text) => write!(f, "{text}n"),
            Record::Symbol(Some(desc)) => write!(f, "Symbol({desc})"),
            Record::Symbol(None) => f.write_str("Symbol()"),
            Record::Date(ms) if ms.is_nan() => f.write_str("invalid"),
            Record::Date(ms) => write!(f, "{ms}"),
            Record::RegExp(re) => write!(f, "/{}/{}", re.source, re.flags),
            Record::Error(err) => write!(f, "{}: {:?}", err.name, err.message),
            Record::ArrayBuffer(bytes) => write!(f, "{} bytes", bytes.len()),
            Record::TypedArray(view) => write!(f, "{}({})", view.ctor, view.elements.len()),
            Record::Function(func) if func.name.is_empty() => {
                write!(f, "{} (anonymous)", func.proto)
            }
            Record::Function(func) => write!(f, "{} {}", func.proto, func.name),
            Record::Array(items)
            | Record::Set(items)
            | Record::NodeList(items)
            | Record::HtmlCollection(items) => write_slots(f, items),
            Record::Object(entries) | Record::Map(entries) => {
                f.write_str("{")?;
                for (i, e) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, " {}: {}", e.key, e.value)?;
                }
                f.write_str(if entries.is_empty() { "}" } else { " }" })
            }
        }
    }
}

fn write_slots(f: &mut fmt::Formatter<'_>, items: &[SlotId]) -> fmt::Result {
    f.write_str("[")?;
    for (i, slot) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{slot}")?;
    }
    f.write_str("]")
}

/// Wire form of a `set` entry; a `key` field, if present, is ignored.
#[derive(Serialize, Deserialize)]
pub(crate) struct SetEntry {
    pub value: SlotId,
}
