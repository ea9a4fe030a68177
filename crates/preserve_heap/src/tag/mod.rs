//! Record kind tag.
//!
//! Every heap record carries a `Tag` naming its kind. The tag string is part
//! of the wire format and must match other producers exactly.
//!
//! # Tag Categories
//!
//! - 0-15: Primitives (never deduplicated, payload is the value itself)
//! - 16-31: Reference leaves (deduplicated by identity, no outgoing slots)
//! - 32-47: Containers (deduplicated, payload holds slot references)

use std::fmt;

/// Record kind discriminant.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Tag {
    // === Primitives (0-15) ===
    /// The absent value; payload `""`.
    Undefined = 0,
    /// Null; payload `""`.
    Null = 1,
    /// Boolean; payload is the boolean.
    Boolean = 2,
    /// Finite number other than negative zero.
    Number = 3,
    /// String; payload is the string.
    String = 4,
    /// Not-a-number; payload `""`.
    Nan = 5,
    /// Signed infinity; payload `"+"` or `"-"`.
    Infinity = 6,
    /// Negative zero; payload `""`.
    NegZero = 7,
    /// Big integer; payload is the decimal string.
    BigInt = 8,

    // Reserved: 9-15 for future primitives

    // === Reference leaves (16-31) ===
    /// Symbol; payload is its description.
    Symbol = 16,
    /// Date; payload is the epoch-millisecond time value.
    Date = 17,
    /// Regular expression; payload `{src, flags}`.
    RegExp = 18,
    /// Error; payload `{name, message, stack?}`.
    Error = 19,
    /// Byte buffer; payload is the signed byte sequence.
    ArrayBuffer = 20,
    /// Typed view; payload `{ctor, viewArr}`.
    TypedArray = 21,
    /// Function metadata; payload `{name, body, proto}`.
    Function = 22,
    /// DOM node; payload is its serialized text.
    DomNode = 23,

    // === Containers (32-47) ===
    /// Array; payload is a slot sequence.
    Array = 32,
    /// Plain object; payload `[{key, value}]`.
    Object = 33,
    /// Map; payload `[{key, value}]`.
    Map = 34,
    /// Set; payload `[{value}]`.
    Set = 35,
    /// Node list; payload is a slot sequence.
    NodeList = 36,
    /// HTML collection; payload is a slot sequence.
    HtmlCollection = 37,
}

impl Tag {
    /// Every tag, in discriminant order.
    pub const ALL: [Tag; 23] = [
        Tag::Undefined,
        Tag::Null,
        Tag::Boolean,
        Tag::Number,
        Tag::String,
        Tag::Nan,
        Tag::Infinity,
        Tag::NegZero,
        Tag::BigInt,
        Tag::Symbol,
        Tag::Date,
        Tag::RegExp,
        Tag::Error,
        Tag::ArrayBuffer,
        Tag::TypedArray,
        Tag::Function,
        Tag::DomNode,
        Tag::Array,
        Tag::Object,
        Tag::Map,
        Tag::Set,
        Tag::NodeList,
        Tag::HtmlCollection,
    ];

    /// Primitive records are never shared between occurrences.
    #[inline]
    pub const fn is_primitive(self) -> bool {
        (self as u8) < 16
    }

    /// Records produced from identity-bearing values.
    #[inline]
    pub const fn is_reference(self) -> bool {
        (self as u8) >= 16
    }

    /// Records whose payload references other slots.
    #[inline]
    pub const fn is_container(self) -> bool {
        let v = self as u8;
        v >= 32 && v < 48
    }

    /// Wire name of this tag.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Nan => "nan",
            Self::Infinity => "infinity",
            Self::NegZero => "neg0",
            Self::BigInt => "bigint",
            Self::Symbol => "symbol",
            Self::Date => "date",
            Self::RegExp => "regexp",
            Self::Error => "error",
            Self::ArrayBuffer => "arraybuffer",
            Self::TypedArray => "typedarray",
            Self::Function => "function",
            Self::DomNode => "domnode",
            Self::Array => "array",
            Self::Object => "object",
            Self::Map => "map",
            Self::Set => "set",
            Self::NodeList => "nodelist",
            Self::HtmlCollection => "htmlcollection",
        }
    }

    /// Parse a wire name; `None` for anything outside the closed set.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.name() == name)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag::{}", self.name())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Compile-time size assertion: Tag must be exactly 1 byte
const _: () = assert!(std::mem::size_of::<Tag>() == 1);

#[cfg(test)]
mod tests;
