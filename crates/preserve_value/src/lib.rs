//! Runtime value model for the preserve heap codec.
//!
//! This crate provides:
//!
//! - **Values** ([`Value`]): the closed set of runtime kinds the codec
//!   understands: the primitive atoms, identity-bearing [`Symbol`] and
//!   [`Function`] handles, and [`Object`] handles whose internal slot
//!   ([`ObjectKind`]) is a plain object, array, map, set, date, regexp,
//!   error, byte buffer, typed view, DOM node or node collection.
//!
//! - **Realm** ([`Environment`], [`Constructor`], [`Realm`]): the registry of
//!   well-known constructors used for instanceof-style classification when
//!   encoding and for instantiation when decoding.
//!
//! - **DOM codec seam** ([`DomCodec`], [`DomNode`], [`XmlCodec`]): the text
//!   serializer/parser pair a realm supplies for DOM nodes.
//!
//! # Identity
//!
//! Reference kinds are `Rc` handles. Cloning a [`Value`] clones the handle,
//! so two clones of one object are the *same* object ([`Value::identity`]
//! agrees). Cycles built through `RefCell` mutation are ordinary `Rc`
//! cycles and stay alive until the caller breaks them.

pub mod dom;
pub mod realm;
mod value;

pub use dom::{DomCodec, DomError, DomNode, Element, XmlCodec};
pub use realm::{Constructor, Environment, Realm, RealmBuilder, CLASSIFICATION_ORDER};
pub use value::{
    number_to_string, Callable, ErrorData, Function, Identity, NativeFn, Object, ObjectKind,
    OpaqueRef, RegExp, RegExpFlags, Symbol, TypedArray, TypedArrayKind, Value,
};

// Re-export so downstream crates name one bigint type.
pub use num_bigint::BigInt;
