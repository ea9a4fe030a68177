//! The environment collaborator: constructor registry and DOM codec.
//!
//! The encoder asks the environment "is this object an instance of `Map`?"
//! for each well-known constructor in [`CLASSIFICATION_ORDER`]; the decoder
//! asks it for constructors by name to rebuild errors and typed views. A
//! realm missing a constructor changes classification on encode and
//! triggers a fallback on decode, exactly like running in a host that lacks
//! the binding.
//!
//! [`Realm`] is the standard implementation; [`RealmBuilder`] configures it.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::dom::{DomCodec, XmlCodec};
use crate::value::{ErrorData, Object, ObjectKind, TypedArray, TypedArrayKind};

/// Constructor names the encoder tests, in priority order. First match wins.
///
/// An error also passes a generic object test, a typed view is also
/// index-addressable; the order keeps the more specific kinds first.
pub const CLASSIFICATION_ORDER: [&str; 19] = [
    "Map",
    "Set",
    "Date",
    "RegExp",
    "Error",
    "ArrayBuffer",
    "Int8Array",
    "Uint8Array",
    "Uint8ClampedArray",
    "Int16Array",
    "Uint16Array",
    "Int32Array",
    "Uint32Array",
    "Float32Array",
    "Float64Array",
    "Array",
    "Node",
    "NodeList",
    "HTMLCollection",
];

/// Error subclasses present in a standard realm.
pub const STANDARD_ERROR_CLASSES: [&str; 7] = [
    "EvalError",
    "RangeError",
    "ReferenceError",
    "SyntaxError",
    "TypeError",
    "URIError",
    "AggregateError",
];

/// A well-known constructor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Constructor {
    Map,
    Set,
    Date,
    RegExp,
    /// `Error` itself or one of its subclasses.
    Error {
        name: String,
    },
    ArrayBuffer,
    TypedArray(TypedArrayKind),
    Array,
    Node,
    NodeList,
    HtmlCollection,
}

impl Constructor {
    pub fn error(name: impl Into<String>) -> Self {
        Constructor::Error { name: name.into() }
    }

    /// The global binding name.
    pub fn name(&self) -> &str {
        match self {
            Constructor::Map => "Map",
            Constructor::Set => "Set",
            Constructor::Date => "Date",
            Constructor::RegExp => "RegExp",
            Constructor::Error { name } => name,
            Constructor::ArrayBuffer => "ArrayBuffer",
            Constructor::TypedArray(kind) => kind.name(),
            Constructor::Array => "Array",
            Constructor::Node => "Node",
            Constructor::NodeList => "NodeList",
            Constructor::HtmlCollection => "HTMLCollection",
        }
    }

    /// The instanceof test.
    ///
    /// Base `Error` accepts every error; a subclass accepts errors created
    /// from it.
    pub fn has_instance(&self, object: &ObjectKind) -> bool {
        match (self, object) {
            (Constructor::Map, ObjectKind::Map(_))
            | (Constructor::Set, ObjectKind::Set(_))
            | (Constructor::Date, ObjectKind::Date(_))
            | (Constructor::RegExp, ObjectKind::RegExp(_))
            | (Constructor::ArrayBuffer, ObjectKind::ArrayBuffer(_))
            | (Constructor::Array, ObjectKind::Array(_))
            | (Constructor::Node, ObjectKind::Node(_))
            | (Constructor::NodeList, ObjectKind::NodeList(_))
            | (Constructor::HtmlCollection, ObjectKind::HtmlCollection(_)) => true,
            (Constructor::Error { name }, ObjectKind::Error(err)) => {
                name == "Error" || *name == err.constructor
            }
            (Constructor::TypedArray(kind), ObjectKind::TypedArray(view)) => *kind == view.kind(),
            _ => false,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Constructor::Error { .. })
    }

    /// `new Ctor(message)` for an error constructor.
    pub fn construct_error(&self, message: &str, stack: Option<String>) -> Option<Object> {
        let Constructor::Error { name } = self else {
            return None;
        };
        let mut data = ErrorData::new(name.clone(), message);
        data.stack = stack;
        Some(Object::new(ObjectKind::Error(data)))
    }

    /// `new Ctor(elements)` for a typed view constructor.
    pub fn construct_typed_array(&self, elements: &[f64]) -> Option<Object> {
        let Constructor::TypedArray(kind) = self else {
            return None;
        };
        Some(Object::new(ObjectKind::TypedArray(TypedArray::new(
            *kind, elements,
        ))))
    }
}

impl fmt::Display for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Collaborator the heap codec consults for classification, instantiation
/// and DOM text conversion.
pub trait Environment {
    /// Look up a global constructor binding by name.
    fn constructor(&self, name: &str) -> Option<&Constructor>;

    /// The DOM serializer/parser pair, if this environment has a DOM.
    fn dom_codec(&self) -> Option<&dyn DomCodec>;
}

impl<E: Environment + ?Sized> Environment for &E {
    fn constructor(&self, name: &str) -> Option<&Constructor> {
        (**self).constructor(name)
    }

    fn dom_codec(&self) -> Option<&dyn DomCodec> {
        (**self).dom_codec()
    }
}

/// Standard environment: a constructor registry plus an optional DOM codec.
#[derive(Clone)]
pub struct Realm {
    constructors: FxHashMap<String, Constructor>,
    dom: Option<Rc<dyn DomCodec>>,
}

impl Realm {
    /// Every well-known constructor, the standard error subclasses and the
    /// XML DOM codec.
    pub fn standard() -> Self {
        RealmBuilder::standard().build()
    }

    /// Containers and base kinds only: no typed views, no error subclasses,
    /// no DOM codec.
    pub fn minimal() -> Self {
        let mut builder = RealmBuilder::empty();
        for ctor in [
            Constructor::Map,
            Constructor::Set,
            Constructor::Date,
            Constructor::RegExp,
            Constructor::error("Error"),
            Constructor::ArrayBuffer,
            Constructor::Array,
            Constructor::Node,
            Constructor::NodeList,
            Constructor::HtmlCollection,
        ] {
            builder = builder.with_constructor(ctor);
        }
        builder.build()
    }

    /// Start from the standard realm.
    pub fn builder() -> RealmBuilder {
        RealmBuilder::standard()
    }

    /// Registered constructor names, sorted.
    pub fn constructor_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for Realm {
    fn default() -> Self {
        Self::standard()
    }
}

impl Environment for Realm {
    fn constructor(&self, name: &str) -> Option<&Constructor> {
        self.constructors.get(name)
    }

    fn dom_codec(&self) -> Option<&dyn DomCodec> {
        self.dom.as_deref()
    }
}

impl fmt::Debug for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Realm")
            .field("constructors", &self.constructor_names())
            .field("dom", &self.dom.is_some())
            .finish()
    }
}

/// Builder for [`Realm`].
///
/// ```text
/// let realm = Realm::builder()
///     .without("Map")
///     .with_error_class("ValidationError")
///     .without_dom_codec()
///     .build();
/// ```
#[must_use]
pub struct RealmBuilder {
    constructors: FxHashMap<String, Constructor>,
    dom: Option<Rc<dyn DomCodec>>,
}

impl RealmBuilder {
    /// No constructors, no DOM codec.
    pub fn empty() -> Self {
        RealmBuilder {
            constructors: FxHashMap::default(),
            dom: None,
        }
    }

    pub fn standard() -> Self {
        let mut builder = Self::empty();
        builder = builder
            .with_constructor(Constructor::Map)
            .with_constructor(Constructor::Set)
            .with_constructor(Constructor::Date)
            .with_constructor(Constructor::RegExp)
            .with_constructor(Constructor::error("Error"))
            .with_constructor(Constructor::ArrayBuffer)
            .with_constructor(Constructor::Array)
            .with_constructor(Constructor::Node)
            .with_constructor(Constructor::NodeList)
            .with_constructor(Constructor::HtmlCollection);
        for kind in TypedArrayKind::ALL {
            builder = builder.with_constructor(Constructor::TypedArray(kind));
        }
        for name in STANDARD_ERROR_CLASSES {
            builder = builder.with_error_class(name);
        }
        builder.with_dom_codec(XmlCodec)
    }

    /// Register (or replace) a constructor under its own name.
    pub fn with_constructor(mut self, ctor: Constructor) -> Self {
        self.constructors.insert(ctor.name().to_string(), ctor);
        self
    }

    /// Register an error subclass.
    pub fn with_error_class(self, name: impl Into<String>) -> Self {
        self.with_constructor(Constructor::error(name))
    }

    /// Remove a binding.
    pub fn without(mut self, name: &str) -> Self {
        self.constructors.remove(name);
        self
    }

    pub fn with_dom_codec(mut self, codec: impl DomCodec + 'static) -> Self {
        self.dom = Some(Rc::new(codec));
        self
    }

    pub fn without_dom_codec(mut self) -> Self {
        self.dom = None;
        self
    }

    pub fn build(self) -> Realm {
        Realm {
            constructors: self.constructors,
            dom: self.dom,
        }
    }
}
