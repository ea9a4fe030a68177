//! Function handles.
//!
//! A function carries introspectable metadata (name, source text and the
//! name of its constructor: `Function`, `AsyncFunction`, ...) next to its
//! behaviour. Only the metadata survives a trip through the heap; decoded
//! functions are [`Callable::Inert`].

use std::fmt;
use std::rc::Rc;

use super::{Identity, Value};

/// Native function body.
pub type NativeFn = dyn Fn(&[Value]) -> Value;

/// What invoking a function does.
#[derive(Clone)]
pub enum Callable {
    /// Run a host closure.
    Native(Rc<NativeFn>),
    /// Do nothing and return `undefined`.
    Inert,
}

struct FunctionData {
    name: String,
    source: String,
    constructor_name: String,
    callable: Callable,
}

/// Shared function handle.
#[derive(Clone)]
pub struct Function(Rc<FunctionData>);

impl Function {
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        constructor_name: impl Into<String>,
        callable: Callable,
    ) -> Self {
        Function(Rc::new(FunctionData {
            name: name.into(),
            source: source.into(),
            constructor_name: constructor_name.into(),
            callable,
        }))
    }

    /// An ordinary function backed by a host closure.
    pub fn native(
        name: impl Into<String>,
        source: impl Into<String>,
        body: impl Fn(&[Value]) -> Value + 'static,
    ) -> Self {
        Self::new(name, source, "Function", Callable::Native(Rc::new(body)))
    }

    /// A placeholder carrying metadata only.
    pub fn inert(
        name: impl Into<String>,
        source: impl Into<String>,
        constructor_name: impl Into<String>,
    ) -> Self {
        Self::new(name, source, constructor_name, Callable::Inert)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Source text, what `toString` returns.
    pub fn source(&self) -> &str {
        &self.0.source
    }

    /// Name of the function's constructor (`Function`, `AsyncFunction`, ...).
    pub fn constructor_name(&self) -> &str {
        &self.0.constructor_name
    }

    pub fn is_inert(&self) -> bool {
        matches!(self.0.callable, Callable::Inert)
    }

    /// Invoke the function. Inert functions return `undefined`.
    pub fn call(&self, args: &[Value]) -> Value {
        match &self.0.callable {
            Callable::Native(body) => body(args),
            Callable::Inert => Value::Undefined,
        }
    }

    #[inline]
    pub fn identity(&self) -> Identity {
        Identity::of(&self.0)
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source())
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name())
            .field("constructor", &self.constructor_name())
            .field("inert", &self.is_inert())
            .finish()
    }
}
