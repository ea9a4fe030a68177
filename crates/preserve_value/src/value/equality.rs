//! Structural graph equality.

use rustc_hash::FxHashSet;

use preserve_stack::ensure_sufficient_stack;

use super::{Identity, Object, ObjectKind, Value};

pub(super) fn deep_equals(a: &Value, b: &Value) -> bool {
    GraphEq::default().values(a, b)
}

/// Object.is on numbers: NaN is NaN, and the zeros differ.
fn same_number(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
}

#[derive(Default)]
struct GraphEq {
    /// Pairs under comparison; revisiting one means we closed a cycle.
    assumed: FxHashSet<(Identity, Identity)>,
}

impl GraphEq {
    fn values(&mut self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(x), Value::Boolean(y)) => x == y,
            (Value::Number(x), Value::Number(y)) => same_number(*x, *y),
            (Value::BigInt(x), Value::BigInt(y)) => x == y,
            (Value::String(x), Value::String(y)) => x == y,
            (Value::Symbol(x), Value::Symbol(y)) => x.description() == y.description(),
            (Value::Function(x), Value::Function(y)) => {
                x.name() == y.name()
                    && x.source() == y.source()
                    && x.constructor_name() == y.constructor_name()
            }
            (Value::Object(x), Value::Object(y)) => self.objects(x, y),
            (Value::Opaque(x), Value::Opaque(y)) => x.identity() == y.identity(),
            _ => false,
        }
    }

    fn objects(&mut self, a: &Object, b: &Object) -> bool {
        if !self.assumed.insert((a.identity(), b.identity())) {
            return true;
        }
        ensure_sufficient_stack(|| {
            // Snapshot so no RefCell borrow is held across recursion.
            let (left, right) = (a.borrow().clone(), b.borrow().clone());
            self.kinds(&left, &right)
        })
    }

    fn sequences(&mut self, a: &[Value], b: &[Value]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.values(x, y))
    }

    fn kinds(&mut self, a: &ObjectKind, b: &ObjectKind) -> bool {
        match (a, b) {
            (ObjectKind::Ordinary(x), ObjectKind::Ordinary(y)) => {
                x.len() == y.len()
                    && x.iter()
                        .zip(y)
                        .all(|((kx, vx), (ky, vy))| kx == ky && self.values(vx, vy))
            }
            (ObjectKind::Array(x), ObjectKind::Array(y))
            | (ObjectKind::Set(x), ObjectKind::Set(y))
            | (ObjectKind::NodeList(x), ObjectKind::NodeList(y))
            | (ObjectKind::HtmlCollection(x), ObjectKind::HtmlCollection(y)) => {
                self.sequences(x, y)
            }
            (ObjectKind::Map(x), ObjectKind::Map(y)) => {
                x.len() == y.len()
                    && x.iter()
                        .zip(y)
                        .all(|((kx, vx), (ky, vy))| self.values(kx, ky) && self.values(vx, vy))
            }
            (ObjectKind::Date(x), ObjectKind::Date(y)) => same_number(*x, *y),
            (ObjectKind::RegExp(x), ObjectKind::RegExp(y)) => x == y,
            (ObjectKind::Error(x), ObjectKind::Error(y)) => x == y,
            (ObjectKind::ArrayBuffer(x), ObjectKind::ArrayBuffer(y)) => x == y,
            (ObjectKind::TypedArray(x), ObjectKind::TypedArray(y)) => {
                x.kind() == y.kind()
                    && x.elements().len() == y.elements().len()
                    && x.elements()
                        .iter()
                        .zip(y.elements())
                        .all(|(p, q)| same_number(*p, *q))
            }
            (ObjectKind::Node(x), ObjectKind::Node(y)) => x == y,
            _ => false,
        }
    }
}
