//! Inspection rendering for `Display`.

use std::fmt::{self, Write};

use preserve_stack::ensure_sufficient_stack;

use super::{Identity, Object, ObjectKind, Value};
use crate::DomNode;

/// Cycle-aware writer; objects on the current path render as `[Circular]`.
#[derive(Default)]
pub(super) struct Renderer {
    path: Vec<Identity>,
}

impl Renderer {
    pub(super) fn write_value(&mut self, f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
        match value {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write_number(f, *n),
            Value::BigInt(n) => write!(f, "{n}n"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::Function(func) => {
                if func.name().is_empty() {
                    write!(f, "[{} (anonymous)]", func.constructor_name())
                } else {
                    write!(f, "[{}: {}]", func.constructor_name(), func.name())
                }
            }
            Value::Object(obj) => self.write_object(f, obj),
            Value::Opaque(o) => write!(f, "[opaque {}]", o.type_name()),
        }
    }

    fn write_object(&mut self, f: &mut fmt::Formatter<'_>, obj: &Object) -> fmt::Result {
        let id = obj.identity();
        if self.path.contains(&id) {
            return f.write_str("[Circular]");
        }
        self.path.push(id);
        let kind = obj.borrow().clone();
        let result = ensure_sufficient_stack(|| self.write_kind(f, &kind));
        self.path.pop();
        result
    }

    fn write_list(&mut self, f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
        f.write_char('[')?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            self.write_value(f, item)?;
        }
        f.write_char(']')
    }

    fn write_kind(&mut self, f: &mut fmt::Formatter<'_>, kind: &ObjectKind) -> fmt::Result {
        match kind {
            ObjectKind::Ordinary(props) => {
                if props.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, (key, value)) in props.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: ")?;
                    self.write_value(f, value)?;
                }
                f.write_str(" }")
            }
            ObjectKind::Array(items) => self.write_list(f, items),
            ObjectKind::Map(entries) => {
                write!(f, "Map({}) {{", entries.len())?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    f.write_str(if i > 0 { ", " } else { " " })?;
                    self.write_value(f, key)?;
                    f.write_str(" => ")?;
                    self.write_value(f, value)?;
                }
                f.write_str(if entries.is_empty() { "}" } else { " }" })
            }
            ObjectKind::Set(items) => {
                write!(f, "Set({}) {{", items.len())?;
                for (i, item) in items.iter().enumerate() {
                    f.write_str(if i > 0 { ", " } else { " " })?;
                    self.write_value(f, item)?;
                }
                f.write_str(if items.is_empty() { "}" } else { " }" })
            }
            ObjectKind::Date(ms) if ms.is_nan() => f.write_str("Invalid Date"),
            ObjectKind::Date(ms) => write!(f, "Date({ms})"),
            ObjectKind::RegExp(re) => write!(f, "{re}"),
            ObjectKind::Error(err) => {
                if err.message.is_empty() {
                    f.write_str(&err.name)
                } else {
                    write!(f, "{}: {}", err.name, err.message)
                }
            }
            ObjectKind::ArrayBuffer(bytes) => {
                write!(f, "ArrayBuffer {{ byteLength: {} }}", bytes.len())
            }
            ObjectKind::TypedArray(view) => {
                write!(f, "{}({}) [", view.kind(), view.elements().len())?;
                for (i, n) in view.elements().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_number(f, *n)?;
                }
                f.write_char(']')
            }
            ObjectKind::Node(node) => write_node(f, node),
            ObjectKind::NodeList(items) => {
                write!(f, "NodeList({}) ", items.len())?;
                self.write_list(f, items)
            }
            ObjectKind::HtmlCollection(items) => {
                write!(f, "HTMLCollection({}) ", items.len())?;
                self.write_list(f, items)
            }
        }
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n == 0.0 && n.is_sign_negative() {
        f.write_str("-0")
    } else {
        f.write_str(&super::number_to_string(n))
    }
}

fn write_node(f: &mut fmt::Formatter<'_>, node: &DomNode) -> fmt::Result {
    match node {
        DomNode::Element(el) => write!(f, "<{}> ({} children)", el.name, el.children.len()),
        DomNode::Text(text) => write!(f, "#text {text:?}"),
        DomNode::Comment(text) => write!(f, "#comment {text:?}"),
        DomNode::CData(text) => write!(f, "#cdata-section {text:?}"),
    }
}
