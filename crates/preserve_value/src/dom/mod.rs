//! DOM nodes and the text codec seam.
//!
//! The heap stores a DOM node as text. Turning a node into text and back is
//! the realm's business, through a [`DomCodec`]; the heap codec only calls
//! it. [`XmlCodec`] is the codec the standard realm ships with.

mod xml;

use std::mem;

use preserve_stack::ensure_sufficient_stack;

pub use xml::XmlCodec;

/// A DOM node tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomNode {
    Element(Element),
    Text(String),
    Comment(String),
    CData(String),
}

impl DomNode {
    pub fn element(name: impl Into<String>) -> Self {
        DomNode::Element(Element::new(name))
    }

    pub fn text(text: impl Into<String>) -> Self {
        DomNode::Text(text.into())
    }

    pub fn is_element(&self) -> bool {
        matches!(self, DomNode::Element(_))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            DomNode::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            DomNode::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            DomNode::Element(el) => ensure_sufficient_stack(|| {
                el.children.iter().for_each(|c| c.collect_text(out));
            }),
            DomNode::Text(t) | DomNode::CData(t) => out.push_str(t),
            DomNode::Comment(_) => {}
        }
    }
}

/// An element: tag name, attributes in document order, child nodes.
#[derive(Debug)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<DomNode>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: DomNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.attributes.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(n, _)| n == name)?;
        Some(self.attributes.remove(index).1)
    }
}

// Trees parsed from text can nest arbitrarily deep, so the structural
// impls grow the stack per level and drop tears down with a worklist.

impl Clone for Element {
    fn clone(&self) -> Self {
        ensure_sufficient_stack(|| Element {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            children: self.children.clone(),
        })
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        ensure_sufficient_stack(|| {
            self.name == other.name
                && self.attributes == other.attributes
                && self.children == other.children
        })
    }
}

impl Eq for Element {}

impl Drop for Element {
    fn drop(&mut self) {
        let mut pending = mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            if let DomNode::Element(el) = &mut node {
                pending.append(&mut el.children);
            }
        }
    }
}

impl From<Element> for DomNode {
    fn from(el: Element) -> Self {
        DomNode::Element(el)
    }
}

/// Failure to parse node text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },
    #[error("expected {expected} at offset {offset}")]
    Expected {
        offset: usize,
        expected: &'static str,
    },
    #[error("closing tag `{close}` does not match `{open}` at offset {offset}")]
    MismatchedTag {
        offset: usize,
        open: String,
        close: String,
    },
    #[error("unknown entity `&{entity};` at offset {offset}")]
    UnknownEntity { offset: usize, entity: String },
}

/// Text serializer/parser pair for DOM nodes.
pub trait DomCodec {
    /// Serialize a node (and its subtree) to text.
    fn serialize(&self, node: &DomNode) -> String;

    /// Parse text back into a node; `Ok(None)` for an empty document.
    fn parse(&self, text: &str) -> Result<Option<DomNode>, DomError>;
}
