//! XML text codec for DOM nodes.
//!
//! Covers the subset a serialized node tree uses: elements with quoted
//! attributes, self-closing tags, text, comments, CDATA sections, the five
//! predefined entities and numeric character references. A leading XML
//! declaration and processing instructions are skipped.

use preserve_stack::ensure_sufficient_stack;

use super::{DomCodec, DomError, DomNode, Element};

/// The standard realm's DOM codec.
#[derive(Copy, Clone, Debug, Default)]
pub struct XmlCodec;

impl DomCodec for XmlCodec {
    fn serialize(&self, node: &DomNode) -> String {
        let mut out = String::new();
        write_node(&mut out, node);
        out
    }

    fn parse(&self, text: &str) -> Result<Option<DomNode>, DomError> {
        let mut parser = Parser { src: text, pos: 0 };
        let nodes = parser.parse_content(None)?;
        // The document's first child; whitespace between top-level nodes is
        // not content.
        Ok(nodes
            .into_iter()
            .find(|n| !matches!(n, DomNode::Text(t) if t.trim().is_empty())))
    }
}

// Serialization

fn write_node(out: &mut String, node: &DomNode) {
    match node {
        DomNode::Element(el) => ensure_sufficient_stack(|| write_element(out, el)),
        DomNode::Text(text) => escape_into(out, text, false),
        DomNode::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        DomNode::CData(text) => {
            out.push_str("<![CDATA[");
            out.push_str(text);
            out.push_str("]]>");
        }
    }
}

fn write_element(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(&el.name);
    for (name, value) in &el.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_into(out, value, true);
        out.push('"');
    }
    if el.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &el.children {
        write_node(out, child);
    }
    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

// Parsing

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &'static str) -> Result<(), DomError> {
        if self.eat(token) {
            Ok(())
        } else if self.rest().is_empty() {
            Err(DomError::UnexpectedEof { offset: self.pos })
        } else {
            Err(DomError::Expected {
                offset: self.pos,
                expected: token,
            })
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Consume through `end`, returning what came before it.
    fn take_until(&mut self, end: &str) -> Result<&'a str, DomError> {
        let rest = self.rest();
        let Some(index) = rest.find(end) else {
            return Err(DomError::UnexpectedEof {
                offset: self.src.len(),
            });
        };
        self.pos += index + end.len();
        Ok(&rest[..index])
    }

    fn parse_name(&mut self) -> Result<String, DomError> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(if rest.is_empty() {
                DomError::UnexpectedEof { offset: self.pos }
            } else {
                DomError::Expected {
                    offset: self.pos,
                    expected: "name",
                }
            });
        }
        self.pos += len;
        Ok(rest[..len].to_string())
    }

    /// Parse sibling nodes until the closing tag of `open` (or end of input
    /// at the top level).
    fn parse_content(&mut self, open: Option<&str>) -> Result<Vec<DomNode>, DomError> {
        let mut nodes = Vec::new();
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return match open {
                    Some(_) => Err(DomError::UnexpectedEof { offset: self.pos }),
                    None => Ok(nodes),
                };
            }
            if rest.starts_with("</") {
                let offset = self.pos;
                let Some(open) = open else {
                    return Err(DomError::Expected {
                        offset,
                        expected: "element or text",
                    });
                };
                self.pos += 2;
                let close = self.parse_name()?;
                self.skip_whitespace();
                self.expect(">")?;
                if close != open {
                    return Err(DomError::MismatchedTag {
                        offset,
                        open: open.to_string(),
                        close,
                    });
                }
                return Ok(nodes);
            }
            if self.eat("<!--") {
                nodes.push(DomNode::Comment(self.take_until("-->")?.to_string()));
            } else if self.eat("<![CDATA[") {
                nodes.push(DomNode::CData(self.take_until("]]>")?.to_string()));
            } else if self.eat("<?") {
                self.take_until("?>")?;
            } else if rest.starts_with('<') {
                let element = ensure_sufficient_stack(|| self.parse_element())?;
                nodes.push(DomNode::Element(element));
            } else {
                let offset = self.pos;
                let len = rest.find('<').unwrap_or(rest.len());
                self.pos += len;
                nodes.push(DomNode::Text(decode_entities(&rest[..len], offset)?));
            }
        }
    }

    fn parse_element(&mut self) -> Result<Element, DomError> {
        self.expect("<")?;
        let mut element = Element::new(self.parse_name()?);
        loop {
            self.skip_whitespace();
            if self.eat("/>") {
                return Ok(element);
            }
            if self.eat(">") {
                element.children = self.parse_content(Some(&element.name))?;
                return Ok(element);
            }
            let name = self.parse_name()?;
            self.skip_whitespace();
            self.expect("=")?;
            self.skip_whitespace();
            let quote = if self.eat("\"") {
                "\""
            } else {
                self.expect("'")?;
                "'"
            };
            let offset = self.pos;
            let raw = self.take_until(quote)?;
            element
                .attributes
                .push((name, decode_entities(raw, offset)?));
        }
    }
}

fn decode_entities(raw: &str, offset: usize) -> Result<String, DomError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let entity_offset = offset + (raw.len() - rest.len()) + amp;
        let Some(semi) = after.find(';') else {
            return Err(DomError::Expected {
                offset: entity_offset,
                expected: "`;` closing an entity",
            });
        };
        let entity = &after[..semi];
        let decoded = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .map(|hex| u32::from_str_radix(hex, 16))
                .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                .and_then(Result::ok)
                .and_then(char::from_u32),
        };
        let Some(c) = decoded else {
            return Err(DomError::UnknownEntity {
                offset: entity_offset,
                entity: entity.to_string(),
            });
        };
        out.push(c);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
