//! Owned XML tree used by every resolver.
//!
//! PresentationML parts are small enough that a plain DOM beats repeated
//! streaming scans: the inheritance chain (slide, layout, master, theme)
//! needs random access to subtrees long after the part has been read. The
//! tree is built from quick-xml events. Element names keep their prefix as
//! written (`p:sp`, `a:off`), so lookups use the qualified names that appear
//! in the documents.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{Error, Result};

/// A node in the parsed tree: an element or a run of character data.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
}

/// An XML element with its attributes and child nodes in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl Element {
    /// Parse a complete XML document and return its root element.
    pub fn parse(bytes: &[u8]) -> Result<Element> {
        let mut reader = Reader::from_reader(bytes);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    stack.push(element_from_start(e)?);
                },
                Ok(Event::Empty(ref e)) => {
                    let el = element_from_start(e)?;
                    attach(&mut stack, &mut root, el);
                },
                Ok(Event::End(_)) => {
                    let el = stack
                        .pop()
                        .ok_or_else(|| Error::Xml("unbalanced end tag".to_string()))?;
                    attach(&mut stack, &mut root, el);
                },
                Ok(Event::Text(ref t)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = t
                            .unescape()
                            .map_err(|e| Error::Xml(e.to_string()))?
                            .into_owned();
                        parent.children.push(XmlNode::Text(text));
                    }
                },
                Ok(Event::CData(ref t)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(t).into_owned();
                        parent.children.push(XmlNode::Text(text));
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(e.to_string())),
                _ => {},
            }
        }

        root.ok_or_else(|| Error::Xml("document has no root element".to_string()))
    }

    /// Qualified element name as written in the document (e.g. `p:sp`).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element name with any namespace prefix stripped.
    #[inline]
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    /// Get an attribute value by its qualified name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get an attribute parsed as `i64`. Missing or malformed yields `None`.
    pub fn attr_i64(&self, name: &str) -> Option<i64> {
        self.attr(name).and_then(|v| v.parse().ok())
    }

    /// Get a boolean attribute (`"1"`/`"true"` are true).
    pub fn attr_bool(&self, name: &str) -> bool {
        matches!(self.attr(name), Some("1") | Some("true"))
    }

    /// First child element with the given qualified name.
    pub fn child<'a, 'b>(&'a self, name: &'b str) -> Option<&'a Element> {
        self.children(name).next()
    }

    /// All child elements with the given qualified name, in document order.
    ///
    /// This is the one-vs-many normalization boundary: a caller never needs
    /// to care whether a sequence had length one.
    pub fn children<'a, 'b>(&'a self, name: &'b str) -> impl Iterator<Item = &'a Element> + 'b
    where
        'a: 'b,
    {
        self.elements().filter(move |e| e.name == name)
    }

    /// All child elements regardless of name, in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// Walk successive child names, returning the element at the end of the
    /// path, or `None` on the first missing branch. Never panics on missing
    /// data; the path itself is static program text.
    pub fn get<'a>(&'a self, path: &[&str]) -> Option<&'a Element> {
        let mut cur = self;
        for name in path {
            cur = cur.child(name)?;
        }
        Some(cur)
    }

    /// Attribute at the end of a path, e.g. `get_attr(&["a:off"], "x")`.
    pub fn get_attr(&self, path: &[&str], attr: &str) -> Option<&str> {
        self.get(path).and_then(|e| e.attr(attr))
    }

    /// First descendant element with the given qualified name (depth-first).
    pub fn descendant(&self, name: &str) -> Option<&Element> {
        for el in self.elements() {
            if el.name == name {
                return Some(el);
            }
            if let Some(found) = el.descendant(name) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated direct text content of this element.
    ///
    /// Only direct children are read: run text lives in leaf elements
    /// (`a:t`), and recursing would pick up formatting whitespace.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let XmlNode::Text(t) = node {
                out.push_str(t);
            }
        }
        out
    }

    /// Child nodes (elements and text) in document order.
    #[inline]
    pub fn nodes(&self) -> &[XmlNode] {
        &self.children
    }

    #[cfg(test)]
    pub(crate) fn new_for_test(name: &str, attrs: &[(&str, &str)]) -> Element {
        Element {
            name: name.to_string(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            children: Vec::new(),
        }
    }

}

fn element_from_start(e: &quick_xml::events::BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(e.to_string()))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(Element {
        name,
        attrs,
        children: Vec::new(),
    })
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, el: Element) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(XmlNode::Element(el));
    } else if root.is_none() {
        *root = Some(el);
    }
}
