//! Owned XML tokens and the bounded element subtrees built from them.
//!
//! Both the blocking and the async frontends convert `quick_xml` events into
//! [`Token`]s; everything downstream is independent of how bytes arrive.

use std::borrow::Cow;

use quick_xml::{
    escape::{escape, unescape},
    events::{BytesStart, Event},
};

use super::{escape_attribute, location::Location};
use crate::error::{Error, Result};

/// An opening tag with its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Qualified name, including any namespace prefix.
    pub name: String,
    /// Attributes in document order, values unescaped.
    pub attributes: Vec<(String, String)>,
    /// Where the tag starts in the source.
    pub location: Location,
}

impl StartTag {
    fn from_bytes(tag: &BytesStart<'_>, location: Location) -> Result<Self> {
        let name = String::from_utf8_lossy(tag.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attribute in tag.attributes() {
            let attribute = attribute.map_err(|e| Error::xml(location.offset, e))?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            // Entities unknown to the tokenizer (such as `&nbsp;`) are kept
            // as written.
            let value = attribute.unescape_value().map_or_else(
                |_| String::from_utf8_lossy(&attribute.value).into_owned(),
                Cow::into_owned,
            );
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            location,
        })
    }
}

/// One step of the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<name ...>`
    Start(StartTag),
    /// `<name .../>`
    Empty(StartTag),
    /// `</name>`
    End,
    /// Character data, still escaped as it appeared in the source.
    Text(String),
}

impl Token {
    /// Convert a tokenizer event.
    ///
    /// Returns `Ok(None)` for events without structural meaning (the XML
    /// declaration, comments, processing instructions and `Eof`).
    pub fn from_event(event: &Event<'_>, location: Location) -> Result<Option<Self>> {
        let token = match event {
            Event::Start(tag) => Self::Start(StartTag::from_bytes(tag, location)?),
            Event::Empty(tag) => Self::Empty(StartTag::from_bytes(tag, location)?),
            Event::End(_) => Self::End,
            Event::Text(text) => Self::Text(String::from_utf8_lossy(text).into_owned()),
            Event::CData(data) => {
                Self::Text(escape(&*String::from_utf8_lossy(data)).into_owned())
            }
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) | Event::Eof => {
                return Ok(None);
            }
        };
        Ok(Some(token))
    }
}

/// A node of an element subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A child element.
    Element(Element),
    /// Escaped character data.
    Text(String),
}

/// A fully read element and everything inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified name.
    pub name: String,
    /// Attributes in document order, values unescaped.
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
    /// Where the start tag begins in the source.
    pub location: Location,
}

impl From<StartTag> for Element {
    fn from(tag: StartTag) -> Self {
        Self {
            name: tag.name,
            attributes: tag.attributes,
            children: Vec::new(),
            location: tag.location,
        }
    }
}

impl Element {
    /// The name without its namespace prefix.
    #[must_use]
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// An attribute value by qualified name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// The first child element with the given local name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.elements().find(|element| element.local_name() == name)
    }

    /// The unescaped text content of this element (direct text children only).
    #[must_use]
    pub fn text(&self) -> String {
        let raw: String = self
            .children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect();
        unescape(&raw).map_or_else(|_| raw.clone(), Cow::into_owned)
    }

    /// The serialized markup of the children.
    #[must_use]
    pub fn inner_xml(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            node.write_xml(&mut out);
        }
        out
    }
}

impl Node {
    fn write_xml(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Element(element) => {
                out.push('<');
                out.push_str(&element.name);
                for (key, value) in &element.attributes {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(value));
                    out.push('"');
                }
                if element.children.is_empty() {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    for child in &element.children {
                        child.write_xml(out);
                    }
                    out.push_str("</");
                    out.push_str(&element.name);
                    out.push('>');
                }
            }
        }
    }
}

/// The part of a qualified name after the namespace prefix.
#[must_use]
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Collects the tokens of one element into an [`Element`].
#[derive(Debug)]
pub struct TreeBuilder {
    stack: Vec<Element>,
}

impl TreeBuilder {
    /// Start collecting at `root`.
    #[must_use]
    pub fn new(root: StartTag) -> Self {
        Self {
            stack: vec![root.into()],
        }
    }

    /// Feed the next token; returns the finished subtree once the root closes.
    pub fn feed(&mut self, token: Token) -> Option<Element> {
        match token {
            Token::Start(tag) => {
                self.stack.push(tag.into());
                None
            }
            Token::Empty(tag) => {
                self.append(Node::Element(tag.into()));
                None
            }
            Token::Text(text) => {
                self.append(Node::Text(text));
                None
            }
            Token::End => {
                let element = self.stack.pop()?;
                if self.stack.is_empty() {
                    Some(element)
                } else {
                    self.append(Node::Element(element));
                    None
                }
            }
        }
    }

    fn append(&mut self, node: Node) {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use quick_xml::Reader;

    use super::*;

    fn parse(xml: &str) -> Element {
        let mut reader = Reader::from_str(xml);
        let mut builder: Option<TreeBuilder> = None;
        loop {
            let event = reader.read_event().unwrap();
            if matches!(event, Event::Eof) {
                panic!("document ended before the root closed");
            }
            let Some(token) = Token::from_event(&event, Location::START).unwrap() else {
                continue;
            };
            match builder.as_mut() {
                Some(builder) => {
                    if let Some(element) = builder.feed(token) {
                        return element;
                    }
                }
                None => match token {
                    Token::Start(tag) => builder = Some(TreeBuilder::new(tag)),
                    Token::Empty(tag) => return tag.into(),
                    _ => {}
                },
            }
        }
    }

    #[test]
    fn builds_nested_subtree() {
        let element = parse(
            r#"<SPEC-OBJECT IDENTIFIER="a"><TYPE><SPEC-OBJECT-TYPE-REF> t </SPEC-OBJECT-TYPE-REF></TYPE><VALUES/></SPEC-OBJECT>"#,
        );

        assert_eq!(element.attribute("IDENTIFIER"), Some("a"));
        let reference = element.child("TYPE").unwrap().elements().next().unwrap();
        assert_eq!(reference.text().trim(), "t");
        assert!(element.child("VALUES").unwrap().children.is_empty());
    }

    #[test]
    fn inner_xml_keeps_markup() {
        let element = parse(
            r#"<THE-VALUE><xhtml:div><xhtml:p class="a&amp;b">x &lt; y&#160;z</xhtml:p><xhtml:br/></xhtml:div></THE-VALUE>"#,
        );

        assert_eq!(
            element.inner_xml(),
            r#"<xhtml:div><xhtml:p class="a&amp;b">x &lt; y&#160;z</xhtml:p><xhtml:br/></xhtml:div>"#
        );
    }

    #[test]
    fn text_is_unescaped() {
        let element = parse("<TITLE>Brakes &amp; Pedals</TITLE>");
        assert_eq!(element.text(), "Brakes & Pedals");
        assert_eq!(element.local_name(), "TITLE");
        assert_eq!(local_name("xhtml:p"), "p");
    }
}
