//! The document root.

use super::{content::ReqIfContent, header::ReqIfHeader};

/// The namespace of the `REQ-IF` root element.
pub const REQIF_NAMESPACE: &str = "http://www.omg.org/spec/ReqIF/20110401/reqif.xsd";

/// The XHTML namespace used inside XHTML attribute values.
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// A complete ReqIF document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReqIf {
    /// `THE-HEADER`
    pub header: ReqIfHeader,
    /// `CORE-CONTENT`
    pub content: ReqIfContent,
    /// `TOOL-EXTENSIONS`, kept verbatim.
    pub tool_extensions: Vec<ToolExtension>,
    /// Attributes of the root element (namespace declarations, `xml:lang`,
    /// schema locations), in document order.
    pub attributes: Vec<(String, String)>,
}

impl ReqIf {
    /// An empty document with a fresh header.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            header: ReqIfHeader::new(title),
            ..Self::default()
        }
    }

    /// The value of a root attribute by qualified name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set a root attribute, replacing an existing value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// The document language from `xml:lang`.
    #[must_use]
    pub fn lang(&self) -> Option<&str> {
        self.attribute("xml:lang")
    }
}

/// One `REQ-IF-TOOL-EXTENSION`, kept as the raw markup of its children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolExtension {
    /// Serialized child elements.
    pub markup: String,
}
