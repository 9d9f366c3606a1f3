//! Typed attribute values attached to spec elements.

use std::{io, path::Path};

use chrono::{DateTime, FixedOffset, Utc};
use quick_xml::{Reader, events::Event};

use super::{
    datatype::{DataKind, EnumValue},
    identifiable::Ref,
    spec_type::AttributeDefinition,
};

/// A value bound to an attribute definition of the same kind.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeValue {
    definition: Ref<AttributeDefinition>,
    /// The typed payload.
    pub value: Value,
}

impl AttributeValue {
    /// Create a value bound to `definition`.
    #[must_use]
    pub const fn new(definition: Ref<AttributeDefinition>, value: Value) -> Self {
        Self { definition, value }
    }

    /// The definition this value is bound to.
    #[must_use]
    pub const fn definition(&self) -> &Ref<AttributeDefinition> {
        &self.definition
    }

    /// Rebind the value to another definition.
    pub fn set_definition(&mut self, definition: Ref<AttributeDefinition>) {
        self.definition = definition;
    }

    /// The kind of the payload.
    #[must_use]
    pub const fn data_kind(&self) -> DataKind {
        self.value.data_kind()
    }
}

/// The payload of an [`AttributeValue`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `ATTRIBUTE-VALUE-BOOLEAN`
    Boolean(bool),
    /// `ATTRIBUTE-VALUE-DATE`
    Date(DateTime<FixedOffset>),
    /// `ATTRIBUTE-VALUE-ENUMERATION`: the selected literals, in order.
    Enumeration(Vec<Ref<EnumValue>>),
    /// `ATTRIBUTE-VALUE-INTEGER`
    Integer(i64),
    /// `ATTRIBUTE-VALUE-REAL`
    Real(f64),
    /// `ATTRIBUTE-VALUE-STRING`
    String(String),
    /// `ATTRIBUTE-VALUE-XHTML`
    Xhtml(XhtmlContent),
}

impl Value {
    /// The shared discriminant.
    #[must_use]
    pub const fn data_kind(&self) -> DataKind {
        match self {
            Self::Boolean(_) => DataKind::Boolean,
            Self::Date(_) => DataKind::Date,
            Self::Enumeration(_) => DataKind::Enumeration,
            Self::Integer(_) => DataKind::Integer,
            Self::Real(_) => DataKind::Real,
            Self::String(_) => DataKind::String,
            Self::Xhtml(_) => DataKind::Xhtml,
        }
    }

    /// An empty payload of the given kind.
    #[must_use]
    pub fn empty(kind: DataKind) -> Self {
        match kind {
            DataKind::Boolean => Self::Boolean(false),
            DataKind::Date => Self::Date(DateTime::<Utc>::UNIX_EPOCH.fixed_offset()),
            DataKind::Enumeration => Self::Enumeration(Vec::new()),
            DataKind::Integer => Self::Integer(0),
            DataKind::Real => Self::Real(0.0),
            DataKind::String => Self::String(String::new()),
            DataKind::Xhtml => Self::Xhtml(XhtmlContent::default()),
        }
    }

    /// The boolean payload, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// The integer payload, if this is an integer.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// The real payload, if this is a real.
    #[must_use]
    pub const fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(value) => Some(*value),
            _ => None,
        }
    }

    /// The string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// The date payload, if this is a date.
    #[must_use]
    pub const fn as_date(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Date(value) => Some(*value),
            _ => None,
        }
    }

    /// The selected literals, if this is an enumeration.
    #[must_use]
    pub fn as_enum_values(&self) -> Option<&[Ref<EnumValue>]> {
        match self {
            Self::Enumeration(values) => Some(values),
            _ => None,
        }
    }

    /// The XHTML content, if this is an XHTML value.
    #[must_use]
    pub const fn as_xhtml(&self) -> Option<&XhtmlContent> {
        match self {
            Self::Xhtml(content) => Some(content),
            _ => None,
        }
    }
}

/// Formatted content of an XHTML attribute value.
///
/// Markup is kept verbatim (as serialized XML, including namespace prefixes)
/// so that documents survive a round trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XhtmlContent {
    /// Markup inside `THE-VALUE`.
    pub markup: String,
    /// Markup inside `THE-ORIGINAL-VALUE`, kept by tools that simplify.
    pub original_markup: Option<String>,
    /// Whether `markup` is a simplified rendering of `original_markup`.
    pub is_simplified: bool,
}

impl XhtmlContent {
    /// Wrap existing markup.
    #[must_use]
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            original_markup: None,
            is_simplified: false,
        }
    }

    /// The external objects (`<xhtml:object>`) embedded in the markup, in
    /// document order.
    ///
    /// Malformed markup yields the objects found before the error.
    #[must_use]
    pub fn external_objects(&self) -> Vec<ExternalObject> {
        let mut reader = Reader::from_str(&self.markup);
        let mut objects = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Start(tag) | Event::Empty(tag))
                    if tag.local_name().as_ref() == b"object" =>
                {
                    if let Some(object) = ExternalObject::from_attributes(&tag) {
                        objects.push(object);
                    }
                }
                Ok(Event::Eof) => break,
                Err(error) => {
                    tracing::warn!("stopped scanning XHTML for objects: {error}");
                    break;
                }
                Ok(_) => {}
            }
        }
        objects
    }

    /// The text of the markup with all formatting removed.
    ///
    /// Block level elements and line breaks become newlines; runs of blank
    /// lines are collapsed.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut reader = Reader::from_str(&self.markup);
        let mut text = String::new();
        loop {
            match reader.read_event() {
                Ok(Event::Text(content)) => match content.unescape() {
                    Ok(unescaped) => text.push_str(&unescaped),
                    Err(_) => text.push_str(&String::from_utf8_lossy(&content)),
                },
                Ok(Event::CData(content)) => {
                    text.push_str(&String::from_utf8_lossy(&content.into_inner()));
                }
                Ok(Event::End(tag)) if is_block(tag.local_name().as_ref()) => text.push('\n'),
                Ok(Event::Empty(tag)) if tag.local_name().as_ref() == b"br" => text.push('\n'),
                Ok(Event::Eof) => break,
                Err(error) => {
                    tracing::warn!("stopped extracting XHTML text: {error}");
                    break;
                }
                Ok(_) => {}
            }
        }

        let mut lines: Vec<&str> = Vec::new();
        for line in text.lines().map(str::trim) {
            if !(line.is_empty() && lines.last().is_none_or(|last| last.is_empty())) {
                lines.push(line);
            }
        }
        lines.join("\n").trim().to_string()
    }
}

fn is_block(local_name: &[u8]) -> bool {
    matches!(
        local_name,
        b"p" | b"div"
            | b"li"
            | b"tr"
            | b"h1"
            | b"h2"
            | b"h3"
            | b"h4"
            | b"h5"
            | b"h6"
            | b"pre"
            | b"blockquote"
    )
}

/// A reference from XHTML content to an external file, such as an image
/// inside a `.reqifz` archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalObject {
    /// Location of the object, usually relative to the document.
    pub uri: String,
    /// Declared MIME type.
    pub mime_type: Option<String>,
    /// Display height in pixels.
    pub height: Option<u32>,
    /// Display width in pixels.
    pub width: Option<u32>,
}

impl ExternalObject {
    fn from_attributes(tag: &quick_xml::events::BytesStart<'_>) -> Option<Self> {
        let mut uri = None;
        let mut mime_type = None;
        let mut height = None;
        let mut width = None;
        for attribute in tag.attributes().flatten() {
            let Ok(value) = attribute.unescape_value() else {
                continue;
            };
            match attribute.key.local_name().as_ref() {
                b"data" => uri = Some(value.into_owned()),
                b"type" => mime_type = Some(value.into_owned()),
                b"height" => height = value.trim().parse().ok(),
                b"width" => width = value.trim().parse().ok(),
                _ => {}
            }
        }
        Some(Self {
            uri: uri?,
            mime_type,
            height,
            width,
        })
    }
}

/// Retrieves the bytes of an [`ExternalObject`].
///
/// Implementations decide how objects are located and whether results are
/// cached. They must tolerate repeated queries for the same object.
pub trait ExternalObjectSource {
    /// Fetch the bytes of `object`, referenced from the document at
    /// `document_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the object cannot be located or read.
    fn fetch(&self, object: &ExternalObject, document_path: &Path) -> io::Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKUP: &str = r#"<xhtml:div><xhtml:p>The <xhtml:b>brake</xhtml:b> shall engage.</xhtml:p><xhtml:p>Within 20&amp;nbsp;ms.<xhtml:br/>See figure:</xhtml:p><xhtml:object data="files/figure1.png" type="image/png" width="200" height="100"/></xhtml:div>"#;

    #[test]
    fn plain_text_strips_markup() {
        let content = XhtmlContent::new(MARKUP);
        assert_eq!(
            content.plain_text(),
            "The brake shall engage.\nWithin 20&nbsp;ms.\nSee figure:"
        );
    }

    #[test]
    fn external_objects_are_found() {
        let content = XhtmlContent::new(MARKUP);
        let objects = content.external_objects();

        assert_eq!(objects.len(), 1);
        let object = &objects[0];
        assert_eq!(object.uri, "files/figure1.png");
        assert_eq!(object.mime_type.as_deref(), Some("image/png"));
        assert_eq!(object.width, Some(200));
        assert_eq!(object.height, Some(100));
    }

    #[test]
    fn object_without_data_is_ignored() {
        let content = XhtmlContent::new(r#"<xhtml:object type="image/png"/>"#);
        assert!(content.external_objects().is_empty());
    }

    /// Resolves objects relative to the directory holding the document.
    struct Sibling;

    impl ExternalObjectSource for Sibling {
        fn fetch(&self, object: &ExternalObject, document_path: &Path) -> io::Result<Vec<u8>> {
            let directory = document_path.parent().unwrap_or_else(|| Path::new("."));
            std::fs::read(directory.join(&object.uri))
        }
    }

    #[test]
    fn objects_are_fetched_next_to_the_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("files")).unwrap();
        std::fs::write(dir.path().join("files/figure1.png"), b"png").unwrap();
        let document = dir.path().join("brakes.reqif");

        let objects = XhtmlContent::new(MARKUP).external_objects();
        let object = &objects[0];
        assert_eq!(Sibling.fetch(object, &document).unwrap(), b"png");
        assert_eq!(Sibling.fetch(object, &document).unwrap(), b"png");

        let missing = ExternalObject {
            uri: "files/missing.png".to_string(),
            ..object.clone()
        };
        assert!(Sibling.fetch(&missing, &document).is_err());
    }

    #[test]
    fn value_accessors() {
        assert_eq!(Value::Integer(7).as_integer(), Some(7));
        assert_eq!(Value::Integer(7).as_bool(), None);
        assert_eq!(Value::String("x".into()).as_str(), Some("x"));
        for kind in DataKind::ALL {
            assert_eq!(Value::empty(kind).data_kind(), kind);
        }
    }
}
