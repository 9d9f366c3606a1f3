//! Data-type definitions and enumeration literals.

use super::identifiable::{Identifiable, Identity};

/// The primitive kinds a data type, attribute definition or attribute value
/// can have.
///
/// Datatype definitions, attribute definitions and attribute values come in
/// parallel families; this is the shared discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataKind {
    /// `true` / `false`.
    Boolean,
    /// An `xsd:dateTime`.
    Date,
    /// One or more literals of an enumeration.
    Enumeration,
    /// A 64-bit signed integer.
    Integer,
    /// A double precision float.
    Real,
    /// Plain text.
    String,
    /// Formatted XHTML content.
    Xhtml,
}

impl DataKind {
    /// Every kind, in schema order.
    pub const ALL: [Self; 7] = [
        Self::Boolean,
        Self::Date,
        Self::Enumeration,
        Self::Integer,
        Self::Real,
        Self::String,
        Self::Xhtml,
    ];

    /// Human readable name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Date => "Date",
            Self::Enumeration => "Enumeration",
            Self::Integer => "Integer",
            Self::Real => "Real",
            Self::String => "String",
            Self::Xhtml => "XHTML",
        }
    }
}

/// A data type usable by attribute definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct DatatypeDefinition {
    identity: Identity,
    /// Kind specific constraints.
    pub kind: DatatypeKind,
}

/// Kind specific part of a [`DatatypeDefinition`].
#[derive(Debug, Clone, PartialEq)]
pub enum DatatypeKind {
    /// `DATATYPE-DEFINITION-BOOLEAN`
    Boolean,
    /// `DATATYPE-DEFINITION-DATE`
    Date,
    /// `DATATYPE-DEFINITION-ENUMERATION`
    Enumeration {
        /// The literals, in declaration order.
        values: Vec<EnumValue>,
    },
    /// `DATATYPE-DEFINITION-INTEGER`
    Integer {
        /// Smallest admissible value.
        min: i64,
        /// Largest admissible value.
        max: i64,
    },
    /// `DATATYPE-DEFINITION-REAL`
    Real {
        /// Number of significant decimal places.
        accuracy: i32,
        /// Smallest admissible value.
        min: f64,
        /// Largest admissible value.
        max: f64,
    },
    /// `DATATYPE-DEFINITION-STRING`
    String {
        /// Maximum number of characters.
        max_length: i32,
    },
    /// `DATATYPE-DEFINITION-XHTML`
    Xhtml,
}

impl DatatypeKind {
    /// An empty kind-specific part for the given kind.
    ///
    /// Numeric bounds default to the widest representable range.
    #[must_use]
    pub const fn empty(kind: DataKind) -> Self {
        match kind {
            DataKind::Boolean => Self::Boolean,
            DataKind::Date => Self::Date,
            DataKind::Enumeration => Self::Enumeration { values: Vec::new() },
            DataKind::Integer => Self::Integer {
                min: i64::MIN,
                max: i64::MAX,
            },
            DataKind::Real => Self::Real {
                accuracy: 0,
                min: f64::MIN,
                max: f64::MAX,
            },
            DataKind::String => Self::String {
                max_length: i32::MAX,
            },
            DataKind::Xhtml => Self::Xhtml,
        }
    }

    /// The discriminant of this kind.
    #[must_use]
    pub const fn data_kind(&self) -> DataKind {
        match self {
            Self::Boolean => DataKind::Boolean,
            Self::Date => DataKind::Date,
            Self::Enumeration { .. } => DataKind::Enumeration,
            Self::Integer { .. } => DataKind::Integer,
            Self::Real { .. } => DataKind::Real,
            Self::String { .. } => DataKind::String,
            Self::Xhtml => DataKind::Xhtml,
        }
    }
}

impl DatatypeDefinition {
    /// Create a definition with the given identity and kind.
    #[must_use]
    pub const fn new(identity: Identity, kind: DatatypeKind) -> Self {
        Self { identity, kind }
    }

    /// The discriminant of this definition.
    #[must_use]
    pub const fn data_kind(&self) -> DataKind {
        self.kind.data_kind()
    }

    /// The enumeration literals, if this is an enumeration.
    #[must_use]
    pub fn enum_values(&self) -> Option<&[EnumValue]> {
        match &self.kind {
            DatatypeKind::Enumeration { values } => Some(values),
            _ => None,
        }
    }

    /// Mutable access to the enumeration literals, if this is an enumeration.
    pub const fn enum_values_mut(&mut self) -> Option<&mut Vec<EnumValue>> {
        match &mut self.kind {
            DatatypeKind::Enumeration { values } => Some(values),
            _ => None,
        }
    }

    /// Find an enumeration literal by identifier.
    #[must_use]
    pub fn enum_value(&self, identifier: &str) -> Option<&EnumValue> {
        self.enum_values()?
            .iter()
            .find(|value| value.identifier() == identifier)
    }
}

impl Identifiable for DatatypeDefinition {
    const KIND: &'static str = "DatatypeDefinition";

    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }
}

/// A literal of an enumeration data type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    identity: Identity,
    properties: Option<EmbeddedValue>,
}

impl EnumValue {
    /// Create a literal without embedded properties.
    #[must_use]
    pub const fn new(identity: Identity) -> Self {
        Self {
            identity,
            properties: None,
        }
    }

    /// The embedded key/content pair, if any.
    #[must_use]
    pub const fn properties(&self) -> Option<&EmbeddedValue> {
        self.properties.as_ref()
    }

    /// Attach an embedded value, linking it back to this literal.
    pub fn set_properties(&mut self, key: i32, other_content: impl Into<String>) -> &EmbeddedValue {
        self.properties.insert(EmbeddedValue {
            key,
            other_content: other_content.into(),
            owner: self.identity.identifier().to_string(),
        })
    }

    /// Remove the embedded value.
    pub fn clear_properties(&mut self) -> Option<EmbeddedValue> {
        self.properties.take()
    }

    /// Change the identifier, keeping the embedded value's back-link intact.
    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.identity.set_identifier(identifier);
        if let Some(properties) = &mut self.properties {
            properties.owner = self.identity.identifier().to_string();
        }
    }
}

impl Identifiable for EnumValue {
    const KIND: &'static str = "EnumValue";

    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }
}

/// Tool specific key and content attached to an [`EnumValue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedValue {
    /// Numeric key, often the literal's ordinal.
    pub key: i32,
    /// Free-form content, often a colour or label.
    pub other_content: String,
    owner: String,
}

impl EmbeddedValue {
    /// Identifier of the [`EnumValue`] that owns this record.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }
}
