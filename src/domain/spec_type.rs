//! Spec types and the attribute definitions they own.

use super::{
    attribute_value::AttributeValue,
    datatype::{DataKind, DatatypeDefinition},
    identifiable::{Identifiable, Identity, Ref},
};

/// The four schema-level type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpecTypeKind {
    /// Types [`SpecObject`](crate::SpecObject)s.
    SpecObjectType,
    /// Types [`Specification`](crate::Specification)s.
    SpecificationType,
    /// Types [`SpecRelation`](crate::SpecRelation)s.
    SpecRelationType,
    /// Types [`RelationGroup`](crate::RelationGroup)s.
    RelationGroupType,
}

impl SpecTypeKind {
    /// Every kind, in schema order.
    pub const ALL: [Self; 4] = [
        Self::SpecObjectType,
        Self::SpecificationType,
        Self::SpecRelationType,
        Self::RelationGroupType,
    ];

    /// Human readable name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SpecObjectType => "SpecObjectType",
            Self::SpecificationType => "SpecificationType",
            Self::SpecRelationType => "SpecRelationType",
            Self::RelationGroupType => "RelationGroupType",
        }
    }
}

/// A spec type: the schema for one kind of element, listing the attributes
/// its instances may carry.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecType {
    identity: Identity,
    kind: SpecTypeKind,
    /// Attribute definitions, in declaration order.
    pub attributes: Vec<AttributeDefinition>,
}

impl SpecType {
    /// Create a spec type without attribute definitions.
    #[must_use]
    pub const fn new(identity: Identity, kind: SpecTypeKind) -> Self {
        Self {
            identity,
            kind,
            attributes: Vec::new(),
        }
    }

    /// Which kind of element this type describes.
    #[must_use]
    pub const fn kind(&self) -> SpecTypeKind {
        self.kind
    }

    /// Find an attribute definition by identifier.
    #[must_use]
    pub fn attribute(&self, identifier: &str) -> Option<&AttributeDefinition> {
        self.attributes
            .iter()
            .find(|definition| definition.identifier() == identifier)
    }

    /// Find an attribute definition by its human readable name.
    #[must_use]
    pub fn attribute_by_name(&self, long_name: &str) -> Option<&AttributeDefinition> {
        self.attributes
            .iter()
            .find(|definition| definition.long_name() == Some(long_name))
    }
}

impl Identifiable for SpecType {
    const KIND: &'static str = "SpecType";

    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }
}

/// Kind specific part of an [`AttributeDefinition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeDefinitionKind {
    /// `ATTRIBUTE-DEFINITION-BOOLEAN`
    Boolean,
    /// `ATTRIBUTE-DEFINITION-DATE`
    Date,
    /// `ATTRIBUTE-DEFINITION-ENUMERATION`
    Enumeration {
        /// Whether more than one literal may be selected.
        multi_valued: bool,
    },
    /// `ATTRIBUTE-DEFINITION-INTEGER`
    Integer,
    /// `ATTRIBUTE-DEFINITION-REAL`
    Real,
    /// `ATTRIBUTE-DEFINITION-STRING`
    String,
    /// `ATTRIBUTE-DEFINITION-XHTML`
    Xhtml,
}

impl AttributeDefinitionKind {
    /// The kind for the given discriminant; enumerations start single-valued.
    #[must_use]
    pub const fn from_data_kind(kind: DataKind) -> Self {
        match kind {
            DataKind::Boolean => Self::Boolean,
            DataKind::Date => Self::Date,
            DataKind::Enumeration => Self::Enumeration {
                multi_valued: false,
            },
            DataKind::Integer => Self::Integer,
            DataKind::Real => Self::Real,
            DataKind::String => Self::String,
            DataKind::Xhtml => Self::Xhtml,
        }
    }

    /// The shared discriminant.
    #[must_use]
    pub const fn data_kind(self) -> DataKind {
        match self {
            Self::Boolean => DataKind::Boolean,
            Self::Date => DataKind::Date,
            Self::Enumeration { .. } => DataKind::Enumeration,
            Self::Integer => DataKind::Integer,
            Self::Real => DataKind::Real,
            Self::String => DataKind::String,
            Self::Xhtml => DataKind::Xhtml,
        }
    }
}

/// Declares an attribute that elements of a spec type may carry.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDefinition {
    identity: Identity,
    kind: AttributeDefinitionKind,
    /// Whether tools may edit values of this attribute.
    pub is_editable: Option<bool>,
    datatype: Option<Ref<DatatypeDefinition>>,
    default_value: Option<AttributeValue>,
}

/// Returned when a value of the wrong kind is attached to a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a {actual:?} value cannot be the default of a {expected:?} attribute definition")]
pub struct KindMismatch {
    /// Kind of the definition.
    pub expected: DataKind,
    /// Kind of the rejected value.
    pub actual: DataKind,
}

impl AttributeDefinition {
    /// Create a definition of the given kind with no datatype bound yet.
    #[must_use]
    pub const fn new(identity: Identity, kind: AttributeDefinitionKind) -> Self {
        Self {
            identity,
            kind,
            is_editable: None,
            datatype: None,
            default_value: None,
        }
    }

    /// The kind specific part.
    #[must_use]
    pub const fn kind(&self) -> AttributeDefinitionKind {
        self.kind
    }

    /// The shared discriminant.
    #[must_use]
    pub const fn data_kind(&self) -> DataKind {
        self.kind.data_kind()
    }

    /// Whether this enumeration definition allows several literals.
    ///
    /// Always `false` for other kinds.
    #[must_use]
    pub const fn is_multi_valued(&self) -> bool {
        matches!(
            self.kind,
            AttributeDefinitionKind::Enumeration { multi_valued: true }
        )
    }

    /// Set the multi-valued flag of an enumeration definition.
    ///
    /// Has no effect on other kinds.
    pub const fn set_multi_valued(&mut self, multi_valued: bool) {
        if let AttributeDefinitionKind::Enumeration { .. } = self.kind {
            self.kind = AttributeDefinitionKind::Enumeration { multi_valued };
        }
    }

    /// The bound data type.
    #[must_use]
    pub const fn datatype(&self) -> Option<&Ref<DatatypeDefinition>> {
        self.datatype.as_ref()
    }

    /// Bind the data type.
    pub fn set_datatype(&mut self, datatype: Option<Ref<DatatypeDefinition>>) {
        self.datatype = datatype;
    }

    /// The default value, if configured.
    #[must_use]
    pub const fn default_value(&self) -> Option<&AttributeValue> {
        self.default_value.as_ref()
    }

    /// Configure the default value.
    ///
    /// # Errors
    ///
    /// Returns [`KindMismatch`] if the value's kind differs from the
    /// definition's kind.
    pub fn set_default_value(&mut self, value: Option<AttributeValue>) -> Result<(), KindMismatch> {
        if let Some(value) = &value {
            if value.data_kind() != self.data_kind() {
                return Err(KindMismatch {
                    expected: self.data_kind(),
                    actual: value.data_kind(),
                });
            }
        }
        self.default_value = value;
        Ok(())
    }
}

impl Identifiable for AttributeDefinition {
    const KIND: &'static str = "AttributeDefinition";

    fn identity(&self) -> &Identity {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }
}
