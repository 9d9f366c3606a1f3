//! Element-name dispatch.
//!
//! Each name table is an exhaustive match on the kind enum, so adding a kind
//! fails to compile until every table knows about it. The reverse direction
//! (name to kind) searches `ALL` through the same tables, so the two
//! directions cannot drift apart.

use tracing::warn;

use crate::{
    domain::{
        AttributeDefinition, AttributeDefinitionKind, AttributeValue, DataKind,
        DatatypeDefinition, DatatypeKind, Identity, Ref, SpecType, SpecTypeKind, Value,
    },
    error::{Error, Result},
};

impl DataKind {
    /// `DATATYPE-DEFINITION-*`
    #[must_use]
    pub const fn datatype_element(self) -> &'static str {
        match self {
            Self::Boolean => "DATATYPE-DEFINITION-BOOLEAN",
            Self::Date => "DATATYPE-DEFINITION-DATE",
            Self::Enumeration => "DATATYPE-DEFINITION-ENUMERATION",
            Self::Integer => "DATATYPE-DEFINITION-INTEGER",
            Self::Real => "DATATYPE-DEFINITION-REAL",
            Self::String => "DATATYPE-DEFINITION-STRING",
            Self::Xhtml => "DATATYPE-DEFINITION-XHTML",
        }
    }

    /// `DATATYPE-DEFINITION-*-REF`
    #[must_use]
    pub const fn datatype_ref_element(self) -> &'static str {
        match self {
            Self::Boolean => "DATATYPE-DEFINITION-BOOLEAN-REF",
            Self::Date => "DATATYPE-DEFINITION-DATE-REF",
            Self::Enumeration => "DATATYPE-DEFINITION-ENUMERATION-REF",
            Self::Integer => "DATATYPE-DEFINITION-INTEGER-REF",
            Self::Real => "DATATYPE-DEFINITION-REAL-REF",
            Self::String => "DATATYPE-DEFINITION-STRING-REF",
            Self::Xhtml => "DATATYPE-DEFINITION-XHTML-REF",
        }
    }

    /// `ATTRIBUTE-DEFINITION-*`
    #[must_use]
    pub const fn attribute_definition_element(self) -> &'static str {
        match self {
            Self::Boolean => "ATTRIBUTE-DEFINITION-BOOLEAN",
            Self::Date => "ATTRIBUTE-DEFINITION-DATE",
            Self::Enumeration => "ATTRIBUTE-DEFINITION-ENUMERATION",
            Self::Integer => "ATTRIBUTE-DEFINITION-INTEGER",
            Self::Real => "ATTRIBUTE-DEFINITION-REAL",
            Self::String => "ATTRIBUTE-DEFINITION-STRING",
            Self::Xhtml => "ATTRIBUTE-DEFINITION-XHTML",
        }
    }

    /// `ATTRIBUTE-DEFINITION-*-REF`
    #[must_use]
    pub const fn attribute_definition_ref_element(self) -> &'static str {
        match self {
            Self::Boolean => "ATTRIBUTE-DEFINITION-BOOLEAN-REF",
            Self::Date => "ATTRIBUTE-DEFINITION-DATE-REF",
            Self::Enumeration => "ATTRIBUTE-DEFINITION-ENUMERATION-REF",
            Self::Integer => "ATTRIBUTE-DEFINITION-INTEGER-REF",
            Self::Real => "ATTRIBUTE-DEFINITION-REAL-REF",
            Self::String => "ATTRIBUTE-DEFINITION-STRING-REF",
            Self::Xhtml => "ATTRIBUTE-DEFINITION-XHTML-REF",
        }
    }

    /// `ATTRIBUTE-VALUE-*`
    #[must_use]
    pub const fn attribute_value_element(self) -> &'static str {
        match self {
            Self::Boolean => "ATTRIBUTE-VALUE-BOOLEAN",
            Self::Date => "ATTRIBUTE-VALUE-DATE",
            Self::Enumeration => "ATTRIBUTE-VALUE-ENUMERATION",
            Self::Integer => "ATTRIBUTE-VALUE-INTEGER",
            Self::Real => "ATTRIBUTE-VALUE-REAL",
            Self::String => "ATTRIBUTE-VALUE-STRING",
            Self::Xhtml => "ATTRIBUTE-VALUE-XHTML",
        }
    }
}

impl SpecTypeKind {
    /// `SPEC-OBJECT-TYPE`, `SPECIFICATION-TYPE`, ...
    #[must_use]
    pub const fn element(self) -> &'static str {
        match self {
            Self::SpecObjectType => "SPEC-OBJECT-TYPE",
            Self::SpecificationType => "SPECIFICATION-TYPE",
            Self::SpecRelationType => "SPEC-RELATION-TYPE",
            Self::RelationGroupType => "RELATION-GROUP-TYPE",
        }
    }

    /// `SPEC-OBJECT-TYPE-REF`, `SPECIFICATION-TYPE-REF`, ...
    #[must_use]
    pub const fn ref_element(self) -> &'static str {
        match self {
            Self::SpecObjectType => "SPEC-OBJECT-TYPE-REF",
            Self::SpecificationType => "SPECIFICATION-TYPE-REF",
            Self::SpecRelationType => "SPEC-RELATION-TYPE-REF",
            Self::RelationGroupType => "RELATION-GROUP-TYPE-REF",
        }
    }
}

fn data_kind_named(name: &str, table: fn(DataKind) -> &'static str) -> Option<DataKind> {
    DataKind::ALL.into_iter().find(|&kind| table(kind) == name)
}

/// The datatype kind for a `DATATYPE-DEFINITION-*` element.
///
/// # Errors
///
/// Returns [`Error::UnsupportedKind`] for any other name.
pub fn datatype_kind(name: &str) -> Result<DataKind> {
    data_kind_named(name, DataKind::datatype_element).ok_or_else(|| Error::UnsupportedKind {
        category: "datatype",
        name: name.to_string(),
    })
}

/// The kind for an `ATTRIBUTE-DEFINITION-*` element.
///
/// # Errors
///
/// Returns [`Error::UnsupportedKind`] for any other name.
pub fn attribute_definition_kind(name: &str) -> Result<DataKind> {
    data_kind_named(name, DataKind::attribute_definition_element).ok_or_else(|| {
        Error::UnsupportedKind {
            category: "attribute definition",
            name: name.to_string(),
        }
    })
}

/// The kind for an `ATTRIBUTE-VALUE-*` element.
///
/// # Errors
///
/// Returns [`Error::UnsupportedKind`] for any other name.
pub fn attribute_value_kind(name: &str) -> Result<DataKind> {
    data_kind_named(name, DataKind::attribute_value_element).ok_or_else(|| {
        Error::UnsupportedKind {
            category: "attribute value",
            name: name.to_string(),
        }
    })
}

/// The spec type kind for a `*-TYPE` element.
///
/// # Errors
///
/// Returns [`Error::UnsupportedKind`] for any other name.
pub fn spec_type_kind(name: &str) -> Result<SpecTypeKind> {
    SpecTypeKind::ALL
        .into_iter()
        .find(|kind| kind.element() == name)
        .ok_or_else(|| Error::UnsupportedKind {
            category: "spec type",
            name: name.to_string(),
        })
}

/// Lenient lookup used while scanning `SPEC-ATTRIBUTES`: unknown names are
/// logged and yield `None`.
#[must_use]
pub fn scan_attribute_definition(name: &str) -> Option<DataKind> {
    let kind = data_kind_named(name, DataKind::attribute_definition_element);
    if kind.is_none() {
        warn!("skipping unsupported attribute definition <{name}>");
    }
    kind
}

/// Create an empty datatype definition for a `DATATYPE-DEFINITION-*` element.
///
/// # Errors
///
/// Returns [`Error::UnsupportedKind`] for any other name.
pub fn create_datatype(name: &str, identity: Identity) -> Result<DatatypeDefinition> {
    let kind = datatype_kind(name)?;
    Ok(DatatypeDefinition::new(
        identity,
        DatatypeKind::empty(kind),
    ))
}

/// Create a spec type for a `*-TYPE` element.
///
/// # Errors
///
/// Returns [`Error::UnsupportedKind`] for any other name.
pub fn create_spec_type(name: &str, identity: Identity) -> Result<SpecType> {
    Ok(SpecType::new(identity, spec_type_kind(name)?))
}

/// Create an attribute definition for an `ATTRIBUTE-DEFINITION-*` element.
///
/// # Errors
///
/// Returns [`Error::UnsupportedKind`] for any other name.
pub fn create_attribute_definition(
    name: &str,
    identity: Identity,
) -> Result<AttributeDefinition> {
    let kind = attribute_definition_kind(name)?;
    Ok(AttributeDefinition::new(
        identity,
        AttributeDefinitionKind::from_data_kind(kind),
    ))
}

/// Create an empty attribute value for an `ATTRIBUTE-VALUE-*` element.
///
/// # Errors
///
/// Returns [`Error::UnsupportedKind`] for any other name.
pub fn create_attribute_value(
    name: &str,
    definition: Ref<AttributeDefinition>,
) -> Result<AttributeValue> {
    let kind = attribute_value_kind(name)?;
    Ok(AttributeValue::new(definition, Value::empty(kind)))
}

/// Canonical element name of an instance.
pub trait ElementName {
    /// The element this instance is written as.
    fn element_name(&self) -> &'static str;
}

impl ElementName for DatatypeDefinition {
    fn element_name(&self) -> &'static str {
        self.data_kind().datatype_element()
    }
}

impl ElementName for SpecType {
    fn element_name(&self) -> &'static str {
        self.kind().element()
    }
}

impl ElementName for AttributeDefinition {
    fn element_name(&self) -> &'static str {
        self.data_kind().attribute_definition_element()
    }
}

impl ElementName for AttributeValue {
    fn element_name(&self) -> &'static str {
        self.data_kind().attribute_value_element()
    }
}
