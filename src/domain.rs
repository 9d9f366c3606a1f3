//! The ReqIF object graph.
//!
//! Every entity carries an [`Identity`]. Entities refer to each other through
//! [`Ref`]s, which are resolved through the [`ReqIfContent`] aggregate.

pub mod attribute_value;
pub use attribute_value::{AttributeValue, ExternalObject, ExternalObjectSource, Value, XhtmlContent};

mod config;
pub use config::{Compression, Config};

pub mod content;
pub use content::{Collection, ReqIfContent};

pub mod datatype;
pub use datatype::{DataKind, DatatypeDefinition, DatatypeKind, EmbeddedValue, EnumValue};

mod document;
pub use document::{REQIF_NAMESPACE, ReqIf, ToolExtension, XHTML_NAMESPACE};

mod header;
pub use header::ReqIfHeader;

pub mod identifiable;
pub use identifiable::{AlternativeId, Identifiable, Identity, Ref};

pub mod spec_element;
pub use spec_element::{
    RelationGroup, SpecElementKind, SpecElementWithAttributes, SpecHierarchy, SpecObject,
    SpecRelation, Specification,
};

pub mod spec_type;
pub use spec_type::{
    AttributeDefinition, AttributeDefinitionKind, KindMismatch, SpecType, SpecTypeKind,
};
