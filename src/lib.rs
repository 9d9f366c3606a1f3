//! Lossless reading and writing of ReqIF requirements interchange documents
//!
//! A ReqIF document is a graph of typed entities linked by identifiers. This
//! crate reads `.reqif` files and `.reqifz` archives into a fully resolved
//! [`ReqIf`] graph and writes the graph back out. Reading and writing are
//! available as blocking calls and as cancellable async calls that produce
//! identical results.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use reqif::{DeserializeOptions, ReqIfDeserializer};
//!
//! let documents = ReqIfDeserializer::new()
//!     .deserialize(Path::new("spec.reqifz"), &DeserializeOptions::default())?;
//! for object in &documents[0].content.spec_objects {
//!     println!("{object:?}");
//! }
//! # Ok::<(), reqif::Error>(())
//! ```

pub mod domain;
pub use domain::{
    AlternativeId, AttributeDefinition, AttributeDefinitionKind, AttributeValue, Compression,
    Config, DataKind, DatatypeDefinition, DatatypeKind, EmbeddedValue, EnumValue, ExternalObject,
    ExternalObjectSource, Identifiable, Identity, REQIF_NAMESPACE, Ref, RelationGroup, ReqIf,
    ReqIfContent, ReqIfHeader, SpecElementWithAttributes, SpecHierarchy, SpecObject, SpecRelation,
    SpecType, SpecTypeKind, Specification, ToolExtension, Value, XHTML_NAMESPACE, XhtmlContent,
};

mod error;
pub use error::{Error, FormatError, Result, SchemaValidationError, SerializationError};

/// Blocking and async drivers for files and streams.
pub mod io;
pub use io::{
    DeserializeOptions, ReqIfDeserializer, ReqIfSerializer, SchemaValidator, SerializeOptions,
    Severity, StructuralValidator, SupportedFileExtension, ValidationIssue,
};

/// The XML codec behind the drivers.
pub mod xml;
