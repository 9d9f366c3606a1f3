//! Error types shared by the reader, the writer and the drivers.

use std::io;

/// Errors returned by the ReqIF codec.
///
/// Unknown elements, dangling references and numeric overflow are recovered
/// locally and never surface here. Everything else is fatal for the call that
/// produced it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The call parameters are inconsistent or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A required resource (such as a document entry in an archive) is
    /// missing.
    #[error("not found: {0}")]
    NotFound(String),

    /// An attribute or element value could not be parsed.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The object graph cannot be written.
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// The schema validator rejected the document.
    #[error(transparent)]
    SchemaValidation(#[from] SchemaValidationError),

    /// Cancellation was requested before the operation completed.
    #[error("the operation was cancelled")]
    Cancelled,

    /// An element name does not map to any known kind.
    #[error("unsupported {category} kind '{name}'")]
    UnsupportedKind {
        /// The family of kinds that was searched (e.g. "datatype").
        category: &'static str,
        /// The offending element name.
        name: String,
    },

    /// The input is not well-formed XML.
    #[error("malformed XML at byte {position}: {message}")]
    Xml {
        /// Byte offset into the document where the problem was detected.
        position: u64,
        /// Description from the XML tokenizer.
        message: String,
    },

    /// An I/O error occurred.
    #[error("I/O error")]
    Io(#[from] io::Error),

    /// The archive container could not be read or written.
    #[error("archive error")]
    Archive(#[from] zip::result::ZipError),
}

impl Error {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn xml(position: u64, error: impl std::fmt::Display) -> Self {
        Self::Xml {
            position,
            message: error.to_string(),
        }
    }
}

/// A value in the document could not be parsed into its typed form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot parse {attribute}=\"{value}\" on <{element}> at byte {position}: {reason}")]
pub struct FormatError {
    /// Element carrying the value.
    pub element: String,
    /// Attribute (or child element) holding the value.
    pub attribute: String,
    /// The raw text that failed to parse.
    pub value: String,
    /// Byte offset of the element in the source document.
    pub position: u64,
    /// Why parsing failed.
    pub reason: String,
}

/// The graph violates a constraint that must hold at write time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} '{}'{} {}", .kind, .identifier, display_name(.long_name.as_deref()), .problem)]
pub struct SerializationError {
    /// The kind of entity at fault, e.g. `SpecObject`.
    pub kind: &'static str,
    /// Identifier of the entity at fault (may be empty).
    pub identifier: String,
    /// Human readable name of the entity, if it has one.
    pub long_name: Option<String>,
    /// What is wrong.
    pub problem: String,
}

fn display_name(long_name: Option<&str>) -> String {
    long_name.map(|name| format!(" ({name})")).unwrap_or_default()
}

impl SerializationError {
    pub(crate) fn missing_reference(
        kind: &'static str,
        identity: &crate::domain::Identity,
        field: &str,
    ) -> Self {
        Self {
            kind,
            identifier: identity.identifier().to_string(),
            long_name: identity.long_name().map(ToString::to_string),
            problem: format!("has no {field} reference"),
        }
    }

    pub(crate) fn missing_identifier(
        kind: &'static str,
        identity: &crate::domain::Identity,
    ) -> Self {
        Self {
            kind,
            identifier: String::new(),
            long_name: identity.long_name().map(ToString::to_string),
            problem: "has an empty identifier".to_string(),
        }
    }
}

/// Raised by a [`SchemaValidator`](crate::SchemaValidator) when a document
/// does not conform to the ReqIF schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("schema validation failed: {message}")]
pub struct SchemaValidationError {
    /// Description of the first violation.
    pub message: String,
    /// 1-based line of the violation, when known.
    pub line: Option<u64>,
    /// 1-based column of the violation, when known.
    pub column: Option<u64>,
}

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;
