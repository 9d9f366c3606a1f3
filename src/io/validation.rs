//! The schema validation boundary.
//!
//! Full XSD validation is left to an implementation of [`SchemaValidator`]
//! supplied by the caller. [`StructuralValidator`] is the built-in fallback:
//! it checks that the bytes are well-formed XML with a `REQ-IF` root.

use quick_xml::{Reader, events::Event};
use tracing::debug;

use super::options::DeserializeOptions;
use crate::{
    domain::REQIF_NAMESPACE,
    error::{Result, SchemaValidationError},
    xml::{self, Location},
};

/// How serious a [`ValidationIssue`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// The document is readable but deviates from the schema.
    Warning,
    /// The document violates the schema.
    Error,
}

/// One finding of a [`SchemaValidator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// How serious the finding is.
    pub severity: Severity,
    /// Human readable description.
    pub message: String,
    /// 1-based line, when known.
    pub line: Option<u64>,
    /// 1-based column, when known.
    pub column: Option<u64>,
}

impl ValidationIssue {
    /// An issue located at byte `offset` of `document`.
    #[must_use]
    pub fn at(severity: Severity, message: impl Into<String>, document: &[u8], offset: u64) -> Self {
        let location = Location::in_document(document, offset);
        Self {
            severity,
            message: message.into(),
            line: Some(location.line),
            column: Some(location.column),
        }
    }
}

impl From<ValidationIssue> for SchemaValidationError {
    fn from(issue: ValidationIssue) -> Self {
        Self {
            message: issue.message,
            line: issue.line,
            column: issue.column,
        }
    }
}

/// Checks a serialized document against the ReqIF schema.
pub trait SchemaValidator: Send + Sync {
    /// Validate one document.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaValidationError`] if the validator itself cannot run
    /// (for example if its schema resources are unavailable). Findings about
    /// the document are returned as issues.
    fn validate(&self, document: &[u8]) -> std::result::Result<Vec<ValidationIssue>, SchemaValidationError>;
}

/// Well-formedness and root element checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl SchemaValidator for StructuralValidator {
    fn validate(
        &self,
        document: &[u8],
    ) -> std::result::Result<Vec<ValidationIssue>, SchemaValidationError> {
        let mut issues = Vec::new();
        let mut reader = Reader::from_reader(document);
        let mut buf = Vec::new();
        let mut root_seen = false;
        loop {
            let offset = xml::position(reader.buffer_position());
            let event = match reader.read_event_into(&mut buf) {
                Ok(event) => event,
                Err(error) => {
                    issues.push(ValidationIssue::at(
                        Severity::Error,
                        error.to_string(),
                        document,
                        xml::position(reader.buffer_position()),
                    ));
                    break;
                }
            };
            match event {
                Event::Eof => break,
                Event::Start(tag) | Event::Empty(tag) if !root_seen => {
                    root_seen = true;
                    let name = String::from_utf8_lossy(tag.local_name().as_ref()).into_owned();
                    if name != "REQ-IF" {
                        issues.push(ValidationIssue::at(
                            Severity::Error,
                            format!("the root element is <{name}>, expected <REQ-IF>"),
                            document,
                            offset,
                        ));
                        break;
                    }
                    let namespace = tag
                        .try_get_attribute("xmlns")
                        .ok()
                        .flatten()
                        .map(|attribute| String::from_utf8_lossy(&attribute.value).into_owned());
                    if namespace.as_deref() != Some(REQIF_NAMESPACE) {
                        issues.push(ValidationIssue::at(
                            Severity::Warning,
                            format!("the root element is not in the {REQIF_NAMESPACE} namespace"),
                            document,
                            offset,
                        ));
                    }
                }
                _ => {}
            }
            buf.clear();
        }
        if !root_seen && issues.is_empty() {
            issues.push(ValidationIssue {
                severity: Severity::Error,
                message: "the document has no root element".to_string(),
                line: None,
                column: None,
            });
        }
        Ok(issues)
    }
}

/// Run `validator` over `document` and apply the options' reporting policy.
pub(crate) fn run(
    validator: &dyn SchemaValidator,
    document: &[u8],
    options: &DeserializeOptions,
) -> Result<()> {
    let issues = validator.validate(document)?;
    debug!(issues = issues.len(), "validated document");
    if let Some(callback) = &options.validation_callback {
        for issue in &issues {
            callback(issue);
        }
        return Ok(());
    }
    match issues.into_iter().find(|issue| issue.severity == Severity::Error) {
        Some(issue) => Err(SchemaValidationError::from(issue).into()),
        None => Ok(()),
    }
}
