//! Drivers that move documents between files, streams and the object graph.
//!
//! [`ReqIfDeserializer`] and [`ReqIfSerializer`] come with blocking methods
//! (see [`sync`]) and async `_async` twins (see [`aio`]). Both frontends feed
//! the same [`DocumentAssembler`](crate::xml::DocumentAssembler) and the same
//! writer, so they produce identical results.

pub mod aio;
mod archive;
mod options;
pub mod sync;
mod validation;

use std::{path::Path, sync::Arc};

use tokio_util::sync::CancellationToken;
use tracing::debug;

pub use options::{
    DeserializeOptions, SerializeOptions, SupportedFileExtension, ValidationCallback,
};
pub use validation::{SchemaValidator, Severity, StructuralValidator, ValidationIssue};

use crate::{
    domain::{Config, ReqIf},
    error::{Error, Result},
    xml,
};

/// Reads ReqIF documents.
#[derive(Clone)]
pub struct ReqIfDeserializer {
    validator: Arc<dyn SchemaValidator>,
}

impl ReqIfDeserializer {
    /// A deserializer that validates with the [`StructuralValidator`] when
    /// asked to.
    #[must_use]
    pub fn new() -> Self {
        Self {
            validator: Arc::new(StructuralValidator),
        }
    }

    /// A deserializer that validates with `validator`.
    #[must_use]
    pub fn with_validator(validator: Arc<dyn SchemaValidator>) -> Self {
        Self { validator }
    }

    fn validate(&self, document: &[u8], options: &DeserializeOptions) -> Result<()> {
        if options.validate {
            validation::run(self.validator.as_ref(), document, options)?;
        }
        Ok(())
    }
}

impl Default for ReqIfDeserializer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReqIfDeserializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqIfDeserializer").finish_non_exhaustive()
    }
}

/// Writes ReqIF documents.
#[derive(Debug, Clone, Default)]
pub struct ReqIfSerializer {
    config: Config,
}

impl ReqIfSerializer {
    /// A serializer using `config` for layout and archive compression.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Render one document to bytes.
    fn render(&self, document: &ReqIf, cancellation: &CancellationToken) -> Result<Vec<u8>> {
        xml::write_document(document, Vec::new(), &self.config, cancellation)
    }

    /// Render `documents` in the container `kind` calls for.
    ///
    /// `stem` names archive entries.
    fn render_all(
        &self,
        documents: &[ReqIf],
        kind: SupportedFileExtension,
        stem: &str,
        cancellation: &CancellationToken,
    ) -> Result<Vec<u8>> {
        check_document_count(documents, kind)?;
        match kind {
            SupportedFileExtension::Reqif => self.render(&documents[0], cancellation),
            SupportedFileExtension::Reqifz => {
                let count = documents.len();
                let rendered = documents
                    .iter()
                    .enumerate()
                    .map(|(index, document)| {
                        Ok((
                            archive::entry_name(stem, index, count),
                            self.render(document, cancellation)?,
                        ))
                    })
                    .collect::<Result<Vec<_>>>()?;
                debug!(documents = count, "packing archive");
                archive::pack(
                    rendered
                        .iter()
                        .map(|(name, bytes)| (name.clone(), bytes.as_slice())),
                    self.config.archive_compression,
                )
            }
        }
    }
}

fn check_document_count(documents: &[ReqIf], kind: SupportedFileExtension) -> Result<()> {
    match (kind, documents.len()) {
        (_, 0) => Err(Error::invalid_argument("there are no documents to serialize")),
        (SupportedFileExtension::Reqif, 1) | (SupportedFileExtension::Reqifz, _) => Ok(()),
        (SupportedFileExtension::Reqif, count) => Err(Error::invalid_argument(format!(
            "a .reqif file holds exactly one document, got {count}"
        ))),
    }
}

/// Archive entry stem for a target path.
fn entry_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "document".to_string(), |stem| stem.to_string_lossy().into_owned())
}

/// Entry stem used when writing an archive to a stream.
const STREAM_ENTRY_STEM: &str = "document";
