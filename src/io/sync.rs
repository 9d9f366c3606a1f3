//! Blocking frontend.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Read, Write},
    path::Path,
};

use quick_xml::{Reader, events::Event};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::{
    DeserializeOptions, ReqIfDeserializer, ReqIfSerializer, STREAM_ENTRY_STEM, SerializeOptions,
    SupportedFileExtension, archive::Entries, check_document_count, entry_stem,
    options::checkpoint,
};
use crate::{
    domain::ReqIf,
    error::{Error, Result},
    xml::{self, DocumentAssembler, LineTracker, Token},
};

/// Read one document from a byte source.
pub(crate) fn read_document<R: Read>(source: R, cancellation: &CancellationToken) -> Result<ReqIf> {
    let mut reader = Reader::from_reader(BufReader::new(LineTracker::new(source)));
    let mut assembler = DocumentAssembler::new(cancellation.clone());
    let mut buf = Vec::new();
    loop {
        let offset = xml::position(reader.buffer_position());
        let location = reader.get_mut().get_mut().locate(offset);
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| Error::xml(xml::position(reader.buffer_position()), e))?;
        if matches!(event, Event::Eof) {
            break;
        }
        if let Some(token) = Token::from_event(&event, location)? {
            assembler.feed(token)?;
        }
        buf.clear();
    }
    assembler.finish()
}

impl ReqIfDeserializer {
    /// Read every document in the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty path, an unsupported
    /// extension or inconsistent options, [`Error::NotFound`] for an archive
    /// without documents, and any error raised while reading.
    #[instrument(skip(self, options), fields(path = %path.display()))]
    pub fn deserialize(&self, path: &Path, options: &DeserializeOptions) -> Result<Vec<ReqIf>> {
        let kind = SupportedFileExtension::from_path(path)?;
        options.check()?;
        let file = File::open(path)?;
        self.deserialize_reader(BufReader::new(file), kind, options)
    }

    /// Read every document in `reader`, which holds a `kind` container.
    ///
    /// The stream is left open.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty stream or inconsistent
    /// options, [`Error::NotFound`] for an archive without documents, and any
    /// error raised while reading.
    #[instrument(skip(self, reader, options))]
    pub fn deserialize_reader<R: BufRead>(
        &self,
        mut reader: R,
        kind: SupportedFileExtension,
        options: &DeserializeOptions,
    ) -> Result<Vec<ReqIf>> {
        options.check()?;
        if reader.fill_buf()?.is_empty() {
            return Err(Error::invalid_argument("the stream is empty"));
        }

        let documents = match kind {
            SupportedFileExtension::Reqif if options.validate => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes)?;
                self.validate(&bytes, options)?;
                vec![read_document(bytes.as_slice(), &options.cancellation)?]
            }
            SupportedFileExtension::Reqif => vec![read_document(reader, &options.cancellation)?],
            SupportedFileExtension::Reqifz => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes)?;
                let mut entries = Entries::open(&bytes)?;
                let mut documents = Vec::new();
                while let Some(entry) = entries.next_entry() {
                    checkpoint(&options.cancellation)?;
                    let (name, bytes) = entry?;
                    self.validate(&bytes, options)?;
                    debug!(entry = %name, "reading archive entry");
                    documents.push(read_document(bytes.as_slice(), &options.cancellation)?);
                }
                documents
            }
        };
        debug!(documents = documents.len(), "deserialized");
        Ok(documents)
    }
}

impl ReqIfSerializer {
    /// Write `documents` to `path`, creating or truncating the file.
    ///
    /// A `.reqif` target takes exactly one document; a `.reqifz` target
    /// packs one entry per document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty path, an unsupported
    /// extension or a wrong number of documents, and any error raised while
    /// writing.
    #[instrument(skip(self, documents, options), fields(path = %path.display()))]
    pub fn serialize(
        &self,
        documents: &[ReqIf],
        path: &Path,
        options: &SerializeOptions,
    ) -> Result<()> {
        let kind = SupportedFileExtension::from_path(path)?;
        check_document_count(documents, kind)?;
        checkpoint(&options.cancellation)?;
        let file = BufWriter::new(File::create(path)?);
        self.write(documents, file, kind, &entry_stem(path), options)
    }

    /// Write `documents` to `writer` as a `kind` container.
    ///
    /// The stream is flushed but left open.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a wrong number of documents,
    /// and any error raised while writing.
    #[instrument(skip(self, documents, writer, options))]
    pub fn serialize_writer<W: Write>(
        &self,
        documents: &[ReqIf],
        writer: W,
        kind: SupportedFileExtension,
        options: &SerializeOptions,
    ) -> Result<()> {
        self.write(documents, writer, kind, STREAM_ENTRY_STEM, options)
    }

    fn write<W: Write>(
        &self,
        documents: &[ReqIf],
        mut writer: W,
        kind: SupportedFileExtension,
        stem: &str,
        options: &SerializeOptions,
    ) -> Result<()> {
        check_document_count(documents, kind)?;
        match kind {
            SupportedFileExtension::Reqif => {
                let mut writer = xml::write_document(
                    &documents[0],
                    writer,
                    self.config(),
                    &options.cancellation,
                )?;
                writer.flush()?;
            }
            SupportedFileExtension::Reqifz => {
                let bytes = self.render_all(documents, kind, stem, &options.cancellation)?;
                writer.write_all(&bytes)?;
                writer.flush()?;
            }
        }
        debug!(documents = documents.len(), "serialized");
        Ok(())
    }
}
