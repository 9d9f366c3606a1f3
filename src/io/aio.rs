//! Async frontend (tokio).
//!
//! Suspends only while waiting on the stream. Parsing and rendering run the
//! same code as the blocking frontend.

use std::path::Path;

use quick_xml::{Reader, events::Event};
use tokio::{
    fs::File,
    io::{
        AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt,
        BufReader,
    },
};
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

/// Read one document from an async byte source.
pub(crate) async fn read_document<R: AsyncRead + Unpin>(
    source: R,
    cancellation: &CancellationToken,
) -> Result<ReqIf> {
    let mut reader = Reader::from_reader(BufReader::new(LineTracker::new(source)));
    let mut assembler = DocumentAssembler::new(cancellation.clone());
    let mut buf = Vec::new();
    loop {
        let offset = xml::position(reader.buffer_position());
        let location = reader.get_mut().get_mut().locate(offset);
        let event = reader
            .read_event_into_async(&mut buf)
            .await
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
    /// Async version of [`deserialize`](Self::deserialize).
    ///
    /// # Errors
    ///
    /// As [`deserialize`](Self::deserialize), plus [`Error::Cancelled`] once
    /// the options' token fires.
    #[instrument(skip(self, options), fields(path = %path.display()))]
    pub async fn deserialize_async(
        &self,
        path: &Path,
        options: &DeserializeOptions,
    ) -> Result<Vec<ReqIf>> {
        let kind = SupportedFileExtension::from_path(path)?;
        options.check()?;
        let file = File::open(path).await?;
        self.deserialize_reader_async(BufReader::new(file), kind, options)
            .await
    }

    /// Async version of [`deserialize_reader`](Self::deserialize_reader).
    ///
    /// # Errors
    ///
    /// As [`deserialize_reader`](Self::deserialize_reader), plus
    /// [`Error::Cancelled`] once the options' token fires.
    #[instrument(skip(self, reader, options))]
    pub async fn deserialize_reader_async<R: AsyncBufRead + Unpin>(
        &self,
        mut reader: R,
        kind: SupportedFileExtension,
        options: &DeserializeOptions,
    ) -> Result<Vec<ReqIf>> {
        options.check()?;
        if reader.fill_buf().await?.is_empty() {
            return Err(Error::invalid_argument("the stream is empty"));
        }

        let documents = match kind {
            SupportedFileExtension::Reqif if options.validate => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes).await?;
                self.validate(&bytes, options)?;
                vec![read_document(bytes.as_slice(), &options.cancellation).await?]
            }
            SupportedFileExtension::Reqif => {
                vec![read_document(reader, &options.cancellation).await?]
            }
            SupportedFileExtension::Reqifz => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes).await?;
                let mut entries = Entries::open(&bytes)?;
                let mut documents = Vec::new();
                while let Some(entry) = entries.next_entry() {
                    checkpoint(&options.cancellation)?;
                    let (name, bytes) = entry?;
                    self.validate(&bytes, options)?;
                    debug!(entry = %name, "reading archive entry");
                    documents.push(read_document(bytes.as_slice(), &options.cancellation).await?);
                }
                documents
            }
        };
        debug!(documents = documents.len(), "deserialized");
        Ok(documents)
    }
}

impl ReqIfSerializer {
    /// Async version of [`serialize`](Self::serialize).
    ///
    /// # Errors
    ///
    /// As [`serialize`](Self::serialize), plus [`Error::Cancelled`] once the
    /// options' token fires.
    #[instrument(skip(self, documents, options), fields(path = %path.display()))]
    pub async fn serialize_async(
        &self,
        documents: &[ReqIf],
        path: &Path,
        options: &SerializeOptions,
    ) -> Result<()> {
        let kind = SupportedFileExtension::from_path(path)?;
        check_document_count(documents, kind)?;
        checkpoint(&options.cancellation)?;
        let bytes = self.render_all(documents, kind, &entry_stem(path), &options.cancellation)?;
        let mut file = File::create(path).await?;
        self.write_chunked(&bytes, &mut file, &options.cancellation)
            .await
    }

    /// Async version of [`serialize_writer`](Self::serialize_writer).
    ///
    /// # Errors
    ///
    /// As [`serialize_writer`](Self::serialize_writer), plus
    /// [`Error::Cancelled`] once the options' token fires.
    #[instrument(skip(self, documents, writer, options))]
    pub async fn serialize_writer_async<W: AsyncWrite + Unpin>(
        &self,
        documents: &[ReqIf],
        mut writer: W,
        kind: SupportedFileExtension,
        options: &SerializeOptions,
    ) -> Result<()> {
        let bytes =
            self.render_all(documents, kind, STREAM_ENTRY_STEM, &options.cancellation)?;
        self.write_chunked(&bytes, &mut writer, &options.cancellation)
            .await
    }

    async fn write_chunked<W: AsyncWrite + Unpin>(
        &self,
        bytes: &[u8],
        writer: &mut W,
        cancellation: &CancellationToken,
    ) -> Result<()> {
        for chunk in bytes.chunks(self.config().io_chunk_size()) {
            checkpoint(cancellation)?;
            writer.write_all(chunk).await?;
        }
        writer.flush().await?;
        debug!(bytes = bytes.len(), "serialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_stream_is_rejected() {
        let result = ReqIfDeserializer::new()
            .deserialize_reader_async(
                &b""[..],
                SupportedFileExtension::Reqif,
                &DeserializeOptions::default(),
            )
            .await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn writes_in_chunks() {
        let mut config = crate::Config::default();
        config.set_io_chunk_size(7);
        let serializer = ReqIfSerializer::new(config);
        let document = ReqIf::new("Chunked");

        let mut out = Vec::new();
        serializer
            .serialize_writer_async(
                std::slice::from_ref(&document),
                &mut out,
                SupportedFileExtension::Reqif,
                &SerializeOptions::default(),
            )
            .await
            .unwrap();

        let mut blocking = Vec::new();
        serializer
            .serialize_writer(
                std::slice::from_ref(&document),
                &mut blocking,
                SupportedFileExtension::Reqif,
                &SerializeOptions::default(),
            )
            .unwrap();
        assert_eq!(out, blocking);
    }

    #[tokio::test]
    async fn cancelled_write_fails() {
        let cancellation = CancellationToken::new();
        cancellation.cancel();
        let mut out = Vec::new();
        let result = ReqIfSerializer::default()
            .serialize_writer_async(
                &[ReqIf::new("x")],
                &mut out,
                SupportedFileExtension::Reqif,
                &SerializeOptions::with_cancellation(cancellation),
            )
            .await;
        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(out.is_empty());
    }
}
