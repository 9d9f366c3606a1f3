//! Blocking and async drivers over files, streams and archives.

use std::path::PathBuf;

use reqif::{
    DeserializeOptions, Error, ReqIf, ReqIfDeserializer, ReqIfSerializer, SerializeOptions,
    SupportedFileExtension,
};
use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/sample.reqif")
}

fn cancelled() -> CancellationToken {
    let token = CancellationToken::new();
    token.cancel();
    token
}

#[tokio::test]
async fn blocking_and_async_reads_agree() {
    let deserializer = ReqIfDeserializer::new();
    let options = DeserializeOptions::default();

    let blocking = deserializer.deserialize(&sample_path(), &options).unwrap();
    let suspended = deserializer
        .deserialize_async(&sample_path(), &options)
        .await
        .unwrap();
    assert_eq!(blocking, suspended);

    let serializer = ReqIfSerializer::default();
    let mut blocking_bytes = Vec::new();
    serializer
        .serialize_writer(
            &blocking,
            &mut blocking_bytes,
            SupportedFileExtension::Reqif,
            &SerializeOptions::default(),
        )
        .unwrap();
    let mut async_bytes = Vec::new();
    serializer
        .serialize_writer_async(
            &suspended,
            &mut async_bytes,
            SupportedFileExtension::Reqif,
            &SerializeOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(blocking_bytes, async_bytes);
}

#[tokio::test]
async fn cancelled_reads_fail_on_both_paths() {
    let deserializer = ReqIfDeserializer::new();
    let options = DeserializeOptions::default().with_cancellation(cancelled());

    assert!(matches!(
        deserializer.deserialize(&sample_path(), &options),
        Err(Error::Cancelled)
    ));
    assert!(matches!(
        deserializer.deserialize_async(&sample_path(), &options).await,
        Err(Error::Cancelled)
    ));
}

#[tokio::test]
async fn cancellation_during_a_read_is_observed() {
    let token = CancellationToken::new();
    let options = DeserializeOptions::default().with_cancellation(token.clone());
    let bytes = std::fs::read(sample_path()).unwrap();

    // The token fires after the first chunk of the stream has been consumed.
    let (head, tail) = bytes.split_at(64);
    let reader = head.chain(CancelOnRead { token, rest: tail });
    let result = ReqIfDeserializer::new()
        .deserialize_reader_async(
            tokio::io::BufReader::new(reader),
            SupportedFileExtension::Reqif,
            &options,
        )
        .await;
    assert!(matches!(result, Err(Error::Cancelled)));
}

/// Cancels `token` the first time it is read from.
struct CancelOnRead<'a> {
    token: CancellationToken,
    rest: &'a [u8],
}

impl AsyncRead for CancelOnRead<'_> {
    fn poll_read(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> std::task::Poll<std::io::Result<()>> {
        self.token.cancel();
        let mut rest = self.rest;
        let poll = std::pin::Pin::new(&mut rest).poll_read(cx, buf);
        self.rest = rest;
        poll
    }
}

#[tokio::test]
async fn cancelled_writes_fail_on_both_paths() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.reqif");
    let documents = [ReqIf::new("Cancelled")];
    let serializer = ReqIfSerializer::default();
    let options = SerializeOptions::with_cancellation(cancelled());

    assert!(matches!(
        serializer.serialize(&documents, &path, &options),
        Err(Error::Cancelled)
    ));
    assert!(matches!(
        serializer.serialize_async(&documents, &path, &options).await,
        Err(Error::Cancelled)
    ));
    assert!(!path.exists());
}

#[test]
fn archive_round_trip_keeps_document_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bundle.reqifz");
    let documents = [ReqIf::new("First"), ReqIf::new("Second")];

    ReqIfSerializer::default()
        .serialize(&documents, &path, &SerializeOptions::default())
        .unwrap();
    let read = ReqIfDeserializer::new()
        .deserialize(&path, &DeserializeOptions::default())
        .unwrap();

    let titles: Vec<_> = read
        .iter()
        .map(|document| document.header.title.as_deref())
        .collect();
    assert_eq!(titles, [Some("First"), Some("Second")]);
}

#[tokio::test]
async fn async_archive_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bundle.zip");
    let sample = ReqIfDeserializer::new()
        .deserialize(&sample_path(), &DeserializeOptions::default())
        .unwrap();
    let documents = [sample[0].clone(), ReqIf::new("Second")];

    ReqIfSerializer::default()
        .serialize_async(&documents, &path, &SerializeOptions::default())
        .await
        .unwrap();
    let read = ReqIfDeserializer::new()
        .deserialize_async(&path, &DeserializeOptions::default().validated())
        .await
        .unwrap();

    assert_eq!(read.len(), 2);
    assert_eq!(read[0], documents[0]);
}

#[test]
fn single_document_target_rejects_two_documents() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("one.reqif");
    let documents = [ReqIf::new("a"), ReqIf::new("b")];

    let result = ReqIfSerializer::default().serialize(&documents, &path, &SerializeOptions::default());
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert!(!path.exists());
}

#[test]
fn argument_contracts() {
    let deserializer = ReqIfDeserializer::new();

    let empty_path = deserializer.deserialize(&PathBuf::new(), &DeserializeOptions::default());
    assert!(matches!(empty_path, Err(Error::InvalidArgument(_))));

    let unsupported =
        deserializer.deserialize(&PathBuf::from("spec.docx"), &DeserializeOptions::default());
    assert!(matches!(unsupported, Err(Error::InvalidArgument(_))));

    let mut options = DeserializeOptions::default().with_validation_callback(|_| {});
    options.validate = false;
    let callback_without_validation = deserializer.deserialize(&sample_path(), &options);
    assert!(matches!(
        callback_without_validation,
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn archive_without_documents_is_not_found() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.reqifz");
    {
        let file = std::fs::File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file("readme.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        std::io::Write::write_all(&mut zip, b"no documents here").unwrap();
        zip.finish().unwrap();
    }

    let result = ReqIfDeserializer::new().deserialize(&path, &DeserializeOptions::default());
    assert!(matches!(result, Err(Error::NotFound(_))));
}
