//! `.reqifz` containers.
//!
//! An archive is held in memory; document entries are extracted one at a
//! time in archive order. Entries that are not `.reqif` documents (images,
//! OLE objects) are left alone.

use std::io::{Cursor, Read, Write};

use tracing::{debug, trace};
use zip::{CompressionMethod, ZipArchive, ZipWriter, write::SimpleFileOptions};

use crate::{
    domain::Compression,
    error::{Error, Result},
};

fn is_document(name: &str) -> bool {
    std::path::Path::new(name)
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("reqif"))
}

/// The document entries of an archive.
pub(crate) struct Entries<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    indices: std::vec::IntoIter<usize>,
}

impl<'a> Entries<'a> {
    /// Open `bytes` as an archive.
    ///
    /// Fails with [`Error::NotFound`] if the archive holds no `.reqif` entry.
    pub(crate) fn open(bytes: &'a [u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut indices = Vec::new();
        for index in 0..archive.len() {
            if is_document(archive.by_index_raw(index)?.name()) {
                indices.push(index);
            }
        }
        if indices.is_empty() {
            return Err(Error::NotFound(
                "the archive contains no .reqif document".to_string(),
            ));
        }
        debug!(documents = indices.len(), entries = archive.len(), "opened archive");
        Ok(Self {
            archive,
            indices: indices.into_iter(),
        })
    }

    /// Extract the next document entry.
    pub(crate) fn next_entry(&mut self) -> Option<Result<(String, Vec<u8>)>> {
        let index = self.indices.next()?;
        Some(self.extract(index))
    }

    fn extract(&mut self, index: usize) -> Result<(String, Vec<u8>)> {
        let mut entry = self.archive.by_index(index)?;
        let name = entry.name().to_string();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        trace!(entry = %name, bytes = bytes.len(), "extracted archive entry");
        Ok((name, bytes))
    }
}

/// Entry name for document `index` (0-based) of `count`.
pub(crate) fn entry_name(stem: &str, index: usize, count: usize) -> String {
    if count == 1 {
        format!("{stem}.reqif")
    } else {
        format!("{stem}-{}.reqif", index + 1)
    }
}

/// Pack already rendered documents into an archive.
pub(crate) fn pack<'a>(
    documents: impl IntoIterator<Item = (String, &'a [u8])>,
    compression: Compression,
) -> Result<Vec<u8>> {
    let method = match compression {
        Compression::Stored => CompressionMethod::Stored,
        Compression::Deflated => CompressionMethod::Deflated,
    };
    let options = SimpleFileOptions::default().compression_method(method);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in documents {
        writer.start_file(name, options)?;
        writer.write_all(bytes)?;
    }
    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_named_by_position() {
        assert_eq!(entry_name("spec", 0, 1), "spec.reqif");
        assert_eq!(entry_name("spec", 0, 2), "spec-1.reqif");
        assert_eq!(entry_name("spec", 1, 2), "spec-2.reqif");
    }

    #[test]
    fn only_documents_are_extracted_in_order() {
        let archive = pack(
            [
                ("b.reqif".to_string(), b"<b/>".as_slice()),
                ("image.png".to_string(), b"png".as_slice()),
                ("a.REQIF".to_string(), b"<a/>".as_slice()),
            ],
            Compression::Deflated,
        )
        .unwrap();

        let mut entries = Entries::open(&archive).unwrap();
        let (name, bytes) = entries.next_entry().unwrap().unwrap();
        assert_eq!(name, "b.reqif");
        assert_eq!(bytes, b"<b/>");
        let (name, _) = entries.next_entry().unwrap().unwrap();
        assert_eq!(name, "a.REQIF");
        assert!(entries.next_entry().is_none());
    }

    #[test]
    fn archive_without_documents_is_not_found() {
        let archive = pack(
            [("readme.txt".to_string(), b"hello".as_slice())],
            Compression::Stored,
        )
        .unwrap();
        assert!(matches!(Entries::open(&archive), Err(Error::NotFound(_))));
    }

    #[test]
    fn garbage_is_an_archive_error() {
        assert!(matches!(
            Entries::open(b"not a zip"),
            Err(Error::Archive(_))
        ));
    }
}
