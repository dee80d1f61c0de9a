//! Container backend.
//!
//! The package format only needs three things from its container: append a
//! named entry, list entry names in order, and read one entry by name. The
//! traits here capture exactly that; the zip implementations are what the
//! writer and reader use by default. Entries are stored uncompressed.

use crate::error::{PackageError, PackageResult};
use std::io::{Cursor, Read, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Name of the distinguished manifest entry.
pub const MANIFEST_ENTRY: &str = "manifest.json";

/// Write side of a container.
pub trait ArchiveSink {
    /// What finishing the container hands back (bytes, a file handle, ...).
    type Output;

    fn create_entry(&mut self, name: &str, bytes: &[u8]) -> PackageResult<()>;

    /// Finalizes the container. Called exactly once, by `seal`.
    fn finish(self) -> PackageResult<Self::Output>;
}

/// Read side of a container.
pub trait ArchiveSource {
    /// Entry names in container order. Directory entries are excluded.
    fn list_entries(&self) -> Vec<String>;

    fn read_entry(&mut self, name: &str) -> PackageResult<Vec<u8>>;
}

/// Zip writer over any seekable sink.
pub struct ZipSink<W: Write + Seek> {
    writer: ZipWriter<W>,
}

impl ZipSink<Cursor<Vec<u8>>> {
    /// Builds the container in memory.
    pub fn in_memory() -> Self {
        Self::new(Cursor::new(Vec::new()))
    }
}

impl<W: Write + Seek> ZipSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: ZipWriter::new(inner),
        }
    }
}

impl<W: Write + Seek> ArchiveSink for ZipSink<W> {
    type Output = W;

    fn create_entry(&mut self, name: &str, bytes: &[u8]) -> PackageResult<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        self.writer.start_file(name, options)?;
        self.writer.write_all(bytes)?;
        Ok(())
    }

    fn finish(self) -> PackageResult<W> {
        Ok(self.writer.finish()?)
    }
}

/// Zip reader over any seekable source.
pub struct ZipSource<R: Read + Seek> {
    archive: ZipArchive<R>,
    names: Vec<String>,
}

impl ZipSource<Cursor<Vec<u8>>> {
    pub fn from_bytes(bytes: Vec<u8>) -> PackageResult<Self> {
        Self::new(Cursor::new(bytes))
    }
}

impl<R: Read + Seek> ZipSource<R> {
    /// Reads the central directory. Entry bodies are not touched, so an
    /// entry that cannot be decoded only fails when it is read.
    pub fn new(inner: R) -> PackageResult<Self> {
        let mut archive = ZipArchive::new(inner)?;
        let mut names = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let entry = archive.by_index_raw(index)?;
            if !entry.is_dir() {
                names.push(entry.name().to_string());
            }
        }
        Ok(Self { archive, names })
    }
}

impl<R: Read + Seek> ArchiveSource for ZipSource<R> {
    fn list_entries(&self) -> Vec<String> {
        self.names.clone()
    }

    fn read_entry(&mut self, name: &str) -> PackageResult<Vec<u8>> {
        let mut entry = self.archive.by_name(name).map_err(|e| match e {
            zip::result::ZipError::FileNotFound => {
                PackageError::Archive(format!("no entry named {name}"))
            }
            other => PackageError::from(other),
        })?;
        let mut bytes = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}
