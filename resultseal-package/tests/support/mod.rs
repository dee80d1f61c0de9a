//! Shared fixtures for package tests.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use resultseal_crypto::{PrivateKey, PublicKey};
use resultseal_package::{
    ArchiveSink, ArchiveSource, AuditEntry, AuditRole, PoolConfig, ReaderConfig, ResultsReader,
    ResultsWriter, WriterConfig, ZipSink, ZipSource,
};
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

const TEST_KEY_BITS: usize = 2048;

fn cached(cell: &'static OnceLock<PrivateKey>) -> &'static PrivateKey {
    cell.get_or_init(|| PrivateKey::generate(TEST_KEY_BITS).expect("test key generation"))
}

pub fn alice() -> &'static PrivateKey {
    static KEY: OnceLock<PrivateKey> = OnceLock::new();
    cached(&KEY)
}

pub fn bob() -> &'static PrivateKey {
    static KEY: OnceLock<PrivateKey> = OnceLock::new();
    cached(&KEY)
}

/// Never a recipient of anything.
pub fn carol() -> &'static PrivateKey {
    static KEY: OnceLock<PrivateKey> = OnceLock::new();
    cached(&KEY)
}

pub fn signer() -> &'static PrivateKey {
    static KEY: OnceLock<PrivateKey> = OnceLock::new();
    cached(&KEY)
}

pub fn public(key: &PrivateKey) -> PublicKey {
    key.public_key().clone()
}

pub fn created_entry() -> AuditEntry {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    AuditEntry::at("created", "user-1", AuditRole::Member, at)
}

/// Routes package logs through the test harness. Set `RUST_LOG` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

pub fn writer_for(recipients: &[&PrivateKey]) -> ResultsWriter {
    init_tracing();
    let keys = recipients.iter().map(|k| public(k)).collect();
    ResultsWriter::new(WriterConfig::new(keys).with_pool(PoolConfig::with_workers(2)))
}

pub fn reader_config(local: &PrivateKey) -> ReaderConfig {
    ReaderConfig::new(public(signer()), local.clone()).with_pool(PoolConfig::with_workers(2))
}

pub fn open_as(bytes: Vec<u8>, local: &PrivateKey) -> ResultsReader {
    init_tracing();
    ResultsReader::open(bytes, reader_config(local)).expect("open package")
}

/// `notes.txt` ("hello world") for Alice and Bob, with one audit entry.
pub fn notes_package() -> Vec<u8> {
    let mut writer = writer_for(&[alice(), bob()]);
    writer.add_file_for_all("notes.txt", b"hello world").unwrap();
    writer.record_audit(created_entry(), signer()).unwrap();
    writer.seal_to_bytes().unwrap()
}

/// Copies a container entry by entry, letting `edit` replace any entry's
/// bytes. Entries for which `edit` returns `None` are dropped.
pub fn rewrite_container(
    bytes: Vec<u8>,
    mut edit: impl FnMut(&str, Vec<u8>) -> Option<Vec<u8>>,
) -> Vec<u8> {
    let mut source = ZipSource::from_bytes(bytes).unwrap();
    let mut sink = ZipSink::in_memory();
    for name in source.list_entries() {
        let data = source.read_entry(&name).unwrap();
        if let Some(data) = edit(&name, data) {
            sink.create_entry(&name, &data).unwrap();
        }
    }
    sink.finish().unwrap().into_inner()
}

/// Rewrites `manifest.json` through a JSON value.
pub fn edit_manifest(bytes: Vec<u8>, mut edit: impl FnMut(&mut serde_json::Value)) -> Vec<u8> {
    rewrite_container(bytes, |name, data| {
        if name != "manifest.json" {
            return Some(data);
        }
        let mut value: serde_json::Value = serde_json::from_slice(&data).unwrap();
        edit(&mut value);
        Some(serde_json::to_vec(&value).unwrap())
    })
}

/// Appends an extra raw entry to a sealed container.
pub fn append_entry(bytes: Vec<u8>, name: &str, data: &[u8]) -> Vec<u8> {
    let mut source = ZipSource::from_bytes(bytes).unwrap();
    let mut sink = ZipSink::in_memory();
    for entry in source.list_entries() {
        let contents = source.read_entry(&entry).unwrap();
        sink.create_entry(&entry, &contents).unwrap();
    }
    sink.create_entry(name, data).unwrap();
    sink.finish().unwrap().into_inner()
}

/// Copies a sealed container and writes `name` last as a password-protected
/// entry, replacing any existing entry of that name. The reader has no
/// password, so the entry's body can never be decoded.
pub fn lock_entry(bytes: Vec<u8>, name: &str, data: &[u8]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let mut source = ZipSource::from_bytes(bytes).unwrap();
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for entry in source.list_entries() {
        if entry == name {
            continue;
        }
        let contents = source.read_entry(&entry).unwrap();
        writer.start_file(entry.as_str(), SimpleFileOptions::default()).unwrap();
        writer.write_all(&contents).unwrap();
    }
    let locked = SimpleFileOptions::default().with_aes_encryption(zip::AesMode::Aes256, "pw");
    writer.start_file(name, locked).unwrap();
    writer.write_all(data).unwrap();
    writer.finish().unwrap().into_inner()
}
