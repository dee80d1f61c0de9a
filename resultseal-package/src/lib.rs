//! Encrypted results packages.
//!
//! A results package is a zip container holding one ciphertext entry per
//! file plus a `manifest.json` that records, for every file, its size, IV,
//! content type and one wrapped key per recipient. The manifest also holds
//! a signed audit ledger. Readers verify the ledger against a trusted
//! signer before any file is decrypted.
//!
//! # Example
//!
//! ```no_run
//! # async fn demo(
//! #     alice: resultseal_crypto::PublicKey,
//! #     alice_private: resultseal_crypto::PrivateKey,
//! #     signer: resultseal_crypto::PrivateKey,
//! # ) -> resultseal_package::PackageResult<()> {
//! use resultseal_package::{AuditEntry, AuditRole, ReaderConfig, ResultsReader, ResultsWriter, WriterConfig};
//!
//! let mut writer = ResultsWriter::new(WriterConfig::new(vec![alice.clone()]));
//! writer.add_file_for_all("notes.txt", b"hello world")?;
//! writer.record_audit(AuditEntry::new("created", "user-1", AuditRole::Member), &signer)?;
//! let bytes = writer.seal_to_bytes()?;
//!
//! let config = ReaderConfig::new(signer.public_key().clone(), alice_private);
//! for file in ResultsReader::open(bytes, config)?.entries()? {
//!     let file = file?;
//!     println!("{} ({})", file.path, file.content_type());
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod audit;
mod canonical;
mod codec;
pub mod config;
pub mod content_type;
mod error;
pub mod manifest;
mod pool;
pub mod reader;
pub mod writer;

pub use archive::{ArchiveSink, ArchiveSource, ZipSink, ZipSource, MANIFEST_ENTRY};
pub use audit::{AuditEntry, AuditLedger, AuditRole};
pub use canonical::to_canonical_json;
pub use codec::PlainFile;
pub use config::{PoolConfig, ReaderConfig, WriterConfig};
pub use error::{PackageError, PackageResult};
pub use manifest::{ResultsFile, ResultsManifest, MANIFEST_VERSION};
pub use reader::{DecryptedFile, Entries, ResultsReader};
pub use writer::ResultsWriter;
