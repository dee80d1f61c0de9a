//! Consumer side: verifies and decrypts a results package.
//!
//! Opening a package parses the manifest. Nothing is decrypted until the
//! audit ledger has been verified against the trusted signer; every
//! accessor that releases plaintext (or the manifest) runs verification
//! first if the caller has not. A package that fails verification stays
//! rejected for the lifetime of the reader.

use crate::archive::{ArchiveSource, ZipSource, MANIFEST_ENTRY};
use crate::codec::open_file;
use crate::config::{PoolConfig, ReaderConfig};
use crate::error::{PackageError, PackageResult};
use crate::manifest::{ResultsFile, ResultsManifest};
use crate::pool::{open_batch, OpenJob};
use resultseal_crypto::{PrivateKey, PublicKey};
use std::io::Cursor;
use std::sync::Arc;
use std::vec::IntoIter;
use tracing::{info, warn};

/// A decrypted file together with its manifest record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecryptedFile {
    pub path: String,
    pub metadata: ResultsFile,
    pub content: Vec<u8>,
}

impl DecryptedFile {
    pub fn content_type(&self) -> &str {
        self.metadata.content_type()
    }
}

enum Verification {
    Pending,
    Verified,
    Rejected(PackageError),
}

/// Reads a results package from an [`ArchiveSource`].
pub struct ResultsReader<S: ArchiveSource = ZipSource<Cursor<Vec<u8>>>> {
    source: S,
    manifest: ResultsManifest,
    trusted_signer: PublicKey,
    local_key: Arc<PrivateKey>,
    pool: PoolConfig,
    verification: Verification,
}

impl ResultsReader {
    /// Opens an in-memory zip container.
    pub fn open(bytes: Vec<u8>, config: ReaderConfig) -> PackageResult<Self> {
        Self::from_source(ZipSource::from_bytes(bytes)?, config)
    }
}

impl<S: ArchiveSource> ResultsReader<S> {
    /// Locates and parses the manifest. Does not verify it.
    pub fn from_source(mut source: S, config: ReaderConfig) -> PackageResult<Self> {
        if !source.list_entries().iter().any(|name| name == MANIFEST_ENTRY) {
            return Err(PackageError::ManifestNotFound);
        }
        let raw = source.read_entry(MANIFEST_ENTRY)?;
        let manifest = ResultsManifest::from_json(&raw)?;

        info!(
            files = manifest.len(),
            audit_entries = manifest.audit().len(),
            recipient = config.local_key.fingerprint().short(),
            "opened results package"
        );

        Ok(Self {
            source,
            manifest,
            trusted_signer: config.trusted_signer,
            local_key: Arc::new(config.local_key),
            pool: config.pool,
            verification: Verification::Pending,
        })
    }

    /// Verifies every audit entry against the trusted signer.
    ///
    /// Runs once. Later calls return the cached outcome.
    pub fn verify(&mut self) -> PackageResult<()> {
        match &self.verification {
            Verification::Verified => return Ok(()),
            Verification::Rejected(err) => return Err(replay(err)),
            Verification::Pending => {}
        }

        match self.manifest.audit().verify_all(&self.trusted_signer) {
            Ok(()) => {
                info!(
                    audit_entries = self.manifest.audit().len(),
                    signer = self.trusted_signer.fingerprint().short(),
                    "audit ledger verified"
                );
                self.verification = Verification::Verified;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "audit ledger rejected");
                let returned = replay(&err);
                self.verification = Verification::Rejected(err);
                Err(returned)
            }
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self.verification, Verification::Verified)
    }

    /// The verified manifest.
    pub fn manifest(&mut self) -> PackageResult<&ResultsManifest> {
        self.verify()?;
        Ok(&self.manifest)
    }

    /// Decrypts one file by path.
    pub fn read_file(&mut self, path: &str) -> PackageResult<DecryptedFile> {
        self.verify()?;
        let record = self
            .manifest
            .file(path)
            .cloned()
            .ok_or_else(|| PackageError::FileNotFound(path.to_string()))?;
        let ciphertext = self.read_ciphertext(path)?;
        let content = open_file(&record, &ciphertext, &self.local_key)?;
        Ok(DecryptedFile {
            path: path.to_string(),
            metadata: record,
            content,
        })
    }

    /// Lazily decrypts every file in container order.
    ///
    /// Consumes the reader: iterating again means opening the package again.
    /// Per-file failures are yielded in place and iteration continues.
    pub fn entries(mut self) -> PackageResult<Entries<S>> {
        self.verify()?;
        let names = self.file_entry_names();
        Ok(Entries {
            reader: self,
            names: names.into_iter(),
        })
    }

    /// Decrypts every file on the worker pool. Results are in container
    /// order, with per-file failures in place.
    pub async fn decrypt_all(mut self) -> PackageResult<Vec<PackageResult<DecryptedFile>>> {
        self.verify()?;

        let names = self.file_entry_names();
        let mut results: Vec<Option<PackageResult<DecryptedFile>>> = Vec::with_capacity(names.len());
        let mut slots = Vec::new();
        let mut jobs = Vec::new();

        for name in names {
            let Some(record) = self.manifest.file(&name).cloned() else {
                warn!(path = %name, "container entry has no manifest record");
                results.push(Some(Err(PackageError::OrphanEntry(name))));
                continue;
            };
            match self.read_ciphertext(&name) {
                Ok(ciphertext) => {
                    slots.push(results.len());
                    results.push(None);
                    jobs.push(OpenJob { record, ciphertext });
                }
                Err(err) => {
                    warn!(path = %name, error = %err, "file could not be opened");
                    results.push(Some(Err(err)));
                }
            }
        }

        let opened = open_batch(jobs, Arc::clone(&self.local_key), self.pool.workers).await?;
        for (slot, (record, result)) in slots.into_iter().zip(opened) {
            if let Err(err) = &result {
                warn!(path = record.path(), error = %err, "file could not be opened");
            }
            results[slot] = Some(result.map(|content| DecryptedFile {
                path: record.path().to_string(),
                metadata: record,
                content,
            }));
        }

        Ok(results.into_iter().flatten().collect())
    }

    fn file_entry_names(&self) -> Vec<String> {
        self.source
            .list_entries()
            .into_iter()
            .filter(|name| name != MANIFEST_ENTRY)
            .collect()
    }

    /// Reads a listed file's ciphertext. A body the container cannot decode
    /// fails that file only.
    fn read_ciphertext(&mut self, name: &str) -> PackageResult<Vec<u8>> {
        self.source
            .read_entry(name)
            .map_err(|err| PackageError::UnreadableEntry {
                path: name.to_string(),
                reason: err.to_string(),
            })
    }

    fn open_entry(&mut self, name: &str) -> PackageResult<DecryptedFile> {
        let record = self
            .manifest
            .file(name)
            .cloned()
            .ok_or_else(|| PackageError::OrphanEntry(name.to_string()))?;
        let ciphertext = self.read_ciphertext(name)?;
        let content = open_file(&record, &ciphertext, &self.local_key)?;
        Ok(DecryptedFile {
            path: name.to_string(),
            metadata: record,
            content,
        })
    }
}

/// Iterator returned by [`ResultsReader::entries`].
pub struct Entries<S: ArchiveSource> {
    reader: ResultsReader<S>,
    names: IntoIter<String>,
}

impl<S: ArchiveSource> Iterator for Entries<S> {
    type Item = PackageResult<DecryptedFile>;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.names.next()?;
        let result = self.reader.open_entry(&name);
        if let Err(err) = &result {
            warn!(path = %name, error = %err, "file could not be opened");
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.names.size_hint()
    }
}

/// Rebuilds a verification failure so it can be returned more than once.
fn replay(err: &PackageError) -> PackageError {
    match err {
        PackageError::InvalidSignature { action, entity_id } => PackageError::InvalidSignature {
            action: action.clone(),
            entity_id: entity_id.clone(),
        },
        PackageError::EmptyAudit => PackageError::EmptyAudit,
        other => PackageError::MalformedManifest(other.to_string()),
    }
}
