//! Producer side: builds an encrypted results package.
//!
//! A writer starts empty, accumulates files and audit entries, and is
//! consumed by [`ResultsWriter::seal`]. Ciphertext goes into the container
//! as each file is added; the manifest is written last, under
//! [`MANIFEST_ENTRY`].

use crate::archive::{ArchiveSink, ZipSink, MANIFEST_ENTRY};
use crate::audit::AuditEntry;
use crate::codec::{seal_file, PlainFile, SealedFile};
use crate::config::{PoolConfig, WriterConfig};
use crate::error::{PackageError, PackageResult};
use crate::manifest::ResultsManifest;
use crate::pool::seal_batch;
use resultseal_crypto::{PrivateKey, PublicKey};
use std::collections::HashSet;
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Builds a results package into an [`ArchiveSink`].
pub struct ResultsWriter<S: ArchiveSink = ZipSink<Cursor<Vec<u8>>>> {
    sink: S,
    manifest: ResultsManifest,
    recipients: Arc<[PublicKey]>,
    pool: PoolConfig,
    /// Set when a container write fails. The container may then hold a
    /// partial entry, so nothing more is accepted.
    poisoned: bool,
}

impl ResultsWriter {
    /// Creates a writer that builds a zip container in memory.
    pub fn new(config: WriterConfig) -> Self {
        Self::with_archive(ZipSink::in_memory(), config)
    }

    /// Seals the package and returns the container bytes.
    pub fn seal_to_bytes(self) -> PackageResult<Vec<u8>> {
        Ok(self.seal()?.into_inner())
    }
}

impl<S: ArchiveSink> ResultsWriter<S> {
    pub fn with_archive(sink: S, config: WriterConfig) -> Self {
        Self {
            sink,
            manifest: ResultsManifest::new(),
            recipients: config.recipients.into(),
            pool: config.pool,
            poisoned: false,
        }
    }

    /// Encrypts `content` for exactly `recipients` and stores it under `path`.
    pub fn add_file(
        &mut self,
        path: &str,
        content: &[u8],
        recipients: &[PublicKey],
    ) -> PackageResult<()> {
        self.ensure_usable()?;
        self.check_path(path)?;
        if recipients.is_empty() {
            return Err(PackageError::NoRecipients(path.to_string()));
        }

        let sealed = seal_file(path, content, recipients)?;
        self.commit(sealed)
    }

    /// Encrypts `content` for every recipient in the writer's config.
    pub fn add_file_for_all(&mut self, path: &str, content: &[u8]) -> PackageResult<()> {
        let recipients = Arc::clone(&self.recipients);
        self.add_file(path, content, &recipients)
    }

    /// Encrypts a batch of files on the worker pool, for every configured
    /// recipient.
    ///
    /// Paths are checked before any work starts. If any file fails, nothing
    /// from the batch is added.
    pub async fn add_files(&mut self, files: Vec<PlainFile>) -> PackageResult<()> {
        self.ensure_usable()?;
        if files.is_empty() {
            return Ok(());
        }

        let mut batch_paths = HashSet::with_capacity(files.len());
        for file in &files {
            self.check_path(&file.path)?;
            if !batch_paths.insert(file.path.as_str()) {
                return Err(PackageError::DuplicatePath(file.path.clone()));
            }
        }
        if self.recipients.is_empty() {
            return Err(PackageError::NoRecipients(files[0].path.clone()));
        }

        let count = files.len();
        let sealed = seal_batch(files, Arc::clone(&self.recipients), self.pool.workers).await?;
        for file in sealed {
            self.commit(file)?;
        }
        debug!(files = count, "added batch");
        Ok(())
    }

    /// Signs `entry` with `signer` and appends it to the audit ledger.
    /// Returns the base64 signature the entry is stored under.
    pub fn record_audit(&mut self, entry: AuditEntry, signer: &PrivateKey) -> PackageResult<String> {
        self.ensure_usable()?;
        self.manifest.audit_mut().record(entry, signer)
    }

    /// The manifest built so far.
    pub fn manifest(&self) -> &ResultsManifest {
        &self.manifest
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Writes the manifest and finalizes the container.
    ///
    /// Requires at least one audit entry and at least one file, checked in
    /// that order.
    pub fn seal(mut self) -> PackageResult<S::Output> {
        self.ensure_usable()?;
        if self.manifest.audit().is_empty() {
            return Err(PackageError::EmptyAudit);
        }
        if self.manifest.is_empty() {
            return Err(PackageError::EmptyManifest);
        }

        let json = self.manifest.to_json()?;
        self.sink.create_entry(MANIFEST_ENTRY, &json)?;
        let output = self.sink.finish()?;

        info!(
            files = self.manifest.len(),
            audit_entries = self.manifest.audit().len(),
            manifest_bytes = json.len(),
            "sealed results package"
        );
        Ok(output)
    }

    fn ensure_usable(&self) -> PackageResult<()> {
        if self.poisoned {
            return Err(PackageError::WriterPoisoned);
        }
        Ok(())
    }

    fn check_path(&self, path: &str) -> PackageResult<()> {
        let invalid = |reason: &str| PackageError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };
        if path.is_empty() {
            return Err(invalid("path is empty"));
        }
        if path == MANIFEST_ENTRY {
            return Err(invalid("reserved for the manifest"));
        }
        if path.ends_with('/') {
            return Err(invalid("names a directory"));
        }
        if self.manifest.contains(path) {
            return Err(PackageError::DuplicatePath(path.to_string()));
        }
        Ok(())
    }

    /// Stores the ciphertext, then registers the record. The manifest is
    /// only touched here, by the writer's owner.
    fn commit(&mut self, sealed: SealedFile) -> PackageResult<()> {
        let SealedFile { record, ciphertext } = sealed;
        if let Err(err) = self.sink.create_entry(record.path(), &ciphertext) {
            warn!(path = record.path(), error = %err, "container write failed; writer poisoned");
            self.poisoned = true;
            return Err(err);
        }
        self.manifest.insert_file(record)
    }
}
