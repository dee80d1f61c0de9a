//! The results manifest: per-file cryptographic metadata plus the audit
//! ledger, stored as `manifest.json` in the container.
//!
//! The document carries an explicit `version`. Older manifest shapes (a
//! single wrapped key per file, with or without an audit ledger) never had
//! one and are rejected rather than guessed at.

use crate::audit::AuditLedger;
use crate::error::{PackageError, PackageResult};
use resultseal_crypto::{Iv, KeyFingerprint, WrappedKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Manifest schema version written and accepted by this crate.
pub const MANIFEST_VERSION: u64 = 3;

/// Metadata for one encrypted file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResultsFile {
    path: String,
    /// Plaintext size. Ciphertext is longer because of block padding.
    #[serde(rename = "bytes")]
    original_byte_length: u64,
    iv: Iv,
    content_type: String,
    #[serde(rename = "keys")]
    wrapped_keys: BTreeMap<KeyFingerprint, WrappedKey>,
}

impl ResultsFile {
    pub fn new(
        path: impl Into<String>,
        original_byte_length: u64,
        iv: Iv,
        content_type: impl Into<String>,
        wrapped_keys: BTreeMap<KeyFingerprint, WrappedKey>,
    ) -> Self {
        Self {
            path: path.into(),
            original_byte_length,
            iv,
            content_type: content_type.into(),
            wrapped_keys,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn original_byte_length(&self) -> u64 {
        self.original_byte_length
    }

    pub fn iv(&self) -> &Iv {
        &self.iv
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn wrapped_keys(&self) -> &BTreeMap<KeyFingerprint, WrappedKey> {
        &self.wrapped_keys
    }

    pub fn wrapped_key(&self, fingerprint: &KeyFingerprint) -> Option<&WrappedKey> {
        self.wrapped_keys.get(fingerprint)
    }

    /// Fingerprints of every recipient this file was wrapped for.
    pub fn recipients(&self) -> impl Iterator<Item = &KeyFingerprint> {
        self.wrapped_keys.keys()
    }
}

/// Root manifest document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultsManifest {
    version: u64,
    files: BTreeMap<String, ResultsFile>,
    audit: AuditLedger,
}

impl Default for ResultsManifest {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultsManifest {
    pub fn new() -> Self {
        Self {
            version: MANIFEST_VERSION,
            files: BTreeMap::new(),
            audit: AuditLedger::new(),
        }
    }

    /// Parses and validates a serialized manifest.
    pub fn from_json(bytes: &[u8]) -> PackageResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|e| PackageError::MalformedManifest(e.to_string()))?;

        match value.get("version") {
            None => return Err(PackageError::UnsupportedManifest { found: None }),
            Some(version) => match version.as_u64() {
                Some(MANIFEST_VERSION) => {}
                Some(other) => {
                    return Err(PackageError::UnsupportedManifest { found: Some(other) });
                }
                None => {
                    return Err(PackageError::MalformedManifest(
                        "version must be an unsigned integer".to_string(),
                    ));
                }
            },
        }

        let manifest: Self = serde_json::from_value(value)
            .map_err(|e| PackageError::MalformedManifest(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Serializes the manifest for storage in the container.
    pub fn to_json(&self) -> PackageResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    fn validate(&self) -> PackageResult<()> {
        for (key, file) in &self.files {
            if key != &file.path {
                return Err(PackageError::MalformedManifest(format!(
                    "file record keyed {key:?} names path {:?}",
                    file.path
                )));
            }
        }
        Ok(())
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Appends a file record. Paths are unique.
    pub fn insert_file(&mut self, file: ResultsFile) -> PackageResult<()> {
        if self.files.contains_key(&file.path) {
            return Err(PackageError::DuplicatePath(file.path));
        }
        self.files.insert(file.path.clone(), file);
        Ok(())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn file(&self, path: &str) -> Option<&ResultsFile> {
        self.files.get(path)
    }

    pub fn files(&self) -> impl Iterator<Item = &ResultsFile> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn audit(&self) -> &AuditLedger {
        &self.audit
    }

    pub fn audit_mut(&mut self) -> &mut AuditLedger {
        &mut self.audit
    }
}
