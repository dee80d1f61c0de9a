//! Per-file envelope work: encrypt and wrap on the way in, unwrap and
//! decrypt on the way out. Everything here is pure and touches no shared
//! state, so it can run on any worker.

use crate::content_type;
use crate::error::{PackageError, PackageResult};
use crate::manifest::ResultsFile;
use resultseal_crypto::{decrypt, encrypt, unwrap_key, wrap_key, Iv, PrivateKey, PublicKey, SymmetricKey};
use std::collections::BTreeMap;
use tracing::debug;

/// A plaintext file queued for sealing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlainFile {
    pub path: String,
    pub content: Vec<u8>,
}

impl PlainFile {
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Ciphertext plus the manifest record describing it.
pub(crate) struct SealedFile {
    pub record: ResultsFile,
    pub ciphertext: Vec<u8>,
}

/// Encrypts `content` under a fresh key and IV, then wraps the key once per
/// distinct recipient fingerprint.
pub(crate) fn seal_file(
    path: &str,
    content: &[u8],
    recipients: &[PublicKey],
) -> PackageResult<SealedFile> {
    let key = SymmetricKey::generate();
    let iv = Iv::generate();
    let ciphertext = encrypt(&key, &iv, content)?;

    let mut wrapped_keys = BTreeMap::new();
    for recipient in recipients {
        if wrapped_keys.contains_key(recipient.fingerprint()) {
            continue;
        }
        wrapped_keys.insert(recipient.fingerprint().clone(), wrap_key(recipient, &key)?);
    }

    debug!(
        path,
        bytes = content.len(),
        recipients = wrapped_keys.len(),
        "sealed file"
    );

    let record = ResultsFile::new(
        path,
        content.len() as u64,
        iv,
        content_type::infer(path),
        wrapped_keys,
    );
    Ok(SealedFile { record, ciphertext })
}

/// Recovers the plaintext of one file for the holder of `local_key`.
pub(crate) fn open_file(
    record: &ResultsFile,
    ciphertext: &[u8],
    local_key: &PrivateKey,
) -> PackageResult<Vec<u8>> {
    let path = record.path();
    let fingerprint = local_key.fingerprint();
    let wrapped = record
        .wrapped_key(fingerprint)
        .ok_or_else(|| PackageError::NoKeyForRecipient {
            path: path.to_string(),
            fingerprint: fingerprint.clone(),
        })?;

    let key = unwrap_key(local_key, wrapped)
        .map_err(|_| PackageError::UnwrapFailure(path.to_string()))?;

    let plaintext = decrypt(&key, record.iv(), ciphertext).map_err(|e| {
        PackageError::DecryptionFailure {
            path: path.to_string(),
            reason: e.to_string(),
        }
    })?;

    if plaintext.len() as u64 != record.original_byte_length() {
        return Err(PackageError::DecryptionFailure {
            path: path.to_string(),
            reason: format!(
                "decrypted {} bytes, manifest records {}",
                plaintext.len(),
                record.original_byte_length()
            ),
        });
    }

    debug!(path, bytes = plaintext.len(), "opened file");
    Ok(plaintext)
}
