//! Package error types.

use resultseal_crypto::{CryptoError, KeyFingerprint};
use thiserror::Error;

/// Result type for package operations.
pub type PackageResult<T> = Result<T, PackageError>;

/// Errors that can occur while writing or reading a results package.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("manifest.json not found in container")]
    ManifestNotFound,

    #[error("unsupported manifest version: {}", display_version(.found))]
    UnsupportedManifest { found: Option<u64> },

    #[error("malformed manifest: {0}")]
    MalformedManifest(String),

    #[error("invalid audit signature for {action} by {entity_id}")]
    InvalidSignature { action: String, entity_id: String },

    #[error("manifest has no audit entries")]
    EmptyAudit,

    #[error("manifest has no files")]
    EmptyManifest,

    #[error("container entry {0} has no manifest record")]
    OrphanEntry(String),

    #[error("container entry {path} could not be read: {reason}")]
    UnreadableEntry { path: String, reason: String },

    #[error("file {path} is not wrapped for recipient {fingerprint}")]
    NoKeyForRecipient {
        path: String,
        fingerprint: KeyFingerprint,
    },

    #[error("could not unwrap key for {0}")]
    UnwrapFailure(String),

    #[error("decryption of {path} failed: {reason}")]
    DecryptionFailure { path: String, reason: String },

    #[error("file not found in manifest: {0}")]
    FileNotFound(String),

    #[error("duplicate path: {0}")]
    DuplicatePath(String),

    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("no recipients given for {0}")]
    NoRecipients(String),

    #[error("writer is unusable after a failed container write")]
    WriterPoisoned,

    #[error("archive error: {0}")]
    Archive(String),

    #[error("worker pool error: {0}")]
    Worker(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PackageError {
    /// True for failures scoped to a single file. Iteration over the
    /// remaining files can continue after one of these.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::OrphanEntry(_)
                | Self::UnreadableEntry { .. }
                | Self::NoKeyForRecipient { .. }
                | Self::UnwrapFailure(_)
                | Self::DecryptionFailure { .. }
        )
    }
}

impl From<zip::result::ZipError> for PackageError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

fn display_version(found: &Option<u64>) -> String {
    match found {
        Some(version) => version.to_string(),
        None => "none (unversioned legacy manifest)".to_string(),
    }
}
