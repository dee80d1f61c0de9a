//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    #[error("unsupported key: {0}")]
    UnsupportedKey(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("key wrap failed: {0}")]
    Wrap(String),

    /// Deliberately carries no detail so OAEP failures cannot be told apart.
    #[error("key unwrap failed")]
    UnwrapFailure,

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("signature verification failed")]
    InvalidSignature,
}
