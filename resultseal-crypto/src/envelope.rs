//! Envelope key wrapping for results recipients.
//!
//! Uses RSA-OAEP with SHA-256 (empty label) to encrypt a file's 32-byte
//! content key to a recipient's public key. One [`WrappedKey`] exists per
//! file and recipient fingerprint.

use crate::encoding::base64_bytes;
use crate::error::{CryptoError, CryptoResult};
use crate::key::SymmetricKey;
use crate::keys::{PrivateKey, PublicKey};
use rsa::Oaep;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

/// A content key encrypted to one recipient.
///
/// Serialized as `{ "crypt": "<base64>" }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WrappedKey {
    #[serde(rename = "crypt", with = "base64_bytes")]
    cryptogram: Vec<u8>,
}

impl WrappedKey {
    pub fn from_cryptogram(cryptogram: Vec<u8>) -> Self {
        Self { cryptogram }
    }

    pub fn cryptogram(&self) -> &[u8] {
        &self.cryptogram
    }
}

/// Wraps (encrypts) a content key for a recipient.
///
/// OAEP is randomized, so wrapping the same key twice yields different
/// cryptograms.
pub fn wrap_key(recipient: &PublicKey, key: &SymmetricKey) -> CryptoResult<WrappedKey> {
    let cryptogram = recipient
        .as_rsa()
        .encrypt(&mut rsa::rand_core::OsRng, Oaep::new::<Sha256>(), key.as_bytes())
        .map_err(|e| CryptoError::Wrap(e.to_string()))?;
    Ok(WrappedKey { cryptogram })
}

/// Unwraps (decrypts) a content key with the recipient's private key.
///
/// Every failure, whether a mismatched key, a corrupted cryptogram or a
/// payload of the wrong size, collapses into [`CryptoError::UnwrapFailure`].
pub fn unwrap_key(recipient: &PrivateKey, wrapped: &WrappedKey) -> CryptoResult<SymmetricKey> {
    let plaintext = recipient
        .as_rsa()
        .decrypt_blinded(
            &mut rsa::rand_core::OsRng,
            Oaep::new::<Sha256>(),
            &wrapped.cryptogram,
        )
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::UnwrapFailure)?;

    SymmetricKey::from_slice(&plaintext).map_err(|_| CryptoError::UnwrapFailure)
}
