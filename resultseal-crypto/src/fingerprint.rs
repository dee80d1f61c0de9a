//! Key fingerprints: lowercase hex SHA-256 of the SPKI encoding.
//!
//! The fingerprint is the lookup key into a file's wrapped-key map, so it
//! must be stable across imports. It is always computed over the
//! re-encoded SPKI DER, never over whatever bytes the key arrived in.

use crate::error::{CryptoError, CryptoResult};
use crate::keys::PublicKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of a rendered fingerprint (SHA-256 as hex).
pub const FINGERPRINT_LEN: usize = 64;

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyFingerprint(String);

impl KeyFingerprint {
    pub(crate) fn of_spki_der(der: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(der)))
    }

    /// Parses a rendered fingerprint. Only lowercase hex of the right
    /// length is accepted so that map lookups never miss on case.
    pub fn parse(text: &str) -> CryptoResult<Self> {
        let well_formed = text.len() == FINGERPRINT_LEN
            && text
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return Err(CryptoError::InvalidKeyMaterial(format!(
                "fingerprint must be {FINGERPRINT_LEN} lowercase hex characters"
            )));
        }
        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 16 hex characters, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..16]
    }
}

impl fmt::Display for KeyFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for KeyFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyFingerprint({})", self.0)
    }
}

impl TryFrom<String> for KeyFingerprint {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<KeyFingerprint> for String {
    fn from(value: KeyFingerprint) -> Self {
        value.0
    }
}

/// Fingerprint of an already-imported public key.
pub fn fingerprint(key: &PublicKey) -> KeyFingerprint {
    key.fingerprint().clone()
}

/// Imports DER-encoded SPKI material and fingerprints it.
pub fn fingerprint_der(der: &[u8]) -> CryptoResult<KeyFingerprint> {
    PublicKey::from_der(der).map(|key| fingerprint(&key))
}
