//! RSA key pairs for recipients and audit signers.
//!
//! Public keys are exchanged as SPKI (`BEGIN PUBLIC KEY`), private keys as
//! unencrypted PKCS#8 (`BEGIN PRIVATE KEY`). The same key types serve both
//! as wrapping keys and as audit signing keys.

use crate::armor;
use crate::error::{CryptoError, CryptoResult};
use crate::fingerprint::KeyFingerprint;
use rsa::pkcs1::ALGORITHM_OID as RSA_ALGORITHM_OID;
use rsa::pkcs8::der::Decode;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding, PrivateKeyInfo, SubjectPublicKeyInfoRef};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;
use zeroize::Zeroizing;

/// Smallest accepted RSA modulus, in bits.
pub const MIN_MODULUS_BITS: usize = 2048;

/// An RSA public key together with its fingerprint.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    key: RsaPublicKey,
    fingerprint: KeyFingerprint,
}

impl PublicKey {
    /// Parses a DER-encoded SubjectPublicKeyInfo.
    ///
    /// Non-RSA algorithms and moduli below [`MIN_MODULUS_BITS`] are
    /// [`CryptoError::UnsupportedKey`]; anything unparseable is
    /// [`CryptoError::InvalidKeyMaterial`].
    pub fn from_der(der: &[u8]) -> CryptoResult<Self> {
        let spki = SubjectPublicKeyInfoRef::from_der(der)
            .map_err(|e| CryptoError::InvalidKeyMaterial(format!("not an SPKI document: {e}")))?;
        if spki.algorithm.oid != RSA_ALGORITHM_OID {
            return Err(CryptoError::UnsupportedKey(format!(
                "expected an RSA key, found algorithm {}",
                spki.algorithm.oid
            )));
        }

        let key = RsaPublicKey::try_from(spki)
            .map_err(|e| CryptoError::InvalidKeyMaterial(format!("malformed RSA public key: {e}")))?;
        Self::from_rsa(key)
    }

    /// Parses a PEM-armored public key.
    pub fn from_pem(text: &str) -> CryptoResult<Self> {
        let document = armor::decode_public(text)?;
        Self::from_der(document.as_bytes())
    }

    /// Wraps an already-parsed RSA key, checking its size.
    pub fn from_rsa(key: RsaPublicKey) -> CryptoResult<Self> {
        let bits = key.size() * 8;
        if bits < MIN_MODULUS_BITS {
            return Err(CryptoError::UnsupportedKey(format!(
                "RSA modulus of {bits} bits is below the {MIN_MODULUS_BITS}-bit minimum"
            )));
        }

        let spki = key
            .to_public_key_der()
            .map_err(|e| CryptoError::InvalidKeyMaterial(format!("SPKI encoding failed: {e}")))?;
        let fingerprint = KeyFingerprint::of_spki_der(spki.as_bytes());
        Ok(Self { key, fingerprint })
    }

    /// Canonical SPKI DER encoding.
    pub fn to_der(&self) -> CryptoResult<Vec<u8>> {
        self.key
            .to_public_key_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(|e| CryptoError::InvalidKeyMaterial(format!("SPKI encoding failed: {e}")))
    }

    pub fn to_pem(&self) -> CryptoResult<String> {
        self.key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::InvalidKeyMaterial(format!("PEM encoding failed: {e}")))
    }

    pub fn fingerprint(&self) -> &KeyFingerprint {
        &self.fingerprint
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.key.size() * 8
    }

    pub(crate) fn as_rsa(&self) -> &RsaPublicKey {
        &self.key
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("bits", &self.bits())
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// An RSA private key. The underlying key material zeroizes on drop.
#[derive(Clone)]
pub struct PrivateKey {
    key: RsaPrivateKey,
    public: PublicKey,
}

impl PrivateKey {
    /// Generates a new key pair. Intended for tooling and tests; production
    /// keys are provisioned out of band.
    pub fn generate(bits: usize) -> CryptoResult<Self> {
        if bits < MIN_MODULUS_BITS {
            return Err(CryptoError::UnsupportedKey(format!(
                "refusing to generate a {bits}-bit key (minimum {MIN_MODULUS_BITS})"
            )));
        }
        let key = RsaPrivateKey::new(&mut rsa::rand_core::OsRng, bits)
            .map_err(|e| CryptoError::InvalidKeyMaterial(format!("key generation failed: {e}")))?;
        Self::from_rsa(key)
    }

    /// Parses a DER-encoded PKCS#8 PrivateKeyInfo.
    pub fn from_der(der: &[u8]) -> CryptoResult<Self> {
        let info = PrivateKeyInfo::from_der(der)
            .map_err(|e| CryptoError::InvalidKeyMaterial(format!("not a PKCS#8 document: {e}")))?;
        if info.algorithm.oid != RSA_ALGORITHM_OID {
            return Err(CryptoError::UnsupportedKey(format!(
                "expected an RSA key, found algorithm {}",
                info.algorithm.oid
            )));
        }

        let key = RsaPrivateKey::try_from(info)
            .map_err(|e| CryptoError::InvalidKeyMaterial(format!("malformed RSA private key: {e}")))?;
        Self::from_rsa(key)
    }

    /// Parses a PEM-armored private key.
    pub fn from_pem(text: &str) -> CryptoResult<Self> {
        let document = armor::decode_private(text)?;
        Self::from_der(document.as_bytes())
    }

    pub fn from_rsa(key: RsaPrivateKey) -> CryptoResult<Self> {
        let public = PublicKey::from_rsa(key.to_public_key())?;
        Ok(Self { key, public })
    }

    pub fn to_pem(&self) -> CryptoResult<Zeroizing<String>> {
        self.key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CryptoError::InvalidKeyMaterial(format!("PEM encoding failed: {e}")))
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Fingerprint of the matching public key.
    pub fn fingerprint(&self) -> &KeyFingerprint {
        self.public.fingerprint()
    }

    pub(crate) fn as_rsa(&self) -> &RsaPrivateKey {
        &self.key
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("fingerprint", self.fingerprint())
            .finish_non_exhaustive()
    }
}
