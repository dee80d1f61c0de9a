//! Detached RSASSA-PKCS1-v1_5 signatures over SHA-256.
//!
//! PKCS#1 v1.5 signing is deterministic: the same key and message always
//! produce the same signature bytes. Audit ledgers rely on this because the
//! signature doubles as the ledger key.

use crate::error::{CryptoError, CryptoResult};
use crate::keys::{PrivateKey, PublicKey};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use sha2::Sha256;

/// Signs `message` with `signer`, returning the raw signature bytes.
pub fn sign_message(signer: &PrivateKey, message: &[u8]) -> CryptoResult<Vec<u8>> {
    let signing_key = SigningKey::<Sha256>::new(signer.as_rsa().clone());
    let signature = signing_key
        .try_sign(message)
        .map_err(|e| CryptoError::Signing(e.to_string()))?;
    Ok(signature.to_vec())
}

/// Verifies a detached signature. Any malformed or mismatched signature is
/// [`CryptoError::InvalidSignature`].
pub fn verify_message(signer: &PublicKey, message: &[u8], signature: &[u8]) -> CryptoResult<()> {
    let signature = Signature::try_from(signature).map_err(|_| CryptoError::InvalidSignature)?;
    VerifyingKey::<Sha256>::new(signer.as_rsa().clone())
        .verify(message, &signature)
        .map_err(|_| CryptoError::InvalidSignature)
}
