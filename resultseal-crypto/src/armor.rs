//! PEM armor decoding for key files.

use crate::error::{CryptoError, CryptoResult};
use rsa::pkcs8::der::{Document, SecretDocument};

/// PEM label of an SPKI public key.
pub const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

/// PEM label of an unencrypted PKCS#8 private key.
pub const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";

/// Strips PEM armor from a public key, returning the DER body.
pub(crate) fn decode_public(text: &str) -> CryptoResult<Document> {
    let (label, document) = Document::from_pem(text.trim())
        .map_err(|e| CryptoError::InvalidKeyMaterial(format!("malformed PEM: {e}")))?;
    expect_label(label, PUBLIC_KEY_LABEL)?;
    Ok(document)
}

/// Strips PEM armor from a private key. The DER body is zeroized on drop.
pub(crate) fn decode_private(text: &str) -> CryptoResult<SecretDocument> {
    let (label, document) = SecretDocument::from_pem(text.trim())
        .map_err(|e| CryptoError::InvalidKeyMaterial(format!("malformed PEM: {e}")))?;
    expect_label(label, PRIVATE_KEY_LABEL)?;
    Ok(document)
}

fn expect_label(found: &str, expected: &str) -> CryptoResult<()> {
    if found == expected {
        Ok(())
    } else {
        Err(CryptoError::InvalidKeyMaterial(format!(
            "expected PEM label \"{expected}\", found \"{found}\""
        )))
    }
}
