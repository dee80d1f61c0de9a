//! AES-256-CBC content encryption with PKCS#7 padding.
//!
//! CBC is unauthenticated: a modified ciphertext usually decrypts to
//! garbage rather than failing. Only padding errors and malformed lengths
//! are reported as [`CryptoError::Decryption`].

use crate::error::{CryptoError, CryptoResult};
use crate::key::{Iv, SymmetricKey};
use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES block size in bytes. Ciphertext length is always a multiple of it.
pub const BLOCK_SIZE: usize = 16;

/// Encrypts `plaintext` under `key` and `iv`.
///
/// The output is padded to the next whole block, so it is always longer
/// than the input (an empty plaintext yields one block).
pub fn encrypt(key: &SymmetricKey, iv: &Iv, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = Aes256CbcEnc::new_from_slices(key.as_bytes(), iv.as_bytes())
        .map_err(|e| CryptoError::Encryption(format!("cipher init failed: {e}")))?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypts `ciphertext` produced by [`encrypt`].
pub fn decrypt(key: &SymmetricKey, iv: &Iv, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::Decryption(format!(
            "ciphertext length {} is not a positive multiple of {BLOCK_SIZE}",
            ciphertext.len()
        )));
    }

    let cipher = Aes256CbcDec::new_from_slices(key.as_bytes(), iv.as_bytes())
        .map_err(|e| CryptoError::Decryption(format!("cipher init failed: {e}")))?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::Decryption("invalid padding (wrong key or IV)".to_string()))
}
