//! Cryptographic primitives for resultseal.
//!
//! Provides the building blocks of the results envelope format:
//! - AES-256-CBC for per-file content encryption
//! - RSA-OAEP (SHA-256) for wrapping per-file keys to recipients
//! - RSASSA-PKCS1-v1_5 (SHA-256) for audit signatures
//! - SHA-256 fingerprints of SPKI-encoded public keys
//!
//! # Architecture
//!
//! Every file gets its own random 256-bit key and 16-byte IV. The file key
//! is then wrapped once per recipient with that recipient's RSA public key.
//! A recipient finds its wrapped key by fingerprint, unwraps it with its
//! private key and decrypts the content.
//!
//! Recipients can differ per file, and a file key opens only its own file.
//!
//! AES-CBC provides confidentiality only. Nothing here authenticates file
//! ciphertext; integrity of the package comes from the signed manifest.

mod armor;
pub mod cipher;
mod encoding;
pub mod envelope;
mod error;
pub mod fingerprint;
mod key;
pub mod keys;
pub mod signature;

pub use armor::{PRIVATE_KEY_LABEL, PUBLIC_KEY_LABEL};
pub use cipher::{decrypt, encrypt, BLOCK_SIZE};
pub use envelope::{unwrap_key, wrap_key, WrappedKey};
pub use error::{CryptoError, CryptoResult};
pub use fingerprint::{fingerprint, fingerprint_der, KeyFingerprint};
pub use key::{Iv, SymmetricKey, IV_SIZE, KEY_SIZE};
pub use keys::{PrivateKey, PublicKey, MIN_MODULUS_BITS};
pub use signature::{sign_message, verify_message};
