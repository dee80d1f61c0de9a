//! Shared RSA fixtures. Key generation is slow, so each key is created once
//! per test binary.

#![allow(dead_code)]

use resultseal_crypto::PrivateKey;
use std::sync::OnceLock;

const TEST_KEY_BITS: usize = 2048;

fn cached(cell: &'static OnceLock<PrivateKey>) -> &'static PrivateKey {
    cell.get_or_init(|| PrivateKey::generate(TEST_KEY_BITS).expect("test key generation"))
}

pub fn alice() -> &'static PrivateKey {
    static KEY: OnceLock<PrivateKey> = OnceLock::new();
    cached(&KEY)
}

pub fn bob() -> &'static PrivateKey {
    static KEY: OnceLock<PrivateKey> = OnceLock::new();
    cached(&KEY)
}

/// Ed25519 SubjectPublicKeyInfo (RFC 8410 test vector layout).
pub fn ed25519_spki() -> Vec<u8> {
    let mut der = vec![
        0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
    ];
    der.extend_from_slice(&[0x42; 32]);
    der
}
