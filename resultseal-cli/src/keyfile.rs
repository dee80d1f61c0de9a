use anyhow::{Context, Result};
use resultseal_crypto::{PrivateKey, PublicKey};
use std::fs;
use std::path::Path;
use zeroize::Zeroizing;

pub(crate) fn read_public_key(path: &Path) -> Result<PublicKey> {
    let text = read_text(path)?;
    PublicKey::from_pem(&text).with_context(|| format!("parsing public key {}", path.display()))
}

pub(crate) fn read_private_key(path: &Path) -> Result<PrivateKey> {
    let text = Zeroizing::new(read_text(path)?);
    PrivateKey::from_pem(&text).with_context(|| format!("parsing private key {}", path.display()))
}

/// Accepts either half of a key pair and returns the public key.
pub(crate) fn read_any_public(path: &Path) -> Result<PublicKey> {
    let text = Zeroizing::new(read_text(path)?);
    if let Ok(key) = PublicKey::from_pem(&text) {
        return Ok(key);
    }
    PrivateKey::from_pem(&text)
        .map(|key| key.public_key().clone())
        .with_context(|| format!("{} is neither a public nor a private key", path.display()))
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
