use crate::args::KeygenArgs;
use anyhow::{bail, Context, Result};
use resultseal_crypto::PrivateKey;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn run(args: KeygenArgs) -> Result<()> {
    let private_path = with_suffix(&args.output, ".pem");
    let public_path = with_suffix(&args.output, ".pub.pem");
    if !args.force {
        for path in [&private_path, &public_path] {
            if path.exists() {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
        }
    }

    let key = PrivateKey::generate(args.bits)?;
    write_private(&private_path, key.to_pem()?.as_bytes())?;
    fs::write(&public_path, key.public_key().to_pem()?)
        .with_context(|| format!("writing {}", public_path.display()))?;

    info!(bits = args.bits, fingerprint = key.fingerprint().short(), "generated key pair");
    println!("{}", key.fingerprint());
    Ok(())
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(unix)]
fn write_private(path: &Path, pem: &[u8]) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .with_context(|| format!("writing {}", path.display()))?;
    file.write_all(pem)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, pem: &[u8]) -> Result<()> {
    fs::write(path, pem).with_context(|| format!("writing {}", path.display()))
}
