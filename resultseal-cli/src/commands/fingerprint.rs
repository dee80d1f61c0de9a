use crate::keyfile::read_any_public;
use anyhow::Result;
use std::path::Path;

pub fn run(key: &Path) -> Result<()> {
    let public = read_any_public(key)?;
    println!("{}", public.fingerprint());
    Ok(())
}
