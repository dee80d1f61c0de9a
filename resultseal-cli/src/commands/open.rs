use crate::args::OpenArgs;
use crate::keyfile::{read_private_key, read_public_key};
use crate::pool_config;
use anyhow::{bail, Context, Result};
use resultseal_package::{ReaderConfig, ResultsReader};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

pub async fn run(args: OpenArgs, workers: Option<usize>) -> Result<()> {
    let local_key = read_private_key(&args.key)?;
    let trusted_signer = read_public_key(&args.trusted_signer)?;
    let bytes = fs::read(&args.package)
        .with_context(|| format!("reading {}", args.package.display()))?;

    let config = ReaderConfig::new(trusted_signer, local_key).with_pool(pool_config(workers));
    let mut reader = ResultsReader::open(bytes, config)
        .with_context(|| format!("opening {}", args.package.display()))?;
    reader.verify().context("audit trail rejected")?;

    let results = reader.decrypt_all().await?;
    let total = results.len();
    let mut failed = 0;

    for result in results {
        let file = match result {
            Ok(file) => file,
            Err(err) if err.is_per_file() => {
                eprintln!("skipped: {err}");
                failed += 1;
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let destination = match destination(&args.output, &file.path) {
            Ok(destination) => destination,
            Err(err) => {
                warn!(path = %file.path, "refusing unsafe entry path");
                eprintln!("skipped: {err}");
                failed += 1;
                continue;
            }
        };
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&destination, &file.content)
            .with_context(|| format!("writing {}", destination.display()))?;
        println!(
            "{}  {} ({} bytes)",
            file.path,
            file.content_type(),
            file.content.len()
        );
    }

    if failed > 0 {
        bail!("{failed} of {total} file(s) could not be opened");
    }
    Ok(())
}

/// Joins an entry path onto `root`, refusing anything that could escape it.
fn destination(root: &Path, entry: &str) -> Result<PathBuf> {
    let relative = Path::new(entry);
    let safe = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    if !safe || entry.is_empty() {
        bail!("entry {entry:?} would be written outside {}", root.display());
    }
    Ok(root.join(relative))
}
