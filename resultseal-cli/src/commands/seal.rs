use crate::args::SealArgs;
use crate::keyfile::{read_private_key, read_public_key};
use crate::pool_config;
use anyhow::{bail, Context, Result};
use resultseal_package::{AuditEntry, PlainFile, ResultsWriter, WriterConfig};
use std::fs;
use std::path::{Component, Path};
use tracing::info;

pub async fn run(args: SealArgs, workers: Option<usize>) -> Result<()> {
    let recipients = args
        .recipients
        .iter()
        .map(|path| read_public_key(path))
        .collect::<Result<Vec<_>>>()?;
    let signer = read_private_key(&args.signer)?;

    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let name = entry_name(path, args.base.as_deref())?;
        let content = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        files.push(PlainFile::new(name, content));
    }

    let recipient_count = recipients.len();
    let config = WriterConfig::new(recipients).with_pool(pool_config(workers));
    let mut writer = ResultsWriter::new(config);
    writer.add_files(files).await?;

    let entry = AuditEntry::new(args.action, args.entity_id, args.role.into());
    writer.record_audit(entry, &signer)?;

    let file_count = writer.manifest().len();
    let bytes = writer.seal_to_bytes()?;
    fs::write(&args.output, &bytes)
        .with_context(|| format!("writing {}", args.output.display()))?;

    info!(output = %args.output.display(), bytes = bytes.len(), "package written");
    println!(
        "sealed {file_count} file(s) for {recipient_count} recipient(s) into {}",
        args.output.display()
    );
    Ok(())
}

/// Name a file is stored under: relative to `base` when given, otherwise
/// its file name. Components are joined with `/`.
fn entry_name(path: &Path, base: Option<&Path>) -> Result<String> {
    let relative = match base {
        Some(base) => path
            .strip_prefix(base)
            .with_context(|| format!("{} is not under {}", path.display(), base.display()))?,
        None => match path.file_name() {
            Some(name) => Path::new(name),
            None => bail!("{} has no file name", path.display()),
        },
    };

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => match part.to_str() {
                Some(part) => parts.push(part),
                None => bail!("{} is not valid UTF-8", path.display()),
            },
            Component::CurDir => {}
            _ => bail!("{} cannot be stored inside a package", relative.display()),
        }
    }
    if parts.is_empty() {
        bail!("{} names no file", path.display());
    }
    Ok(parts.join("/"))
}
