//! Bounded worker pool for per-file crypto.
//!
//! Each file owns its key and IV, so files are sealed or opened on blocking
//! tasks with no shared mutable state. A semaphore caps how many run at
//! once. Results are handed back in input order; the caller stays the only
//! one that touches the manifest or the container.

use crate::codec::{open_file, seal_file, PlainFile, SealedFile};
use crate::error::{PackageError, PackageResult};
use crate::manifest::ResultsFile;
use resultseal_crypto::{PrivateKey, PublicKey};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

/// Ciphertext read from the container, ready to be opened.
pub(crate) struct OpenJob {
    pub record: ResultsFile,
    pub ciphertext: Vec<u8>,
}

/// Seals every file concurrently. The first failure aborts the batch.
pub(crate) async fn seal_batch(
    files: Vec<PlainFile>,
    recipients: Arc<[PublicKey]>,
    workers: usize,
) -> PackageResult<Vec<SealedFile>> {
    let total = files.len();
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks = JoinSet::new();

    for (index, file) in files.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| PackageError::Worker(e.to_string()))?;
        let recipients = Arc::clone(&recipients);
        tasks.spawn_blocking(move || {
            let _permit = permit;
            (index, seal_file(&file.path, &file.content, &recipients))
        });
    }

    let mut sealed = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined.map_err(|e| PackageError::Worker(e.to_string()))?;
        sealed.push((index, result?));
    }

    sealed.sort_by_key(|(index, _)| *index);
    debug!(files = total, workers, "sealed batch");
    Ok(sealed.into_iter().map(|(_, file)| file).collect())
}

/// Opens every job concurrently. Failures stay attached to their file.
pub(crate) async fn open_batch(
    jobs: Vec<OpenJob>,
    local_key: Arc<PrivateKey>,
    workers: usize,
) -> PackageResult<Vec<(ResultsFile, PackageResult<Vec<u8>>)>> {
    let total = jobs.len();
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks = JoinSet::new();

    for (index, job) in jobs.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| PackageError::Worker(e.to_string()))?;
        let local_key = Arc::clone(&local_key);
        tasks.spawn_blocking(move || {
            let _permit = permit;
            let result = open_file(&job.record, &job.ciphertext, &local_key);
            (index, job.record, result)
        });
    }

    let mut opened = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        opened.push(joined.map_err(|e| PackageError::Worker(e.to_string()))?);
    }

    opened.sort_by_key(|(index, _, _)| *index);
    debug!(files = total, workers, "opened batch");
    Ok(opened
        .into_iter()
        .map(|(_, record, result)| (record, result))
        .collect())
}
