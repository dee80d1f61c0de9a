//! Writer and reader configuration.
//!
//! Key material is always passed in explicitly; nothing in this crate reads
//! keys from process-wide state.

use resultseal_crypto::{PrivateKey, PublicKey};
use serde::{Deserialize, Serialize};

/// Upper bound on the default worker count.
const MAX_DEFAULT_WORKERS: usize = 8;

/// Sizing for the per-file worker pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum files processed concurrently. Always at least 1.
    pub workers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            workers: cores.clamp(1, MAX_DEFAULT_WORKERS),
        }
    }
}

impl PoolConfig {
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }
}

/// Configuration for [`crate::ResultsWriter`].
#[derive(Clone, Debug)]
pub struct WriterConfig {
    /// Recipients used by `add_file_for_all` and `add_files`.
    pub recipients: Vec<PublicKey>,
    pub pool: PoolConfig,
}

impl WriterConfig {
    pub fn new(recipients: Vec<PublicKey>) -> Self {
        Self {
            recipients,
            pool: PoolConfig::default(),
        }
    }

    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }
}

/// Configuration for [`crate::ResultsReader`].
#[derive(Clone, Debug)]
pub struct ReaderConfig {
    /// Key every audit entry must be signed with.
    pub trusted_signer: PublicKey,
    /// The local recipient's private key.
    pub local_key: PrivateKey,
    pub pool: PoolConfig,
}

impl ReaderConfig {
    pub fn new(trusted_signer: PublicKey, local_key: PrivateKey) -> Self {
        Self {
            trusted_signer,
            local_key,
            pool: PoolConfig::default(),
        }
    }

    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }
}
