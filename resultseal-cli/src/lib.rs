//! The `resultseal` command-line tool.
//!
//! Thin wrappers over `resultseal-package`: every command loads PEM keys
//! from disk, builds an explicit writer or reader config and reports what
//! happened on stdout. Logs go to stderr.

pub mod args;
pub mod commands;
mod keyfile;

use resultseal_package::PoolConfig;

pub(crate) fn pool_config(workers: Option<usize>) -> PoolConfig {
    workers.map(PoolConfig::with_workers).unwrap_or_default()
}
