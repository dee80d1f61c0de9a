//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use resultseal_package::AuditRole;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "resultseal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Seal files into encrypted results packages and open them again")]
pub struct Cli {
    /// Files processed concurrently (defaults to the number of cores, max 8)
    #[arg(long, global = true)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: AppCommands,
}

#[derive(Debug, Subcommand)]
pub enum AppCommands {
    /// Encrypt files for one or more recipients and sign the package
    Seal(SealArgs),
    /// Verify a package and decrypt every file addressed to you
    Open(OpenArgs),
    /// Print the fingerprint of a public (or private) key
    Fingerprint {
        /// PEM key file
        key: PathBuf,
    },
    /// Generate an RSA key pair
    Keygen(KeygenArgs),
}

#[derive(Debug, Args)]
pub struct SealArgs {
    /// Recipient public key (PEM). Repeat for several recipients.
    #[arg(short, long = "recipient", required = true)]
    pub recipients: Vec<PathBuf>,

    /// Private key (PEM) used to sign the audit entry
    #[arg(short, long)]
    pub signer: PathBuf,

    /// Who produced the package
    #[arg(long)]
    pub entity_id: String,

    #[arg(long, value_enum, default_value_t = RoleArg::Member)]
    pub role: RoleArg,

    #[arg(long, default_value = "created")]
    pub action: String,

    /// Store paths relative to this directory instead of by file name
    #[arg(long)]
    pub base: Option<PathBuf>,

    /// Where to write the package
    #[arg(short, long)]
    pub output: PathBuf,

    /// Files to seal
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct OpenArgs {
    /// Your private key (PEM)
    #[arg(short, long)]
    pub key: PathBuf,

    /// Public key (PEM) the audit trail must be signed with
    #[arg(short, long = "trusted-signer")]
    pub trusted_signer: PathBuf,

    /// Directory to write decrypted files into
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Package to open
    pub package: PathBuf,
}

#[derive(Debug, Args)]
pub struct KeygenArgs {
    /// Output prefix: writes <PREFIX>.pem and <PREFIX>.pub.pem
    #[arg(short, long)]
    pub output: PathBuf,

    #[arg(long, default_value_t = 2048)]
    pub bits: usize,

    /// Overwrite existing key files
    #[arg(long)]
    pub force: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Admin,
    Researcher,
    Member,
}

impl From<RoleArg> for AuditRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => AuditRole::Admin,
            RoleArg::Researcher => AuditRole::Researcher,
            RoleArg::Member => AuditRole::Member,
        }
    }
}
