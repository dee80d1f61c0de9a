use anyhow::Result;
use clap::Parser;
use resultseal_cli::args::{AppCommands, Cli};
use resultseal_cli::commands::{fingerprint, keygen, open, seal};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        AppCommands::Seal(args) => seal::run(args, cli.workers).await?,
        AppCommands::Open(args) => open::run(args, cli.workers).await?,
        AppCommands::Fingerprint { key } => fingerprint::run(&key)?,
        AppCommands::Keygen(args) => keygen::run(args)?,
    }

    Ok(())
}
