mod find;
mod index;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use find::FindArgs;
use index::IndexCommands;

#[derive(Debug, Parser)]
#[command(name = "storefind")]
#[command(about = "Locate the nearest stores to you")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Find the stores nearest to an address, zip code, or coordinate
    Find(FindArgs),
    /// Manage the store index
    Index {
        #[command(subcommand)]
        command: IndexCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = storefind_core::load_app_config()?;

    // Logs go to stderr; stdout carries results only.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Find(args) => find::run_find(&config, &args).await,
        Commands::Index { command } => match command {
            IndexCommands::Create => index::run_index_create(&config).await,
            IndexCommands::Load { csv, append } => {
                index::run_index_load(&config, &csv, append).await
            }
        },
    }
}
