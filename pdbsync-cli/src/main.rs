//! peeringdb-sync
//!
//! Usage:
//!   peeringdb-sync database init [--clean]
//!   peeringdb-sync sync [--api-key KEY]
//!
//! Settings may also come from the environment or a `.env` file
//! (`PEERINGDB_API_KEY`, `PEERINGDB_DATABASE_FILE`).

use anyhow::Result;
use clap::Parser;
use pdbsync_cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let fallback = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_target(false)
        .compact()
        .init();

    pdbsync_cli::run(cli).await
}
