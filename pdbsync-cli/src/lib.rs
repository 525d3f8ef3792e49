//! Command-line surface of peeringdb-sync.
//!
//! `main.rs` only parses arguments and installs logging; every command lives
//! here so it can be driven from tests.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use pdbsync_schema::Catalog;
use pdbsync_store::{Store, WriteMode};
use pdbsync_sync::{
    EntityReport, LogProgress, PeeringDbClient, RunReport, SourceConfig, SyncConfig, SyncEngine,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "peeringdb-sync", version)]
#[command(about = "Synchronize PeeringDB records locally")]
#[command(
    long_about = "Synchronize PeeringDB data to a local database. The use of an API key is highly recommended."
)]
pub struct Cli {
    /// PeeringDB API key to use for authentication
    #[arg(short = 'k', long, env = "PEERINGDB_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Path to the file to use as SQLite database
    #[arg(
        short,
        long,
        env = "PEERINGDB_DATABASE_FILE",
        default_value = "peeringdb.db",
        global = true
    )]
    pub file: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create, delete or clear the database
    #[command(subcommand)]
    Database(DatabaseCommand),

    /// Synchronize the database with PeeringDB, updating existing records,
    /// adding new ones and deleting outdated ones
    Sync(SyncArgs),
}

#[derive(Subcommand, Debug)]
pub enum DatabaseCommand {
    /// Initialize the database with the schema
    Init {
        /// Remove the existing database before initializing it again
        #[arg(short, long)]
        clean: bool,
    },

    /// Delete the database and all its content
    Delete,

    /// Clear the database content, keeping the schema
    Clear,
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// PeeringDB API base URL
    #[arg(long, env = "PEERINGDB_BASE_URL", default_value = "https://www.peeringdb.com")]
    pub base_url: String,

    /// Objects per API request, 0 to fetch each type in one request
    #[arg(long, default_value_t = 0)]
    pub page_size: usize,

    /// How existing rows are updated: `on-conflict` or `probe`
    #[arg(long, default_value_t = WriteMode::OnConflict)]
    pub write_mode: WriteMode,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,
}

/// Runs the parsed command.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Database(DatabaseCommand::Init { clean }) => init_database(&cli.file, clean),
        Command::Database(DatabaseCommand::Delete) => delete_database(&cli.file),
        Command::Database(DatabaseCommand::Clear) => clear_database(&cli.file),
        Command::Sync(args) => sync(&cli.file, cli.api_key, &args).await.map(|_| ()),
    }
}

/// Creates the database file and every table and index.
pub fn init_database(path: &Path, clean: bool) -> Result<()> {
    let store = Store::create(path, clean)
        .with_context(|| format!("failed to initialize the database {}", path.display()))?;
    store
        .init_schema(Catalog::peeringdb().schema())
        .context("failed to create the database schema")?;
    info!("Database {} initialized", path.display());
    Ok(())
}

/// Removes the database file.
pub fn delete_database(path: &Path) -> Result<()> {
    let removed = pdbsync_store::delete_database(path)
        .with_context(|| format!("failed to delete the database {}", path.display()))?;
    if removed {
        info!("Database {} deleted", path.display());
    } else {
        info!("No database at {}", path.display());
    }
    Ok(())
}

/// Deletes every row, keeping the schema.
pub fn clear_database(path: &Path) -> Result<()> {
    let store = open_existing(path)?;
    let removed = store
        .clear(Catalog::peeringdb().schema())
        .context("failed to clear the database")?;
    info!("Database {} cleared, {} row(s) removed", path.display(), removed);
    Ok(())
}

/// Brings every table up to date with the PeeringDB API.
pub async fn sync(
    path: &Path,
    api_key: Option<String>,
    args: &SyncArgs,
) -> Result<RunReport<EntityReport>> {
    let store = open_existing(path)?;
    let source = PeeringDbClient::new(
        SourceConfig::default()
            .with_base_url(args.base_url.clone())
            .with_api_key(api_key)
            .with_page_size(args.page_size)
            .with_timeout(Duration::from_secs(args.timeout)),
    )?;
    if source.config().api_key.is_none() {
        info!("No API key configured, requests are subject to anonymous rate limits");
    }

    let engine = SyncEngine::new(store, Arc::new(source), Catalog::peeringdb())
        .with_config(SyncConfig {
            write_mode: args.write_mode,
        })
        .with_progress(Arc::new(LogProgress::factory()));
    let report = engine.run().await.context("synchronization failed")?;

    let (inserted, updated, deleted) =
        report
            .results
            .iter()
            .fold((0, 0, 0), |(i, u, d), (_, entity)| {
                (
                    i + entity.summary.inserted,
                    u + entity.summary.updated,
                    d + entity.summary.deleted,
                )
            });
    info!(inserted, updated, deleted, "Synchronization complete");
    Ok(report)
}

fn open_existing(path: &Path) -> Result<Store> {
    if !path.exists() {
        bail!(
            "database {} does not exist, run `peeringdb-sync database init` first",
            path.display()
        );
    }
    Store::open(path).with_context(|| format!("failed to open the database {}", path.display()))
}
