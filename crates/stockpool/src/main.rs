//! Stockpool command-line tool.

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;

use stockpool::cli::{self, Commands, Identity};
use stockpool_core::config::load_config;
use stockpool_core::tracing_init::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "stockpool")]
#[command(
    version,
    about = "Stockpool - shared-account stock allocation and subscription tracking"
)]
struct Args {
    /// Explicit JSON config file (layered over the global one).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to SQLite database file.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Admin password for admin subcommands.
    #[arg(long, global = true, env = "STOCKPOOL_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,

    /// Client phone number for client subcommands.
    #[arg(long, global = true, env = "STOCKPOOL_PHONE")]
    phone: Option<String>,

    /// Client name, used when the phone is seen for the first time.
    #[arg(long, global = true)]
    name: Option<String>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(path) = args.db_path {
        config.storage.database_path = Some(path);
    }

    init_tracing(
        &format!("stockpool={}", config.logging.level),
        args.log_json || config.logging.json,
    );
    debug!(version = env!("CARGO_PKG_VERSION"), "Starting stockpool");

    let identity = Identity {
        admin_password: args.admin_password,
        phone: args.phone,
        name: args.name,
    };

    if let Err(e) = cli::run(args.command, &identity, &config).await {
        match e.downcast_ref::<stockpool::Error>() {
            Some(err) => anyhow::bail!(cli::describe_error(err)),
            None => return Err(e),
        }
    }
    Ok(())
}
