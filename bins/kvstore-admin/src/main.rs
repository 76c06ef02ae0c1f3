use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use kvstore_cli::{BytesFormat, OutputFormat, StoreCommands, StoreOptions};
use kvstore_logging::init_logging;

/// kvstore administration tool
///
/// Runs a single bucket-store operation against the configured backend and
/// prints the result.
#[derive(Parser, Debug)]
#[command(name = "kvstore-admin", version, about)]
struct Cli {
    #[command(flatten)]
    store: StoreOptions,

    /// Output format (table or json).
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// How bucket names, keys and values are given and shown.
    #[arg(long, value_enum, default_value_t = BytesFormat::Text)]
    bytes: BytesFormat,

    /// Enable debug logging.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Log how long the command took.
    #[arg(long, default_value_t = false)]
    profile: bool,

    #[command(subcommand)]
    command: StoreCommands,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = cli.store.load()?.snapshot();

    let log_config = if cli.verbose {
        config.log.clone().with_level("debug")
    } else {
        config.log.clone()
    };
    let _log_guard = init_logging(&log_config).context("initializing logging")?;

    let store = kvstore_bucket::open_store(&config)?;
    tracing::debug!(backend = config.backend.as_str(), "running command");

    let start = Instant::now();
    let result = cli.command.run(store.as_ref(), cli.bytes, cli.format);
    if cli.profile {
        tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "command finished");
    }

    store.close();
    result
}
