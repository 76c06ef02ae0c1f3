//! Command-line interface for the bucketed kvstore.
//!
//! - [`commands::StoreCommands`]: one clap subcommand per store operation.
//! - [`options::StoreOptions`]: config file and backend/path overrides.
//! - [`output`]: aligned table or JSON rendering of command results.
//!
//! ```ignore
//! use clap::Parser;
//! use kvstore_cli::{BytesFormat, OutputFormat, StoreCommands, StoreOptions};
//!
//! #[derive(Parser)]
//! struct Cli {
//!     #[command(flatten)]
//!     store: StoreOptions,
//!
//!     #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
//!     format: OutputFormat,
//!
//!     #[command(subcommand)]
//!     command: StoreCommands,
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     let cli = Cli::parse();
//!     let config = cli.store.load()?.snapshot();
//!     let store = kvstore_bucket::open_store(&config)?;
//!     cli.command.run(store.as_ref(), BytesFormat::Text, cli.format)
//! }
//! ```

pub mod commands;
pub mod options;
pub mod output;

pub use commands::{BytesFormat, StoreCommands};
pub use options::{BackendArg, StoreOptions};
pub use output::{OutputFormat, OutputTable, Printer};
