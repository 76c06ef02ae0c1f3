//! CLI command definitions and handlers.
//!
//! Every [`BucketStore`] operation has a subcommand. Handlers return an
//! [`OutputTable`] whose first row is the header.

pub mod counter;
pub mod entry;

use clap::Subcommand;
use kvstore_bucket::BucketStore;
use kvstore_utils::coding::{display_bytes, hex_decode, hex_encode};

use crate::output::{OutputFormat, OutputTable, Printer};

pub use counter::{CountArgs, NextSeqArgs, SeqArgs, SetSeqArgs};
pub use entry::{DeleteArgs, GetArgs, KeysArgs, PutArgs};

/// How bucket names, keys and values are written on the command line and
/// shown in output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum BytesFormat {
    /// UTF-8 text; non-printable output falls back to `0x`-prefixed hex.
    #[default]
    Text,
    /// Hex digits, both in arguments and in output.
    Hex,
}

impl BytesFormat {
    pub fn parse(self, arg: &str) -> anyhow::Result<Vec<u8>> {
        match self {
            BytesFormat::Text => Ok(arg.as_bytes().to_vec()),
            BytesFormat::Hex => {
                hex_decode(arg).ok_or_else(|| anyhow::anyhow!("invalid hex argument {arg:?}"))
            }
        }
    }

    pub fn show(self, bytes: &[u8]) -> String {
        match self {
            BytesFormat::Text => display_bytes(bytes),
            BytesFormat::Hex => hex_encode(bytes),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum StoreCommands {
    /// Insert or overwrite a key.
    Put(PutArgs),

    /// Print the value stored under a key.
    Get(GetArgs),

    /// Remove a key.
    #[command(alias = "rm")]
    Delete(DeleteArgs),

    /// List every key of a bucket in byte order.
    #[command(alias = "ls")]
    Keys(KeysArgs),

    /// Number of keys in a bucket.
    Count(CountArgs),

    /// Current sequence value of a bucket.
    Seq(SeqArgs),

    /// Advance a bucket's sequence and print the issued values.
    NextSeq(NextSeqArgs),

    /// Overwrite a bucket's sequence.
    SetSeq(SetSeqArgs),
}

impl StoreCommands {
    pub fn execute(&self, store: &dyn BucketStore, bytes: BytesFormat) -> anyhow::Result<OutputTable> {
        match self {
            Self::Put(args) => args.execute(store, bytes),
            Self::Get(args) => args.execute(store, bytes),
            Self::Delete(args) => args.execute(store, bytes),
            Self::Keys(args) => args.execute(store, bytes),
            Self::Count(args) => args.execute(store, bytes),
            Self::Seq(args) => args.execute(store, bytes),
            Self::NextSeq(args) => args.execute(store, bytes),
            Self::SetSeq(args) => args.execute(store, bytes),
        }
    }

    /// Execute and print the result in the given output format.
    pub fn run(
        &self,
        store: &dyn BucketStore,
        bytes: BytesFormat,
        output_format: OutputFormat,
    ) -> anyhow::Result<()> {
        let mut printer = Printer::stdout(output_format);
        match self.execute(store, bytes) {
            Ok(table) => {
                printer.print_table(&table)?;
                Ok(())
            }
            Err(e) => {
                printer.print_error(&format!("{:#}", e))?;
                Err(e)
            }
        }
    }
}
