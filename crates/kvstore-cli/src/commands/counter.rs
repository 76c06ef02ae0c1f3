//! Per-bucket counter commands: count, seq, next-seq, set-seq.

use clap::Args;
use kvstore_bucket::BucketStore;

use super::BytesFormat;
use crate::output::{kv_row, table_with_header, OutputTable};

#[derive(Debug, Args)]
pub struct CountArgs {
    pub bucket: String,
}

impl CountArgs {
    pub fn execute(&self, store: &dyn BucketStore, bytes: BytesFormat) -> anyhow::Result<OutputTable> {
        let count = store.count(&bytes.parse(&self.bucket)?);
        let mut table = table_with_header(&["bucket", "count"]);
        table.push(kv_row(&self.bucket, count));
        Ok(table)
    }
}

#[derive(Debug, Args)]
pub struct SeqArgs {
    pub bucket: String,
}

impl SeqArgs {
    pub fn execute(&self, store: &dyn BucketStore, bytes: BytesFormat) -> anyhow::Result<OutputTable> {
        let sequence = store.sequence(&bytes.parse(&self.bucket)?);
        let mut table = table_with_header(&["bucket", "sequence"]);
        table.push(kv_row(&self.bucket, sequence));
        Ok(table)
    }
}

#[derive(Debug, Args)]
pub struct NextSeqArgs {
    pub bucket: String,

    /// How many values to issue.
    #[arg(short = 'n', long, default_value_t = 1)]
    pub times: u32,
}

impl NextSeqArgs {
    pub fn execute(&self, store: &dyn BucketStore, bytes: BytesFormat) -> anyhow::Result<OutputTable> {
        let bucket = bytes.parse(&self.bucket)?;
        let mut table = table_with_header(&["bucket", "sequence"]);
        for _ in 0..self.times {
            table.push(kv_row(&self.bucket, store.next_sequence(&bucket)?));
        }
        Ok(table)
    }
}

#[derive(Debug, Args)]
pub struct SetSeqArgs {
    pub bucket: String,
    pub sequence: u64,
}

impl SetSeqArgs {
    pub fn execute(&self, store: &dyn BucketStore, bytes: BytesFormat) -> anyhow::Result<OutputTable> {
        store.set_sequence(&bytes.parse(&self.bucket)?, self.sequence)?;
        tracing::info!(bucket = %self.bucket, sequence = self.sequence, "sequence overwritten");
        let mut table = table_with_header(&["bucket", "sequence"]);
        table.push(kv_row(&self.bucket, self.sequence));
        Ok(table)
    }
}
