//! Entry commands: put, get, delete, keys.

use clap::Args;
use kvstore_bucket::BucketStore;

use super::BytesFormat;
use crate::output::{table_with_header, OutputTable};

#[derive(Debug, Args)]
pub struct PutArgs {
    pub bucket: String,
    pub key: String,
    pub value: String,
}

impl PutArgs {
    pub fn execute(&self, store: &dyn BucketStore, bytes: BytesFormat) -> anyhow::Result<OutputTable> {
        let bucket = bytes.parse(&self.bucket)?;
        store.put(&bucket, &bytes.parse(&self.key)?, &bytes.parse(&self.value)?)?;

        let mut table = table_with_header(&["bucket", "key", "count"]);
        table.push(vec![
            self.bucket.clone(),
            self.key.clone(),
            store.count(&bucket).to_string(),
        ]);
        Ok(table)
    }
}

#[derive(Debug, Args)]
pub struct GetArgs {
    pub bucket: String,
    pub key: String,
}

impl GetArgs {
    pub fn execute(&self, store: &dyn BucketStore, bytes: BytesFormat) -> anyhow::Result<OutputTable> {
        let value = store.get(&bytes.parse(&self.bucket)?, &bytes.parse(&self.key)?)?;

        let mut table = table_with_header(&["key", "value"]);
        table.push(vec![self.key.clone(), bytes.show(&value)]);
        Ok(table)
    }
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub bucket: String,
    pub key: String,
}

impl DeleteArgs {
    pub fn execute(&self, store: &dyn BucketStore, bytes: BytesFormat) -> anyhow::Result<OutputTable> {
        let bucket = bytes.parse(&self.bucket)?;
        store.delete(&bucket, &bytes.parse(&self.key)?)?;

        let mut table = table_with_header(&["bucket", "deleted", "count"]);
        table.push(vec![
            self.bucket.clone(),
            self.key.clone(),
            store.count(&bucket).to_string(),
        ]);
        Ok(table)
    }
}

#[derive(Debug, Args)]
pub struct KeysArgs {
    pub bucket: String,

    /// Print only the first N keys.
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

impl KeysArgs {
    pub fn execute(&self, store: &dyn BucketStore, bytes: BytesFormat) -> anyhow::Result<OutputTable> {
        let keys = store.all_keys(&bytes.parse(&self.bucket)?)?;
        let limit = self.limit.unwrap_or(keys.len());

        let mut table = table_with_header(&["key"]);
        table.extend(keys.iter().take(limit).map(|k| vec![bytes.show(k)]));
        Ok(table)
    }
}
