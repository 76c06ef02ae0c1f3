//! Bucket emulation over a flat key-value engine.
//!
//! Entries and per-bucket counters share the engine's keyspace through a
//! [`KeyCodec`]. Each mutation stages the entry change and the count record
//! in one read-write transaction, so both land atomically.

use std::path::Path;

use kvstore_kv::{KvEngine, OpenKvEngine, ReadOnlyTransaction, ReadWriteTransaction};
use kvstore_utils::coding::display_bytes;

use crate::codec::{KeyCodec, LengthPrefixedCodec};
use crate::error::{StoreError, StoreResult};
use crate::guard::{ConcurrencyGuard, StoreState};
use crate::ledger;
use crate::store::{check_bucket, check_entry, counter_or_zero, BucketStore};

pub struct FlatBucketStore<E: OpenKvEngine> {
    codec: Box<dyn KeyCodec>,
    guard: ConcurrencyGuard<E>,
}

impl<E: OpenKvEngine> FlatBucketStore<E> {
    pub fn new(codec: Box<dyn KeyCodec>) -> Self {
        Self {
            codec,
            guard: ConcurrencyGuard::new(),
        }
    }

    pub fn codec(&self) -> &dyn KeyCodec {
        self.codec.as_ref()
    }

    fn admit_bucket(&self, bucket: &[u8]) -> StoreResult<()> {
        check_bucket(bucket)?;
        if !self.codec.accepts_bucket(bucket) {
            return Err(StoreError::InvalidBucket);
        }
        Ok(())
    }

    /// Composite key of a user entry. Keys aliasing a counter record are
    /// refused so `put` can never overwrite the bucket's metadata.
    fn admit_entry(&self, bucket: &[u8], key: &[u8]) -> StoreResult<Vec<u8>> {
        check_entry(bucket, key)?;
        self.admit_bucket(bucket)?;
        if self.codec.is_reserved(bucket, key) {
            return Err(StoreError::InvalidKey);
        }
        Ok(self.codec.entry_key(bucket, key))
    }
}

impl<E: OpenKvEngine> Default for FlatBucketStore<E> {
    fn default() -> Self {
        Self::new(Box::new(LengthPrefixedCodec))
    }
}

impl<E: OpenKvEngine> BucketStore for FlatBucketStore<E> {
    fn open(&self, path: &Path) -> StoreResult<()> {
        self.guard.open_with(|| {
            E::open(path).map_err(|source| StoreError::OpenFailed {
                path: path.to_path_buf(),
                source,
            })
        })?;
        tracing::info!(engine = E::NAME, path = %path.display(), "bucket store opened");
        Ok(())
    }

    fn close(&self) {
        let closed = self.guard.close_with(|engine| {
            if let Err(e) = engine.flush() {
                tracing::warn!(engine = E::NAME, error = %e, "flush on close failed");
            }
        });
        if closed {
            tracing::info!(engine = E::NAME, "bucket store closed");
        }
    }

    fn state(&self) -> StoreState {
        self.guard.state()
    }

    fn put(&self, bucket: &[u8], key: &[u8], value: &[u8]) -> StoreResult<()> {
        let entry = self.admit_entry(bucket, key)?;
        let codec = self.codec();
        self.guard.write(|engine| {
            let mut txn = engine.create_readwrite_transaction();
            if txn.contains(&entry)? {
                txn.set(&entry, value)?;
            } else {
                let count = ledger::read_count(&txn, codec, bucket)? + 1;
                txn.set(&entry, value)?;
                ledger::write_count(&mut txn, codec, bucket, count)?;
                tracing::debug!(bucket = %display_bytes(bucket), count, "entry added");
            }
            txn.commit()?;
            Ok(())
        })
    }

    fn get(&self, bucket: &[u8], key: &[u8]) -> StoreResult<Vec<u8>> {
        let entry = self.admit_entry(bucket, key)?;
        self.guard.read(|engine| {
            engine
                .create_readonly_transaction()
                .get(&entry)?
                .ok_or(StoreError::KeyNotFound)
        })
    }

    fn delete(&self, bucket: &[u8], key: &[u8]) -> StoreResult<()> {
        let entry = self.admit_entry(bucket, key)?;
        let codec = self.codec();
        self.guard.write(|engine| {
            let mut txn = engine.create_readwrite_transaction();
            if !txn.contains(&entry)? {
                return Err(StoreError::KeyNotFound);
            }
            let count = ledger::read_count(&txn, codec, bucket)?.saturating_sub(1);
            txn.clear(&entry)?;
            ledger::write_count(&mut txn, codec, bucket, count)?;
            txn.commit()?;
            tracing::debug!(bucket = %display_bytes(bucket), count, "entry removed");
            Ok(())
        })
    }

    fn all_keys(&self, bucket: &[u8]) -> StoreResult<Vec<Vec<u8>>> {
        self.admit_bucket(bucket)?;
        let codec = self.codec();
        self.guard.read(|engine| {
            let ro = engine.create_readonly_transaction();
            let kvs = ro.scan_prefix(&codec.entry_prefix(bucket))?;
            Ok(kvs
                .into_iter()
                .filter_map(|kv| codec.decode_entry_key(&kv.key, bucket))
                .collect())
        })
    }

    fn count(&self, bucket: &[u8]) -> u64 {
        let result = self.admit_bucket(bucket).and_then(|()| {
            self.guard.read(|engine| {
                let ro = engine.create_readonly_transaction();
                Ok(ledger::read_count(&ro, self.codec(), bucket)?)
            })
        });
        counter_or_zero("count", bucket, result)
    }

    fn sequence(&self, bucket: &[u8]) -> u64 {
        let result = self.admit_bucket(bucket).and_then(|()| {
            self.guard.read(|engine| {
                let ro = engine.create_readonly_transaction();
                Ok(ledger::read_sequence(&ro, self.codec(), bucket)?)
            })
        });
        counter_or_zero("sequence", bucket, result)
    }

    fn next_sequence(&self, bucket: &[u8]) -> StoreResult<u64> {
        self.admit_bucket(bucket)?;
        let codec = self.codec();
        self.guard.write(|engine| {
            let mut txn = engine.create_readwrite_transaction();
            let next = ledger::read_sequence(&txn, codec, bucket)?
                .checked_add(1)
                .ok_or(StoreError::SequenceOverflow)?;
            ledger::write_sequence(&mut txn, codec, bucket, next)?;
            txn.commit()?;
            tracing::debug!(bucket = %display_bytes(bucket), sequence = next, "sequence advanced");
            Ok(next)
        })
    }

    fn set_sequence(&self, bucket: &[u8], sequence: u64) -> StoreResult<()> {
        self.admit_bucket(bucket)?;
        let codec = self.codec();
        self.guard.write(|engine| {
            let mut txn = engine.create_readwrite_transaction();
            ledger::write_sequence(&mut txn, codec, bucket, sequence)?;
            txn.commit()?;
            tracing::debug!(bucket = %display_bytes(bucket), sequence, "sequence set");
            Ok(())
        })
    }
}
