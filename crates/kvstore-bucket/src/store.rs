use std::path::Path;

use crate::error::{StoreError, StoreResult};
use crate::guard::StoreState;

/// A key-value store partitioned into named buckets, with a live-entry count
/// and a monotonically increasing sequence counter per bucket.
///
/// Buckets exist implicitly: a bucket that was never written has no keys, a
/// count of 0 and a sequence of 0. Every operation other than `open`,
/// `close`, `state` and `is_open` fails with [`StoreError::Closed`] unless
/// the store is open, except `count` and `sequence`, which report 0.
///
/// Empty bucket names and keys are rejected. A flat store may reject more,
/// depending on its key layout: the separator layout refuses bucket names
/// containing the separator and keys that would alias a counter record.
///
/// Implementations are safe to share between threads. Reads run
/// concurrently; mutations are serialized, so `count` always equals the
/// number of keys `all_keys` returns and `next_sequence` never hands out the
/// same value twice.
pub trait BucketStore: Send + Sync {
    /// Open (or create) the backing database at `path`.
    fn open(&self, path: &Path) -> StoreResult<()>;

    /// Release the backing database. A no-op unless the store is open.
    fn close(&self);

    fn state(&self) -> StoreState;

    fn is_open(&self) -> bool {
        self.state() == StoreState::Open
    }

    /// Insert or overwrite `key` in `bucket`. The count grows only when the
    /// key is new.
    fn put(&self, bucket: &[u8], key: &[u8], value: &[u8]) -> StoreResult<()>;

    /// Value stored under `key`, as an owned copy.
    fn get(&self, bucket: &[u8], key: &[u8]) -> StoreResult<Vec<u8>>;

    /// Remove `key`, failing with [`StoreError::KeyNotFound`] if it is absent.
    fn delete(&self, bucket: &[u8], key: &[u8]) -> StoreResult<()>;

    /// Every key in `bucket`, in ascending byte order.
    fn all_keys(&self, bucket: &[u8]) -> StoreResult<Vec<Vec<u8>>>;

    /// Number of live keys in `bucket`; 0 if it cannot be determined.
    fn count(&self, bucket: &[u8]) -> u64;

    /// Last issued sequence value of `bucket`; 0 if it cannot be determined.
    fn sequence(&self, bucket: &[u8]) -> u64;

    /// Increment the sequence and return the new value.
    fn next_sequence(&self, bucket: &[u8]) -> StoreResult<u64>;

    /// Overwrite the sequence. Lowering it is allowed.
    fn set_sequence(&self, bucket: &[u8], sequence: u64) -> StoreResult<()>;
}

pub(crate) fn check_bucket(bucket: &[u8]) -> StoreResult<()> {
    if bucket.is_empty() {
        return Err(StoreError::InvalidBucket);
    }
    Ok(())
}

pub(crate) fn check_entry(bucket: &[u8], key: &[u8]) -> StoreResult<()> {
    check_bucket(bucket)?;
    if key.is_empty() {
        return Err(StoreError::InvalidKey);
    }
    Ok(())
}

/// Collapse a counter read into the infallible `count`/`sequence` contract.
pub(crate) fn counter_or_zero(kind: &'static str, bucket: &[u8], result: StoreResult<u64>) -> u64 {
    match result {
        Ok(value) => value,
        Err(StoreError::Closed | StoreError::InvalidBucket) => 0,
        Err(err) => {
            tracing::warn!(
                kind,
                bucket = %kvstore_utils::coding::display_bytes(bucket),
                error = %err,
                "counter read failed, reporting 0"
            );
            0
        }
    }
}
