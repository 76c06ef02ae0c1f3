//! Bucket store over sled's named trees.
//!
//! Every bucket maps to its own tree, named by [`BUCKET_TREE_PREFIX`] plus
//! the bucket name, so the engine keeps per-bucket isolation and counts
//! itself. Sequences live in one reserved tree keyed by bucket name, each
//! value a big-endian `u64`. Read paths never create trees.

use std::path::Path;

use kvstore_kv_backends::sled_status;
use kvstore_types::{status_code_t, StatusCode};
use kvstore_utils::coding::display_bytes;

use crate::error::{StoreError, StoreResult};
use crate::guard::{ConcurrencyGuard, StoreState};
use crate::store::{check_bucket, check_entry, counter_or_zero, BucketStore};

pub const BUCKET_TREE_PREFIX: &[u8] = b"bucket/";
pub const SEQUENCE_TREE: &[u8] = b"sequence";

fn engine_error(code: status_code_t) -> impl FnOnce(sled::Error) -> StoreError {
    move |e| StoreError::Engine(sled_status(code, e))
}

fn tree_name(bucket: &[u8]) -> Vec<u8> {
    let mut name = Vec::with_capacity(BUCKET_TREE_PREFIX.len() + bucket.len());
    name.extend_from_slice(BUCKET_TREE_PREFIX);
    name.extend_from_slice(bucket);
    name
}

fn decode_sequence(bucket: &[u8], raw: &[u8]) -> u64 {
    match <[u8; 8]>::try_from(raw) {
        Ok(bytes) => u64::from_be_bytes(bytes),
        Err(_) => {
            tracing::warn!(
                bucket = %display_bytes(bucket),
                len = raw.len(),
                "malformed sequence record, treating as 0"
            );
            0
        }
    }
}

struct NativeHandle {
    db: sled::Db,
    sequences: sled::Tree,
}

impl NativeHandle {
    fn open(path: &Path) -> StoreResult<Self> {
        let open_failed = |e| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source: sled_status(StatusCode::KV_STORE_OPEN_FAILED, e),
        };
        let db = sled::open(path).map_err(open_failed)?;
        let sequences = db.open_tree(SEQUENCE_TREE).map_err(open_failed)?;
        Ok(Self { db, sequences })
    }

    /// The bucket's tree if it was ever created.
    fn existing_tree(&self, bucket: &[u8]) -> StoreResult<Option<sled::Tree>> {
        let name = tree_name(bucket);
        let exists = self
            .db
            .tree_names()
            .iter()
            .any(|n| &n[..] == name.as_slice());
        if !exists {
            return Ok(None);
        }
        self.db
            .open_tree(name)
            .map(Some)
            .map_err(engine_error(StatusCode::KV_STORE_GET_ERROR))
    }

    fn read_sequence(&self, bucket: &[u8]) -> StoreResult<u64> {
        let raw = self
            .sequences
            .get(bucket)
            .map_err(engine_error(StatusCode::KV_STORE_GET_ERROR))?;
        Ok(raw.map_or(0, |raw| decode_sequence(bucket, &raw)))
    }

    fn write_sequence(&self, bucket: &[u8], sequence: u64) -> StoreResult<()> {
        self.sequences
            .insert(bucket, sequence.to_be_bytes().to_vec())
            .map_err(engine_error(StatusCode::KV_STORE_SET_ERROR))?;
        Ok(())
    }
}

#[derive(Default)]
pub struct NativeBucketStore {
    guard: ConcurrencyGuard<NativeHandle>,
}

impl NativeBucketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BucketStore for NativeBucketStore {
    fn open(&self, path: &Path) -> StoreResult<()> {
        self.guard.open_with(|| NativeHandle::open(path))?;
        tracing::info!(engine = "sled-native", path = %path.display(), "bucket store opened");
        Ok(())
    }

    fn close(&self) {
        let closed = self.guard.close_with(|handle| {
            if let Err(e) = handle.db.flush() {
                tracing::warn!(engine = "sled-native", error = %e, "flush on close failed");
            }
        });
        if closed {
            tracing::info!(engine = "sled-native", "bucket store closed");
        }
    }

    fn state(&self) -> StoreState {
        self.guard.state()
    }

    fn put(&self, bucket: &[u8], key: &[u8], value: &[u8]) -> StoreResult<()> {
        check_entry(bucket, key)?;
        self.guard.write(|handle| {
            let tree = handle
                .db
                .open_tree(tree_name(bucket))
                .map_err(engine_error(StatusCode::KV_STORE_SET_ERROR))?;
            tree.insert(key, value)
                .map_err(engine_error(StatusCode::KV_STORE_SET_ERROR))?;
            Ok(())
        })
    }

    fn get(&self, bucket: &[u8], key: &[u8]) -> StoreResult<Vec<u8>> {
        check_entry(bucket, key)?;
        self.guard.read(|handle| {
            let tree = handle
                .existing_tree(bucket)?
                .ok_or(StoreError::KeyNotFound)?;
            tree.get(key)
                .map_err(engine_error(StatusCode::KV_STORE_GET_ERROR))?
                .map(|v| v.to_vec())
                .ok_or(StoreError::KeyNotFound)
        })
    }

    fn delete(&self, bucket: &[u8], key: &[u8]) -> StoreResult<()> {
        check_entry(bucket, key)?;
        self.guard.write(|handle| {
            let tree = handle
                .existing_tree(bucket)?
                .ok_or(StoreError::KeyNotFound)?;
            tree.remove(key)
                .map_err(engine_error(StatusCode::KV_STORE_SET_ERROR))?
                .map(|_| ())
                .ok_or(StoreError::KeyNotFound)
        })
    }

    fn all_keys(&self, bucket: &[u8]) -> StoreResult<Vec<Vec<u8>>> {
        check_bucket(bucket)?;
        self.guard.read(|handle| {
            let Some(tree) = handle.existing_tree(bucket)? else {
                return Ok(Vec::new());
            };
            tree.iter()
                .keys()
                .map(|k| {
                    k.map(|k| k.to_vec())
                        .map_err(engine_error(StatusCode::KV_STORE_ITERATE_ERROR))
                })
                .collect()
        })
    }

    fn count(&self, bucket: &[u8]) -> u64 {
        let result = check_bucket(bucket).and_then(|()| {
            self.guard.read(|handle| {
                Ok(handle
                    .existing_tree(bucket)?
                    .map_or(0, |tree| tree.len() as u64))
            })
        });
        counter_or_zero("count", bucket, result)
    }

    fn sequence(&self, bucket: &[u8]) -> u64 {
        let result =
            check_bucket(bucket).and_then(|()| self.guard.read(|h| h.read_sequence(bucket)));
        counter_or_zero("sequence", bucket, result)
    }

    fn next_sequence(&self, bucket: &[u8]) -> StoreResult<u64> {
        check_bucket(bucket)?;
        self.guard.write(|handle| {
            let next = handle
                .read_sequence(bucket)?
                .checked_add(1)
                .ok_or(StoreError::SequenceOverflow)?;
            handle.write_sequence(bucket, next)?;
            tracing::debug!(bucket = %display_bytes(bucket), sequence = next, "sequence advanced");
            Ok(next)
        })
    }

    fn set_sequence(&self, bucket: &[u8], sequence: u64) -> StoreResult<()> {
        check_bucket(bucket)?;
        self.guard.write(|handle| {
            handle.write_sequence(bucket, sequence)?;
            tracing::debug!(bucket = %display_bytes(bucket), sequence, "sequence set");
            Ok(())
        })
    }
}
