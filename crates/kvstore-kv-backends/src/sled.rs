//! Persistent engine over a sled database.
//!
//! The default tree is the whole flat keyspace. Staged writes collect in a
//! `sled::Batch`, which sled applies atomically.

use std::path::Path;

use kvstore_kv::{
    range_bounds, range_is_empty, GetRangeResult, KeySelector, KeyValue, KvEngine, OpenKvEngine,
    ReadOnlyTransaction, ReadWriteTransaction,
};
use kvstore_types::{status_code_t, Result, Status, StatusCode};

/// Wrap a sled error into a [`Status`] with the given code.
pub fn sled_status(code: status_code_t, err: sled::Error) -> Status {
    Status::with_message(code, err.to_string())
}

fn open_failed(err: sled::Error) -> Status {
    sled_status(StatusCode::KV_STORE_OPEN_FAILED, err)
}

/// Cloning shares the underlying database.
#[derive(Clone)]
pub struct SledEngine {
    db: sled::Db,
}

impl SledEngine {
    /// Database in a scratch location, removed on drop.
    #[cfg(test)]
    fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open().map_err(open_failed)?;
        Ok(Self { db })
    }

    /// Walks the whole tree.
    #[cfg(test)]
    fn len(&self) -> usize {
        self.db.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    fn txn(&self) -> SledTxn {
        SledTxn {
            db: self.db.clone(),
            batch: sled::Batch::default(),
        }
    }
}

impl KvEngine for SledEngine {
    type RoTxn = SledTxn;
    type RwTxn = SledTxn;

    fn create_readonly_transaction(&self) -> SledTxn {
        self.txn()
    }

    fn create_readwrite_transaction(&self) -> SledTxn {
        self.txn()
    }

    fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| sled_status(StatusCode::IO_ERROR, e))?;
        Ok(())
    }
}

impl OpenKvEngine for SledEngine {
    const NAME: &'static str = "sled";

    fn open(path: &Path) -> Result<Self> {
        let db = sled::open(path).map_err(open_failed)?;
        tracing::debug!(path = %path.display(), recovered = db.was_recovered(), "sled engine opened");
        Ok(Self { db })
    }
}

/// Reads hit the database directly; writes wait in the batch until commit.
pub struct SledTxn {
    db: sled::Db,
    batch: sled::Batch,
}

impl ReadOnlyTransaction for SledTxn {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.db.get(key) {
            Ok(found) => Ok(found.map(|ivec| ivec.to_vec())),
            Err(e) => Err(sled_status(StatusCode::KV_STORE_GET_ERROR, e)),
        }
    }

    fn contains(&self, key: &[u8]) -> Result<bool> {
        self.db
            .contains_key(key)
            .map_err(|e| sled_status(StatusCode::KV_STORE_GET_ERROR, e))
    }

    fn get_range(
        &self,
        begin: &KeySelector,
        end: &KeySelector,
        limit: usize,
    ) -> Result<GetRangeResult> {
        if range_is_empty(begin, end) {
            return Ok(GetRangeResult::default());
        }
        let mut page = GetRangeResult::default();
        for item in self.db.range::<&[u8], _>(range_bounds(begin, end)) {
            let (key, value) = item.map_err(|e| sled_status(StatusCode::KV_STORE_ITERATE_ERROR, e))?;
            if page.kvs.len() == limit {
                page.has_more = true;
                break;
            }
            page.kvs.push(KeyValue {
                key: key.to_vec(),
                value: value.to_vec(),
            });
        }
        Ok(page)
    }
}

impl ReadWriteTransaction for SledTxn {
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.batch.insert(key, value);
        Ok(())
    }

    fn clear(&mut self, key: &[u8]) -> Result<()> {
        self.batch.remove(key);
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        self.batch = sled::Batch::default();
        Ok(())
    }

    /// `apply_batch` is the only write; once it returns `Ok` the batch has landed.
    fn commit(&mut self) -> Result<()> {
        self.db
            .apply_batch(std::mem::take(&mut self.batch))
            .map_err(|e| sled_status(StatusCode::KV_STORE_SET_ERROR, e))
    }
}
