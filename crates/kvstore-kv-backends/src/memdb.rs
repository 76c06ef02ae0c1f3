//! Volatile engine over a `BTreeMap` guarded by a `parking_lot::RwLock`.
//!
//! Handles are cheap to clone and share one map. Nothing survives the last
//! handle being dropped.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use kvstore_kv::{
    range_bounds, range_is_empty, GetRangeResult, KeySelector, KeyValue, KvEngine, OpenKvEngine,
    ReadOnlyTransaction, ReadWriteTransaction,
};
use kvstore_types::Result;

type Table = BTreeMap<Vec<u8>, Vec<u8>>;

#[derive(Clone, Default)]
pub struct MemDbEngine {
    table: Arc<RwLock<Table>>,
}

impl MemDbEngine {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.table.read().len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn txn(&self) -> MemDbTxn {
        MemDbTxn {
            table: Arc::clone(&self.table),
            staged: BTreeMap::new(),
        }
    }
}

impl KvEngine for MemDbEngine {
    type RoTxn = MemDbTxn;
    type RwTxn = MemDbTxn;

    fn create_readonly_transaction(&self) -> MemDbTxn {
        self.txn()
    }

    fn create_readwrite_transaction(&self) -> MemDbTxn {
        self.txn()
    }
}

impl OpenKvEngine for MemDbEngine {
    const NAME: &'static str = "memdb";

    /// The path is ignored; every open starts from an empty map.
    fn open(_path: &Path) -> Result<Self> {
        Ok(Self::new())
    }
}

/// Transaction handle used for both reads and staged writes.
///
/// Reads always go to the committed table. Staged writes are keyed so a later
/// `set` or `clear` of the same key replaces an earlier one.
pub struct MemDbTxn {
    table: Arc<RwLock<Table>>,
    staged: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl ReadOnlyTransaction for MemDbTxn {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.table.read().get(key).cloned())
    }

    fn contains(&self, key: &[u8]) -> Result<bool> {
        Ok(self.table.read().contains_key(key))
    }

    fn get_range(
        &self,
        begin: &KeySelector,
        end: &KeySelector,
        limit: usize,
    ) -> Result<GetRangeResult> {
        // BTreeMap::range panics on inverted bounds.
        if range_is_empty(begin, end) {
            return Ok(GetRangeResult::default());
        }
        let table = self.table.read();
        let mut iter = table.range::<[u8], _>(range_bounds(begin, end));
        let kvs: Vec<KeyValue> = iter
            .by_ref()
            .take(limit)
            .map(|(k, v)| KeyValue {
                key: k.clone(),
                value: v.clone(),
            })
            .collect();
        let has_more = iter.next().is_some();
        Ok(GetRangeResult { kvs, has_more })
    }
}

impl ReadWriteTransaction for MemDbTxn {
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.staged.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn clear(&mut self, key: &[u8]) -> Result<()> {
        self.staged.insert(key.to_vec(), None);
        Ok(())
    }

    fn cancel(&mut self) -> Result<()> {
        self.staged.clear();
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let mut table = self.table.write();
        for (key, value) in std::mem::take(&mut self.staged) {
            match value {
                Some(value) => table.insert(key, value),
                None => table.remove(&key),
            };
        }
        Ok(())
    }
}
