use std::path::Path;

use kvstore_types::Result;

use crate::transaction::{ReadOnlyTransaction, ReadWriteTransaction};

/// KV engine trait - creates transactions over a single flat, ordered keyspace.
pub trait KvEngine: Send + Sync {
    type RoTxn: ReadOnlyTransaction;
    type RwTxn: ReadWriteTransaction;

    fn create_readonly_transaction(&self) -> Self::RoTxn;
    fn create_readwrite_transaction(&self) -> Self::RwTxn;

    /// Persist any buffered state. Engines without durability return `Ok`.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Engines that can be opened (or created) at a filesystem path.
pub trait OpenKvEngine: KvEngine + Sized {
    /// Short backend name used in logs.
    const NAME: &'static str;

    fn open(path: &Path) -> Result<Self>;
}
