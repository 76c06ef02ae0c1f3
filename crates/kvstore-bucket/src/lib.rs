//! Bucketed key-value store.
//!
//! A [`BucketStore`] partitions a key-value database into named buckets and
//! keeps, per bucket, a count of live keys and a sequence counter. Two
//! implementations are provided:
//!
//! * [`FlatBucketStore`] emulates buckets over any flat [`OpenKvEngine`]
//!   (the in-memory engine or sled's default tree), storing entries and
//!   counter records under composite keys built by a [`KeyCodec`].
//! * [`NativeBucketStore`] maps each bucket to its own sled tree.
//!
//! [`open_store`] builds and opens the backend named by a [`StoreConfig`].
//!
//! [`OpenKvEngine`]: kvstore_kv::OpenKvEngine

pub mod codec;
pub mod config;
pub mod error;
pub mod flat;
pub mod guard;
pub mod ledger;
pub mod native;
pub mod store;

#[cfg(test)]
mod conformance;

pub use codec::{KeyCodec, LengthPrefixedCodec, SeparatorCodec};
pub use config::{BackendKind, CodecConfig, KeyEncoding, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use flat::FlatBucketStore;
pub use guard::StoreState;
pub use native::NativeBucketStore;
pub use store::BucketStore;

use kvstore_kv_backends::{MemDbEngine, SledEngine};

/// Build an unopened store for the configured backend.
pub fn new_store(config: &StoreConfig) -> Box<dyn BucketStore> {
    match config.backend {
        BackendKind::Memory => Box::new(FlatBucketStore::<MemDbEngine>::new(config.codec.build())),
        BackendKind::Sled => Box::new(FlatBucketStore::<SledEngine>::new(config.codec.build())),
        BackendKind::SledNative => Box::new(NativeBucketStore::new()),
    }
}

/// Build the configured backend and open it at `config.path`.
pub fn open_store(config: &StoreConfig) -> StoreResult<Box<dyn BucketStore>> {
    let store = new_store(config);
    store.open(&config.path)?;
    Ok(store)
}
