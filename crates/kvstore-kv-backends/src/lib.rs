//! KV store backend implementations for kvstore.
//!
//! Provides concrete implementations of the [`kvstore_kv::KvEngine`] trait:
//!
//! - **memdb** -- In-memory BTreeMap-backed store.
//! - **sled** -- Persistent store using one flat sled tree.

pub mod memdb;
pub mod sled;

pub use self::memdb::MemDbEngine;
pub use self::sled::{sled_status, SledEngine};
