//! Flat ordered key-value engine abstraction.
//!
//! An engine exposes one global, byte-ordered keyspace. Multi-key atomicity
//! comes from [`ReadWriteTransaction`]: writes are staged and committed as a
//! single batch.

mod engine;
mod transaction;

pub use engine::{KvEngine, OpenKvEngine};
pub use transaction::*;

/// Smallest key greater than every key starting with `prefix`.
///
/// Trailing 0xFF bytes are dropped before the last byte is bumped. An empty
/// result means the scan has no upper bound.
pub fn prefix_list_end_key(prefix: &[u8]) -> Vec<u8> {
    match prefix.iter().rposition(|&b| b != 0xFF) {
        Some(pos) => {
            let mut end = prefix[..=pos].to_vec();
            end[pos] += 1;
            end
        }
        None => Vec::new(),
    }
}
