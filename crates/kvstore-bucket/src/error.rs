use std::path::PathBuf;

use kvstore_types::Status;
use thiserror::Error;

/// Errors returned by [`crate::BucketStore`] operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store is not open (never opened, or closed).
    #[error("kvstore: closed")]
    Closed,

    /// The (bucket, key) entry does not exist.
    #[error("kvstore: key not found")]
    KeyNotFound,

    #[error("kvstore: already open")]
    AlreadyOpen,

    /// The engine could not be opened at `path`; the store stays closed.
    #[error("kvstore: open {path:?} failed: {source}")]
    OpenFailed { path: PathBuf, source: Status },

    /// Empty, or not representable by the store's key layout.
    #[error("kvstore: invalid bucket name")]
    InvalidBucket,

    /// Empty, or aliasing one of the bucket's counter records.
    #[error("kvstore: invalid key")]
    InvalidKey,

    /// `next_sequence` was called with the counter already at `u64::MAX`.
    #[error("kvstore: sequence overflow")]
    SequenceOverflow,

    /// Any other failure reported by the underlying engine.
    #[error("kvstore: engine error: {0}")]
    Engine(#[from] Status),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
