use std::ops::Bound;

use kvstore_types::Result;

use crate::prefix_list_end_key;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// One end of a range query.
#[derive(Debug, Clone)]
pub struct KeySelector {
    pub key: Vec<u8>,
    pub inclusive: bool,
}

impl KeySelector {
    pub fn new(key: impl Into<Vec<u8>>, inclusive: bool) -> Self {
        let key = key.into();
        Self { key, inclusive }
    }

    fn bound(&self) -> Bound<&[u8]> {
        if self.inclusive {
            Bound::Included(self.key.as_slice())
        } else {
            Bound::Excluded(self.key.as_slice())
        }
    }
}

/// `begin..end` as borrowed bounds, with an empty `end` key left unbounded.
///
/// Check [`range_is_empty`] first; ordered maps panic on inverted bounds.
pub fn range_bounds<'a>(begin: &'a KeySelector, end: &'a KeySelector) -> (Bound<&'a [u8]>, Bound<&'a [u8]>) {
    let upper = if end.key.is_empty() {
        Bound::Unbounded
    } else {
        end.bound()
    };
    (begin.bound(), upper)
}

/// Whether `begin..end` selects nothing regardless of the stored keys.
///
/// An empty `end` key is unbounded and never makes the range empty.
pub fn range_is_empty(begin: &KeySelector, end: &KeySelector) -> bool {
    if end.key.is_empty() {
        return false;
    }
    begin.key > end.key || (begin.key == end.key && !(begin.inclusive && end.inclusive))
}

/// One page of a range query.
#[derive(Debug, Default)]
pub struct GetRangeResult {
    pub kvs: Vec<KeyValue>,
    pub has_more: bool,
}

/// Page size used by [`ReadOnlyTransaction::scan_prefix`].
pub const SCAN_BATCH_SIZE: usize = 1024;

/// Read-only transaction trait.
///
/// Reads observe committed engine state.
pub trait ReadOnlyTransaction: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    fn contains(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Return up to `limit` pairs between `begin` and `end` in key order.
    ///
    /// An empty, exclusive `end` key means "no upper bound".
    fn get_range(
        &self,
        begin: &KeySelector,
        end: &KeySelector,
        limit: usize,
    ) -> Result<GetRangeResult>;

    /// Collect every pair whose key starts with `prefix`, in key order.
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<KeyValue>> {
        let end = KeySelector::new(prefix_list_end_key(prefix), false);
        let mut begin = KeySelector::new(prefix.to_vec(), true);
        let mut out = Vec::new();
        loop {
            let page = self.get_range(&begin, &end, SCAN_BATCH_SIZE)?;
            let next = page.kvs.last().map(|kv| kv.key.clone());
            out.extend(page.kvs);
            match next {
                Some(last) if page.has_more => begin = KeySelector::new(last, false),
                _ => return Ok(out),
            }
        }
    }
}

/// Read-write transaction trait.
///
/// Mutations are buffered and applied atomically by [`commit`]: either every
/// staged `set`/`clear` becomes visible or none does.
///
/// [`commit`]: ReadWriteTransaction::commit
pub trait ReadWriteTransaction: ReadOnlyTransaction {
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    fn clear(&mut self, key: &[u8]) -> Result<()>;

    /// Discard all staged mutations.
    fn cancel(&mut self) -> Result<()>;

    /// Apply the staged mutations. An error means none of them landed.
    fn commit(&mut self) -> Result<()>;
}
