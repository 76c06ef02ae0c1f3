//! Composite key layouts used by the flat-engine store.
//!
//! A flat engine has a single keyspace, so every bucket entry and every
//! per-bucket counter is stored under a composite key derived from the bucket
//! name. Two layouts are provided:
//!
//! * [`LengthPrefixedCodec`] (default): `varint(len(bucket)) || bucket || tag || key`.
//!   No two buckets share a prefix, so enumeration never leaks across buckets.
//! * [`SeparatorCodec`]: `bucket || sep || key`, with the counters stored at
//!   `bucket || count_suffix` and `bucket || sequence_suffix`. This is the
//!   layout of existing on-disk data. Bucket names containing the separator
//!   are refused, since `a_` would otherwise share the entry prefix of `a`,
//!   and so are keys whose composite equals one of the bucket's counter
//!   records (`_key_for_count__` under the default suffixes).

use std::fmt;

use kvstore_utils::varint::put_varint;

pub const DEFAULT_SEPARATOR: u8 = b'_';
pub const DEFAULT_COUNT_SUFFIX: &str = "__key_for_count__";
pub const DEFAULT_SEQUENCE_SUFFIX: &str = "__key_for_sequence__";

/// Maps (bucket, key) pairs and per-bucket counters onto a flat keyspace.
pub trait KeyCodec: Send + Sync + fmt::Debug {
    /// Prefix shared by every entry key of `bucket`.
    fn entry_prefix(&self, bucket: &[u8]) -> Vec<u8>;

    fn count_key(&self, bucket: &[u8]) -> Vec<u8>;

    fn sequence_key(&self, bucket: &[u8]) -> Vec<u8>;

    fn entry_key(&self, bucket: &[u8], key: &[u8]) -> Vec<u8> {
        let mut out = self.entry_prefix(bucket);
        out.extend_from_slice(key);
        out
    }

    /// Whether `bucket` can be encoded without its keys overlapping another
    /// bucket's.
    fn accepts_bucket(&self, _bucket: &[u8]) -> bool {
        true
    }

    /// Whether the entry key for `key` would land on a counter record of
    /// `bucket`.
    fn is_reserved(&self, bucket: &[u8], key: &[u8]) -> bool {
        let entry = self.entry_key(bucket, key);
        entry == self.count_key(bucket) || entry == self.sequence_key(bucket)
    }

    /// Recover the user key from a composite key found under
    /// `entry_prefix(bucket)`. Returns `None` for the bucket's own counter
    /// records and for anything outside the prefix.
    fn decode_entry_key(&self, composite: &[u8], bucket: &[u8]) -> Option<Vec<u8>> {
        let prefix = self.entry_prefix(bucket);
        let rest = composite.strip_prefix(prefix.as_slice())?;
        if rest.is_empty()
            || composite == self.count_key(bucket).as_slice()
            || composite == self.sequence_key(bucket).as_slice()
        {
            return None;
        }
        Some(rest.to_vec())
    }
}

/// Legacy `bucket_key` layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeparatorCodec {
    separator: u8,
    count_suffix: Vec<u8>,
    sequence_suffix: Vec<u8>,
}

impl SeparatorCodec {
    pub fn new(
        separator: u8,
        count_suffix: impl Into<Vec<u8>>,
        sequence_suffix: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            separator,
            count_suffix: count_suffix.into(),
            sequence_suffix: sequence_suffix.into(),
        }
    }

    pub fn separator(&self) -> u8 {
        self.separator
    }

    fn with_suffix(bucket: &[u8], suffix: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(bucket.len() + suffix.len());
        out.extend_from_slice(bucket);
        out.extend_from_slice(suffix);
        out
    }
}

impl Default for SeparatorCodec {
    fn default() -> Self {
        Self::new(
            DEFAULT_SEPARATOR,
            DEFAULT_COUNT_SUFFIX,
            DEFAULT_SEQUENCE_SUFFIX,
        )
    }
}

impl KeyCodec for SeparatorCodec {
    fn entry_prefix(&self, bucket: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(bucket.len() + 1);
        out.extend_from_slice(bucket);
        out.push(self.separator);
        out
    }

    fn count_key(&self, bucket: &[u8]) -> Vec<u8> {
        Self::with_suffix(bucket, &self.count_suffix)
    }

    fn sequence_key(&self, bucket: &[u8]) -> Vec<u8> {
        Self::with_suffix(bucket, &self.sequence_suffix)
    }

    fn accepts_bucket(&self, bucket: &[u8]) -> bool {
        !bucket.contains(&self.separator)
    }
}

const ENTRY_TAG: u8 = 0x00;
const COUNT_TAG: u8 = 0x01;
const SEQUENCE_TAG: u8 = 0x02;

/// Unambiguous layout: the bucket name is length-prefixed, followed by a tag
/// byte that separates entries from counter records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LengthPrefixedCodec;

impl LengthPrefixedCodec {
    fn tagged(bucket: &[u8], tag: u8) -> Vec<u8> {
        let mut out = Vec::with_capacity(bucket.len() + 2);
        put_varint(&mut out, bucket.len() as u64);
        out.extend_from_slice(bucket);
        out.push(tag);
        out
    }
}

impl KeyCodec for LengthPrefixedCodec {
    fn entry_prefix(&self, bucket: &[u8]) -> Vec<u8> {
        Self::tagged(bucket, ENTRY_TAG)
    }

    fn count_key(&self, bucket: &[u8]) -> Vec<u8> {
        Self::tagged(bucket, COUNT_TAG)
    }

    fn sequence_key(&self, bucket: &[u8]) -> Vec<u8> {
        Self::tagged(bucket, SEQUENCE_TAG)
    }

    fn is_reserved(&self, _bucket: &[u8], _key: &[u8]) -> bool {
        false
    }

    fn decode_entry_key(&self, composite: &[u8], bucket: &[u8]) -> Option<Vec<u8>> {
        // Counter records carry a different tag, so the prefix check suffices.
        let rest = composite.strip_prefix(self.entry_prefix(bucket).as_slice())?;
        if rest.is_empty() {
            return None;
        }
        Some(rest.to_vec())
    }
}
