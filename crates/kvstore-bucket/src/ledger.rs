//! Per-bucket count and sequence records for flat engines.
//!
//! Both counters are stored as ASCII decimal text. An absent record reads as
//! zero; so does a record that does not parse, which is logged.

use kvstore_kv::{ReadOnlyTransaction, ReadWriteTransaction};
use kvstore_types::Result;
use kvstore_utils::coding::display_bytes;

use crate::codec::KeyCodec;

pub fn encode_counter(value: u64) -> Vec<u8> {
    value.to_string().into_bytes()
}

/// Only plain ASCII digits are accepted; `u64::from_str` alone would also
/// take a leading `+`.
pub fn decode_counter(raw: &[u8]) -> Option<u64> {
    if raw.is_empty() || !raw.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(raw).ok()?.parse().ok()
}

fn read_counter<T>(txn: &T, record: &[u8], kind: &'static str) -> Result<u64>
where
    T: ReadOnlyTransaction + ?Sized,
{
    match txn.get(record)? {
        None => Ok(0),
        Some(raw) => match decode_counter(&raw) {
            Some(value) => Ok(value),
            None => {
                tracing::warn!(
                    kind,
                    record = %display_bytes(record),
                    raw = %display_bytes(&raw),
                    "malformed counter record, treating as 0"
                );
                Ok(0)
            }
        },
    }
}

/// Number of live entries recorded for `bucket`.
pub fn read_count<T>(txn: &T, codec: &dyn KeyCodec, bucket: &[u8]) -> Result<u64>
where
    T: ReadOnlyTransaction + ?Sized,
{
    read_counter(txn, &codec.count_key(bucket), "count")
}

pub fn write_count<T>(txn: &mut T, codec: &dyn KeyCodec, bucket: &[u8], count: u64) -> Result<()>
where
    T: ReadWriteTransaction + ?Sized,
{
    txn.set(&codec.count_key(bucket), &encode_counter(count))
}

/// Last value handed out by `next_sequence` (or stored by `set_sequence`).
pub fn read_sequence<T>(txn: &T, codec: &dyn KeyCodec, bucket: &[u8]) -> Result<u64>
where
    T: ReadOnlyTransaction + ?Sized,
{
    read_counter(txn, &codec.sequence_key(bucket), "sequence")
}

pub fn write_sequence<T>(
    txn: &mut T,
    codec: &dyn KeyCodec,
    bucket: &[u8],
    sequence: u64,
) -> Result<()>
where
    T: ReadWriteTransaction + ?Sized,
{
    txn.set(&codec.sequence_key(bucket), &encode_counter(sequence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{LengthPrefixedCodec, SeparatorCodec};
    use kvstore_kv::KvEngine;
    use kvstore_kv_backends::MemDbEngine;

    #[test]
    fn test_counter_text() {
        assert_eq!(encode_counter(0), b"0");
        assert_eq!(encode_counter(2001), b"2001");
        assert_eq!(decode_counter(b"18446744073709551615"), Some(u64::MAX));
        assert_eq!(decode_counter(b"-1"), None);
        assert_eq!(decode_counter(b"twelve"), None);
        assert_eq!(decode_counter(b""), None);
        assert_eq!(decode_counter(&[0xff, 0x00]), None);
        assert_eq!(decode_counter(b"007"), Some(7));
        assert_eq!(decode_counter(b"18446744073709551616"), None);
    }

    #[test]
    fn test_signed_or_padded_counters_are_malformed() {
        for raw in [&b"+5"[..], b" 5", b"5 ", b"5\n", b"+", b"0x10"] {
            assert_eq!(decode_counter(raw), None, "{raw:?}");
        }

        let engine = MemDbEngine::new();
        let codec = LengthPrefixedCodec;
        let mut txn = engine.create_readwrite_transaction();
        txn.set(&codec.sequence_key(b"b"), b"+5").unwrap();
        txn.commit().unwrap();
        let ro = engine.create_readonly_transaction();
        assert_eq!(read_sequence(&ro, &codec, b"b").unwrap(), 0);
    }

    #[test]
    fn test_absent_records_read_zero() {
        let engine = MemDbEngine::new();
        let ro = engine.create_readonly_transaction();
        assert_eq!(read_count(&ro, &LengthPrefixedCodec, b"b").unwrap(), 0);
        assert_eq!(read_sequence(&ro, &LengthPrefixedCodec, b"b").unwrap(), 0);
    }

    #[test]
    fn test_write_then_read() {
        let engine = MemDbEngine::new();
        let codec = SeparatorCodec::default();

        let mut txn = engine.create_readwrite_transaction();
        write_count(&mut txn, &codec, b"b", 3).unwrap();
        write_sequence(&mut txn, &codec, b"b", 2000).unwrap();
        txn.commit().unwrap();

        let ro = engine.create_readonly_transaction();
        assert_eq!(read_count(&ro, &codec, b"b").unwrap(), 3);
        assert_eq!(read_sequence(&ro, &codec, b"b").unwrap(), 2000);
        assert_eq!(ro.get(b"b__key_for_count__").unwrap(), Some(b"3".to_vec()));
        assert_eq!(
            ro.get(b"b__key_for_sequence__").unwrap(),
            Some(b"2000".to_vec())
        );
    }

    #[test]
    fn test_malformed_record_reads_zero() {
        let engine = MemDbEngine::new();
        let codec = LengthPrefixedCodec;

        let mut txn = engine.create_readwrite_transaction();
        txn.set(&codec.count_key(b"b"), b"garbage").unwrap();
        txn.commit().unwrap();

        let ro = engine.create_readonly_transaction();
        assert_eq!(read_count(&ro, &codec, b"b").unwrap(), 0);
    }
}
